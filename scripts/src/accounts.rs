//! Resolution of the identity that signs deployment transactions

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    primitives::Address,
    providers::Provider,
    signers::local::{LocalSigner, PrivateKeySigner},
};
use tracing::{info, warn};

use crate::{config::NetworkContext, constants::JSON_EXTENSION, errors::ScriptError};

/// An account able to authorize a deployment transaction
#[derive(Clone, Debug)]
pub enum SigningIdentity {
    /// An account managed and unlocked by the node, known only by address
    Unlocked(Address),
    /// A signer holding its private key locally
    Local(PrivateKeySigner),
}

impl SigningIdentity {
    /// The address transactions are sent from
    pub fn address(&self) -> Address {
        match self {
            SigningIdentity::Unlocked(addr) => *addr,
            SigningIdentity::Local(signer) => signer.address(),
        }
    }

    /// The local signer, if this identity holds its own key
    pub fn signer(&self) -> Option<&PrivateKeySigner> {
        match self {
            SigningIdentity::Unlocked(_) => None,
            SigningIdentity::Local(signer) => Some(signer),
        }
    }
}

/// The caller's preference for which identity to use
#[derive(Clone, Debug, Default)]
pub struct AccountRequest {
    /// An explicit position in the local account list
    pub index: Option<usize>,
    /// The name of a persisted keystore identity
    pub id: Option<String>,
}

/// Source of signing identities
pub trait AccountRegistry {
    /// The local account at `index`
    fn at(&self, index: usize) -> Result<SigningIdentity, ScriptError>;

    /// A previously persisted identity, by name
    fn load(&self, id: &str) -> Result<SigningIdentity, ScriptError>;

    /// An identity derived from a hex-encoded private key
    fn add(&self, private_key: &str) -> Result<SigningIdentity, ScriptError>;
}

/// The node's unlocked accounts plus keystores on disk
pub struct NodeAccounts {
    /// The accounts reported by `eth_accounts`
    accounts: Vec<Address>,
    /// The directory holding `<id>.json` keystore files
    keystore_dir: PathBuf,
    /// The password used to decrypt keystores
    keystore_password: String,
}

impl NodeAccounts {
    /// Build the registry, fetching the node's local accounts.
    ///
    /// Remote nodes commonly refuse `eth_accounts`; outside of the development
    /// network this is treated as an empty account list.
    pub async fn fetch(
        provider: &impl Provider,
        ctx: &NetworkContext,
        keystore_dir: PathBuf,
        keystore_password_path: Option<&Path>,
    ) -> Result<Self, ScriptError> {
        let accounts = match provider.get_accounts().await {
            Ok(accounts) => accounts,
            Err(e) if !ctx.is_development() => {
                warn!("could not list accounts on `{}`: {e}", ctx.active());
                Vec::new()
            }
            Err(e) => return Err(ScriptError::ClientInitialization(e.to_string())),
        };

        let keystore_password = match keystore_password_path {
            Some(path) => fs::read_to_string(path)
                .map_err(|e| ScriptError::AccountResolution(e.to_string()))?
                .trim_end()
                .to_string(),
            None => String::new(),
        };

        Ok(Self::new(accounts, keystore_dir, keystore_password))
    }

    /// Build the registry from known parts
    pub fn new(accounts: Vec<Address>, keystore_dir: PathBuf, keystore_password: String) -> Self {
        Self {
            accounts,
            keystore_dir,
            keystore_password,
        }
    }
}

impl AccountRegistry for NodeAccounts {
    fn at(&self, index: usize) -> Result<SigningIdentity, ScriptError> {
        self.accounts.get(index).copied().map(SigningIdentity::Unlocked).ok_or_else(|| {
            ScriptError::AccountResolution(format!(
                "no local account at index {index}, node has {}",
                self.accounts.len()
            ))
        })
    }

    fn load(&self, id: &str) -> Result<SigningIdentity, ScriptError> {
        let path = self.keystore_dir.join(format!("{id}.{JSON_EXTENSION}"));
        let signer = LocalSigner::decrypt_keystore(&path, &self.keystore_password).map_err(|e| {
            ScriptError::AccountResolution(format!("could not load `{}`: {e}", path.display()))
        })?;

        Ok(SigningIdentity::Local(signer))
    }

    fn add(&self, private_key: &str) -> Result<SigningIdentity, ScriptError> {
        parse_private_key(private_key).map(SigningIdentity::Local)
    }
}

/// Parse a hex private key, with or without a `0x` prefix
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner, ScriptError> {
    PrivateKeySigner::from_str(private_key.trim())
        .map_err(|e| ScriptError::AccountResolution(format!("invalid private key: {e}")))
}

// -------------
// | Resolvers |
// -------------

/// A single account resolution strategy.
///
/// Returns `Ok(None)` when the strategy does not apply.
type Resolver = fn(
    &AccountRequest,
    &NetworkContext,
    &dyn AccountRegistry,
) -> Result<Option<SigningIdentity>, ScriptError>;

/// The resolution strategies, in priority order
const RESOLVERS: [Resolver; 4] = [by_index, development_default, by_keystore_id, by_configured_key];

/// Resolve the signing identity for this invocation.
///
/// Strategies are tried in order: explicit index, first local account on the
/// development network, named keystore, configured private key.
pub fn resolve_account(
    request: &AccountRequest,
    ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
) -> Result<SigningIdentity, ScriptError> {
    for resolver in RESOLVERS {
        if let Some(identity) = resolver(request, ctx, registry)? {
            info!("deploying from {}", identity.address());
            return Ok(identity);
        }
    }

    Err(ScriptError::AccountResolution(format!(
        "network `{}` needs an account id or `wallets.from_key` in the config",
        ctx.active()
    )))
}

/// An explicitly requested local account
fn by_index(
    request: &AccountRequest,
    _ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
) -> Result<Option<SigningIdentity>, ScriptError> {
    request.index.map(|index| registry.at(index)).transpose()
}

/// The first local account of the development network
fn development_default(
    _request: &AccountRequest,
    ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
) -> Result<Option<SigningIdentity>, ScriptError> {
    if !ctx.is_development() {
        return Ok(None);
    }
    registry.at(0).map(Some)
}

/// A named keystore identity
fn by_keystore_id(
    request: &AccountRequest,
    _ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
) -> Result<Option<SigningIdentity>, ScriptError> {
    request.id.as_deref().map(|id| registry.load(id)).transpose()
}

/// The private key from the wallet section of the config
fn by_configured_key(
    _request: &AccountRequest,
    ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
) -> Result<Option<SigningIdentity>, ScriptError> {
    ctx.from_key().map(|key| registry.add(&key)).transpose()
}
