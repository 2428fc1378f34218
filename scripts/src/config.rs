//! The network context: which network is active and how each network is configured

use std::{collections::HashMap, env, fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde::Deserialize;
use tracing::debug;

use crate::{constants::DEVELOPMENT_NETWORK, errors::ScriptError};

/// The contents of the deploy configuration file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DeployConfig {
    /// Per-network settings, keyed by network name
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
    /// Wallet settings shared across networks
    #[serde(default)]
    pub wallets: WalletConfig,
}

/// Settings for a single network
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NetworkConfig {
    /// The JSON-RPC endpoint of the network
    pub rpc_url: Option<String>,
    /// The address of the already-deployed WETH token on the network
    pub weth_token: Option<String>,
    /// The API endpoint of the network's Etherscan-compatible explorer
    pub explorer: Option<String>,
}

/// Wallet settings
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WalletConfig {
    /// Hex private key of the deployer on remote networks
    pub from_key: Option<String>,
}

/// The active network together with the loaded configuration.
///
/// Set once before any deployment happens and read-only afterwards.
#[derive(Debug, Clone)]
pub struct NetworkContext {
    /// The name of the active network
    active: String,
    /// The loaded configuration
    config: DeployConfig,
}

impl NetworkContext {
    /// Create a context for the given network from an already-parsed configuration
    pub fn new(active: impl Into<String>, config: DeployConfig) -> Self {
        Self {
            active: active.into(),
            config,
        }
    }

    /// Load the configuration at `path` and activate `network`.
    ///
    /// A missing configuration file is treated as an empty configuration so that
    /// the development network works without any setup.
    pub fn load(path: &Path, network: &str) -> Result<Self, ScriptError> {
        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::new(network, DeployConfig::default()));
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadConfig(e.to_string()))?;
        let config: DeployConfig =
            serde_json::from_str(&contents).map_err(|e| ScriptError::ReadConfig(e.to_string()))?;

        Ok(Self::new(network, config))
    }

    /// The name of the active network
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Whether the active network is the local development network
    pub fn is_development(&self) -> bool {
        self.active == DEVELOPMENT_NETWORK
    }

    /// The configuration entry of the active network, if any
    pub fn network_config(&self) -> Option<&NetworkConfig> {
        self.config.networks.get(&self.active)
    }

    /// The configured RPC endpoint of the active network
    pub fn rpc_url(&self) -> Option<String> {
        self.network_config()?.rpc_url.as_deref().and_then(expand_env)
    }

    /// The configured explorer API endpoint of the active network
    pub fn explorer(&self) -> Option<String> {
        self.network_config()?.explorer.as_deref().and_then(expand_env)
    }

    /// The statically configured WETH token of the active network
    pub fn weth_token(&self) -> Result<Address, ScriptError> {
        let raw = self
            .network_config()
            .and_then(|network| network.weth_token.as_deref())
            .and_then(expand_env)
            .ok_or_else(|| {
                ScriptError::ReadConfig(format!(
                    "no `weth_token` configured for network `{}`",
                    self.active
                ))
            })?;

        Address::from_str(&raw).map_err(|e| ScriptError::ReadConfig(e.to_string()))
    }

    /// The deployer private key from the wallet section
    pub fn from_key(&self) -> Option<String> {
        self.config.wallets.from_key.as_deref().and_then(expand_env)
    }
}

/// Resolve a `${VAR}` reference against the environment.
///
/// Plain values are returned as-is; a reference to an unset or empty variable
/// yields `None`.
pub fn expand_env(value: &str) -> Option<String> {
    let value = value.trim();
    let resolved = match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(var) => env::var(var).ok()?,
        None => value.to_string(),
    };

    (!resolved.is_empty()).then_some(resolved)
}
