//! Mock accounts, networks and deployers shared by the unit tests

use std::{collections::HashMap, sync::Mutex};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address},
};

use crate::{
    accounts::{parse_private_key, AccountRegistry, SigningIdentity},
    config::{DeployConfig, NetworkConfig, NetworkContext},
    deployer::{DeployRequest, Deployer},
    errors::ScriptError,
    types::Contract,
};

/// The first private key of the default local development node
pub const DEVNET_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The address of [`DEVNET_KEY`]
pub const DEVNET_ADDRESS: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// The WETH token configured for the remote test network
pub const WETH_TOKEN: Address = address!("7b79995e5f793a07bc00c21412e50ecae098e7f9");

/// `n` distinct local account addresses
pub fn local_accounts(n: u8) -> Vec<Address> {
    (1..=n).map(|i| Address::with_last_byte(0xa0 + i)).collect()
}

/// The development network context
pub fn development() -> NetworkContext {
    NetworkContext::new("development", DeployConfig::default())
}

/// A remote network context with a configured WETH token and no wallet key
pub fn remote() -> NetworkContext {
    let network = NetworkConfig {
        weth_token: Some(WETH_TOKEN.to_string()),
        ..Default::default()
    };
    let config = DeployConfig {
        networks: HashMap::from([("sepolia".to_string(), network)]),
        ..Default::default()
    };

    NetworkContext::new("sepolia", config)
}

/// An in-memory account registry
pub struct MockRegistry {
    /// The local accounts
    accounts: Vec<Address>,
    /// Persisted identities by name, as private keys
    keystores: HashMap<String, String>,
}

impl MockRegistry {
    /// A registry with the given local accounts and no keystores
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            keystores: HashMap::new(),
        }
    }

    /// Persist an identity under `id`
    pub fn with_keystore(mut self, id: &str, private_key: &str) -> Self {
        self.keystores.insert(id.to_string(), private_key.to_string());
        self
    }
}

impl AccountRegistry for MockRegistry {
    fn at(&self, index: usize) -> Result<SigningIdentity, ScriptError> {
        self.accounts
            .get(index)
            .copied()
            .map(SigningIdentity::Unlocked)
            .ok_or_else(|| ScriptError::AccountResolution(format!("no account {index}")))
    }

    fn load(&self, id: &str) -> Result<SigningIdentity, ScriptError> {
        let key = self
            .keystores
            .get(id)
            .ok_or_else(|| ScriptError::AccountResolution(format!("no keystore `{id}`")))?;
        self.add(key)
    }

    fn add(&self, private_key: &str) -> Result<SigningIdentity, ScriptError> {
        parse_private_key(private_key).map(SigningIdentity::Local)
    }
}

/// A deploy call as seen by [`MockDeployer`]
#[derive(Clone, Debug)]
pub struct DeployCall {
    /// The deployed contract
    pub contract: Contract,
    /// The constructor arguments
    pub args: Vec<DynSolValue>,
    /// The sender address
    pub from: Address,
    /// Whether source publication was requested
    pub publish_source: bool,
}

/// A deployer that records calls and hands out sequential addresses
#[derive(Default)]
pub struct MockDeployer {
    /// The calls made so far
    calls: Mutex<Vec<DeployCall>>,
    /// A contract whose deployment fails
    fail_on: Option<Contract>,
}

impl MockDeployer {
    /// A deployer that fails when asked to deploy `contract`
    pub fn failing_on(contract: Contract) -> Self {
        Self {
            fail_on: Some(contract),
            ..Default::default()
        }
    }

    /// The calls made so far
    pub fn calls(&self) -> Vec<DeployCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Deployer for MockDeployer {
    async fn deploy(&self, request: DeployRequest) -> Result<Address, ScriptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(DeployCall {
            contract: request.contract,
            args: request.args,
            from: request.from.address(),
            publish_source: request.publish_source,
        });

        if self.fail_on == Some(request.contract) {
            return Err(ScriptError::ContractDeployment("insufficient funds".to_string()));
        }
        Ok(Address::with_last_byte(0xd0 + calls.len() as u8))
    }
}
