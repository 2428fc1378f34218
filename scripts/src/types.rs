//! Type definitions used throughout the scripts

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use alloy::primitives::Address;

use crate::constants::{MARKETPLACE_CONTRACT_KEY, NFT_CONTRACT_KEY, WETH_CONTRACT_KEY};

/// The possible contracts to deploy
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Contract {
    /// The wrapped ether token
    Weth,
    /// The marketplace contract
    Marketplace,
    /// The NFT contract
    Nft,
}

impl Contract {
    /// The name of the compiled contract, which is also the artifact file stem
    pub fn name(&self) -> &'static str {
        match self {
            Contract::Weth => "WETH",
            Contract::Marketplace => "Marketplace",
            Contract::Nft => "NFT",
        }
    }

    /// The key under which the contract's address is recorded in the deployments file
    pub fn deployments_key(&self) -> &'static str {
        match self {
            Contract::Weth => WETH_CONTRACT_KEY,
            Contract::Marketplace => MARKETPLACE_CONTRACT_KEY,
            Contract::Nft => NFT_CONTRACT_KEY,
        }
    }

    /// The label printed next to the deployed address
    pub fn label(&self) -> &'static str {
        match self {
            Contract::Weth => "WETH",
            Contract::Marketplace => "Marketplace",
            Contract::Nft => "NFT contract",
        }
    }
}

impl Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where the marketplace's token address comes from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenSource {
    /// A token deployed during this run
    Fresh(Address),
    /// The statically configured token of a remote network
    Configured(Address),
}

impl TokenSource {
    /// The token address, whichever its origin
    pub fn address(&self) -> Address {
        match self {
            TokenSource::Fresh(addr) | TokenSource::Configured(addr) => *addr,
        }
    }
}

/// The parameters of a marketplace deployment run
#[derive(Clone, Debug)]
pub struct DeployPlan {
    /// The version identifier passed to the marketplace constructor
    pub marketplace_version: u64,
    /// Whether to deploy the NFT contract after the marketplace
    pub deploy_nft: bool,
    /// Whether to publish verified source on non-development networks
    pub publish_source: bool,
    /// Where to record addresses deployed to non-development networks
    pub deployments_path: PathBuf,
}
