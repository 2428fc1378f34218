//! Constants used in the deploy scripts

use std::time::Duration;

/// The name of the local, ephemeral development network
pub const DEVELOPMENT_NETWORK: &str = "development";

/// The default path of the network configuration file
pub const DEFAULT_CONFIG_PATH: &str = "deploy-config.json";

/// The default directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The default directory holding persisted keystore identities
pub const DEFAULT_KEYSTORE_DIR: &str = "keystores";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default RPC endpoint of a local development node
pub const DEFAULT_DEVNET_RPC_URL: &str = "http://127.0.0.1:8545";

/// The marketplace version tag passed to the constructor when none is given
pub const DEFAULT_MARKETPLACE_VERSION: u64 = 2;

/// The extension of artifact and keystore files
pub const JSON_EXTENSION: &str = "json";

/// The WETH contract key in the `deployments.json` file
pub const WETH_CONTRACT_KEY: &str = "weth_contract";

/// The marketplace contract key in the `deployments.json` file
pub const MARKETPLACE_CONTRACT_KEY: &str = "marketplace_contract";

/// The NFT contract key in the `deployments.json` file
pub const NFT_CONTRACT_KEY: &str = "nft_contract";

/// The number of times a verification request is resubmitted while the
/// explorer has not yet indexed the deployed bytecode
pub const MAX_VERIFICATION_SUBMISSIONS: usize = 10;

/// The number of times the verification status is polled before giving up
pub const MAX_VERIFICATION_STATUS_POLLS: usize = 30;

/// The delay between two explorer requests
pub const EXPLORER_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The explorer response while the verification is queued
pub const VERIFICATION_PENDING: &str = "Pending in queue";

/// The explorer response prefix for a successful verification
pub const VERIFICATION_PASSED: &str = "Pass - Verified";

/// The explorer response fragment, lowercased, for a contract whose source is
/// already public
pub const ALREADY_VERIFIED: &str = "already verified";

/// The explorer response fragment when the bytecode is not indexed yet
pub const CONTRACT_NOT_INDEXED: &str = "Unable to locate ContractCode";
