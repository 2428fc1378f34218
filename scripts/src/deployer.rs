//! The contract deploy primitive

use std::path::PathBuf;

use alloy::{
    dyn_abi::DynSolValue,
    network::TransactionBuilder,
    primitives::Address,
    providers::Provider,
    rpc::types::TransactionRequest,
};
use tracing::{debug, info};

use crate::{
    accounts::SigningIdentity, artifacts::ContractArtifact, errors::ScriptError,
    publish::EtherscanPublisher, types::Contract, utils::setup_client,
};

/// A request to create one contract instance
#[derive(Clone, Debug)]
pub struct DeployRequest {
    /// The contract to deploy
    pub contract: Contract,
    /// The ordered constructor arguments
    pub args: Vec<DynSolValue>,
    /// The identity sending the creation transaction
    pub from: SigningIdentity,
    /// Whether to publish verified source once deployed
    pub publish_source: bool,
}

/// Creates contract instances on chain
#[allow(async_fn_in_trait)]
pub trait Deployer {
    /// Deploy the requested contract, returning its address once the creation
    /// transaction is confirmed
    async fn deploy(&self, request: DeployRequest) -> Result<Address, ScriptError>;
}

/// Deploys compiled artifacts over JSON-RPC
pub struct RpcDeployer {
    /// The RPC endpoint of the active network
    rpc_url: String,
    /// The directory holding compiled artifacts
    artifacts_dir: PathBuf,
    /// The explorer client used for source publication, if configured
    publisher: Option<EtherscanPublisher>,
}

impl RpcDeployer {
    /// Create a deployer
    pub fn new(
        rpc_url: String,
        artifacts_dir: PathBuf,
        publisher: Option<EtherscanPublisher>,
    ) -> Self {
        Self {
            rpc_url,
            artifacts_dir,
            publisher,
        }
    }
}

impl Deployer for RpcDeployer {
    async fn deploy(&self, request: DeployRequest) -> Result<Address, ScriptError> {
        let DeployRequest {
            contract,
            args,
            from,
            publish_source,
        } = request;

        // Fail before broadcasting if the source could not be published afterwards
        let publisher = match (publish_source, &self.publisher) {
            (false, _) => None,
            (true, Some(publisher)) => Some(publisher),
            (true, None) => {
                return Err(ScriptError::SourcePublication(
                    "no explorer API url or key configured for this network".to_string(),
                ))
            }
        };

        let artifact = ContractArtifact::load(&self.artifacts_dir, contract)?;
        let encoded_args = artifact.encode_constructor_args(&args)?;
        let client = setup_client(&self.rpc_url, from.signer().cloned())?;

        let tx = TransactionRequest::default()
            .with_from(from.address())
            .with_deploy_code(artifact.deploy_code(&encoded_args));

        info!("deploying {contract} from {}", from.address());
        let pending = client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        debug!("sent {contract} creation tx {}", pending.tx_hash());

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "{contract} creation reverted in tx {}",
                receipt.transaction_hash
            )));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("no contract address in {contract} receipt"))
        })?;

        if let Some(publisher) = publisher {
            publisher.publish(&artifact, address, &encoded_args).await?;
        }

        Ok(address)
    }
}
