//! Definitions of CLI arguments and commands for the deploy scripts

use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::{
    accounts::{resolve_account, AccountRegistry, AccountRequest},
    commands::{deploy_marketplace, deploy_nft, deploy_token, report, run},
    config::NetworkContext,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_PATH, DEFAULT_DEPLOYMENTS_PATH,
        DEFAULT_DEVNET_RPC_URL, DEFAULT_KEYSTORE_DIR, DEFAULT_MARKETPLACE_VERSION,
        DEVELOPMENT_NETWORK,
    },
    deployer::Deployer,
    errors::ScriptError,
    publish::EtherscanPublisher,
    types::{Contract, DeployPlan},
    utils::parse_addr_from_deployments_file,
};

/// Deploy the marketplace contracts to an EVM chain
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the active network, as keyed in the config file
    #[arg(short, long, env = "NETWORK", default_value = DEVELOPMENT_NETWORK)]
    pub network: String,

    /// Path to the network configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Network RPC URL, overrides the one in the config file
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Index of the local account to deploy from
    #[arg(long)]
    pub account_index: Option<usize>,

    /// Name of the keystore identity to deploy from
    #[arg(long)]
    pub account_id: Option<String>,

    /// Directory holding `<id>.json` keystore files
    #[arg(long, env = "KEYSTORE_DIR", default_value = DEFAULT_KEYSTORE_DIR)]
    pub keystore_dir: PathBuf,

    /// File containing the keystore password
    #[arg(long)]
    pub keystore_password_path: Option<PathBuf>,

    /// Directory holding the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Path to the file in which deployed addresses are recorded
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// API key of the network's block explorer, used to publish source
    #[arg(long, env = "ETHERSCAN_TOKEN", hide_env_values = true)]
    pub etherscan_token: Option<String>,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The account the caller asked for
    pub fn account_request(&self) -> AccountRequest {
        AccountRequest {
            index: self.account_index,
            id: self.account_id.clone(),
        }
    }

    /// The RPC endpoint: the flag, then the config entry, then the local node
    /// for the development network
    pub fn rpc_url(&self, ctx: &NetworkContext) -> Result<String, ScriptError> {
        if let Some(url) = self.rpc_url.clone().or_else(|| ctx.rpc_url()) {
            return Ok(url);
        }

        if ctx.is_development() {
            Ok(DEFAULT_DEVNET_RPC_URL.to_string())
        } else {
            Err(ScriptError::ReadConfig(format!(
                "no `rpc_url` configured for network `{}`",
                ctx.active()
            )))
        }
    }

    /// The explorer client, when both an explorer and an API key are available
    pub fn publisher(&self, ctx: &NetworkContext) -> Option<EtherscanPublisher> {
        match (ctx.explorer(), self.etherscan_token.clone()) {
            (Some(api_url), Some(api_key)) => Some(EtherscanPublisher::new(api_url, api_key)),
            (Some(_), None) => {
                warn!("no ETHERSCAN_TOKEN set, source cannot be published");
                None
            }
            _ => None,
        }
    }
}

/// The deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the full marketplace suite
    Run(RunArgs),
    /// Deploy a WETH token from the first local account
    DeployToken,
    /// Deploy the marketplace against an existing token
    DeployMarketplace(DeployMarketplaceArgs),
    /// Deploy the NFT contract
    DeployNft,
}

impl Command {
    /// Run the command against the given network
    pub async fn run(
        &self,
        ctx: &NetworkContext,
        request: &AccountRequest,
        registry: &dyn AccountRegistry,
        deployer: &impl Deployer,
        deployments_path: &Path,
    ) -> Result<(), ScriptError> {
        let mut plan = DeployPlan {
            marketplace_version: DEFAULT_MARKETPLACE_VERSION,
            deploy_nft: false,
            publish_source: false,
            deployments_path: deployments_path.to_path_buf(),
        };
        let mut out = io::stdout();

        match self {
            Command::Run(args) => {
                plan.marketplace_version = args.marketplace_version;
                plan.deploy_nft = args.with_nft;
                plan.publish_source = !args.no_publish;
                run(&mut out, &plan, request, ctx, registry, deployer).await?;
            }
            Command::DeployToken => {
                let token = deploy_token(registry, deployer).await?;
                report(&mut out, ctx, &plan, Contract::Weth, token)?;
            }
            Command::DeployMarketplace(args) => {
                let from = resolve_account(request, ctx, registry)?;
                let token = args.token(ctx, deployments_path)?;
                let publish_source = !args.no_publish && !ctx.is_development();
                let marketplace = deploy_marketplace(
                    args.marketplace_version,
                    token,
                    &from,
                    publish_source,
                    deployer,
                )
                .await?;
                report(&mut out, ctx, &plan, Contract::Marketplace, marketplace)?;
            }
            Command::DeployNft => {
                let from = resolve_account(request, ctx, registry)?;
                let nft = deploy_nft(&from, deployer).await?;
                report(&mut out, ctx, &plan, Contract::Nft, nft)?;
            }
        }

        Ok(())
    }
}

/// Deploy the marketplace suite
#[derive(Args)]
pub struct RunArgs {
    /// Version identifier passed to the marketplace constructor
    #[arg(long, default_value_t = DEFAULT_MARKETPLACE_VERSION)]
    pub marketplace_version: u64,

    /// Also deploy the NFT contract
    #[arg(long)]
    pub with_nft: bool,

    /// Skip publishing verified source on remote networks
    #[arg(long)]
    pub no_publish: bool,
}

/// Deploy the marketplace against an existing token
#[derive(Args)]
pub struct DeployMarketplaceArgs {
    /// Version identifier passed to the marketplace constructor
    #[arg(long, default_value_t = DEFAULT_MARKETPLACE_VERSION)]
    pub marketplace_version: u64,

    /// WETH token address in hex. On the development network it defaults to the
    /// configured token, then to the token recorded in the deployments file.
    /// Remote networks always use their configured token
    #[arg(short, long)]
    pub weth: Option<String>,

    /// Skip publishing verified source on remote networks
    #[arg(long)]
    pub no_publish: bool,
}

impl DeployMarketplaceArgs {
    /// The token the marketplace is deployed against
    fn token(&self, ctx: &NetworkContext, deployments_path: &Path) -> Result<Address, ScriptError> {
        let weth = self
            .weth
            .as_deref()
            .map(Address::from_str)
            .transpose()
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;

        if !ctx.is_development() {
            let configured = ctx.weth_token()?;
            if weth.is_some_and(|weth| weth != configured) {
                return Err(ScriptError::ReadConfig(format!(
                    "`--weth` differs from the `weth_token` configured for `{}`",
                    ctx.active()
                )));
            }
            return Ok(configured);
        }

        match weth {
            Some(weth) => Ok(weth),
            None => ctx.weth_token().or_else(|_| {
                parse_addr_from_deployments_file(
                    deployments_path,
                    ctx.active(),
                    Contract::Weth.deployments_key(),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_helpers::{development, local_accounts, remote, MockDeployer, MockRegistry, WETH_TOKEN},
        utils::write_deployed_address,
    };

    /// Parse a command line
    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("marketplace-scripts").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["run"]);

        assert_eq!(cli.network, DEVELOPMENT_NETWORK);
        assert_eq!(cli.rpc_url(&development()).unwrap(), DEFAULT_DEVNET_RPC_URL);
        assert!(cli.account_request().index.is_none());
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.marketplace_version, 2);
                assert!(!args.with_nft);
            }
            _ => panic!("expected `run`"),
        }
    }

    #[test]
    fn test_remote_needs_rpc_url() {
        let cli = parse(&["--network", "sepolia", "deploy-nft"]);
        assert!(matches!(cli.rpc_url(&remote()), Err(ScriptError::ReadConfig(_))));

        let cli = parse(&["--rpc-url", "http://node:8545", "deploy-nft"]);
        assert_eq!(cli.rpc_url(&remote()).unwrap(), "http://node:8545");
    }

    #[test]
    fn test_account_flags() {
        let cli = parse(&["--account-index", "2", "--account-id", "deployer", "deploy-nft"]);
        let request = cli.account_request();

        assert_eq!(request.index, Some(2));
        assert_eq!(request.id.as_deref(), Some("deployer"));
    }

    #[tokio::test]
    async fn test_deploy_marketplace_uses_configured_token() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["deploy-marketplace", "--marketplace-version", "1", "--no-publish"]);
        let registry = MockRegistry::new(local_accounts(1));
        let deployer = MockDeployer::default();
        let request = AccountRequest {
            index: Some(0),
            ..Default::default()
        };

        cli.command
            .run(&remote(), &request, &registry, &deployer, &dir.path().join("deployments.json"))
            .await
            .unwrap();

        let calls = deployer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].contract, Contract::Marketplace);
        assert_eq!(calls[0].args[1], alloy::dyn_abi::DynSolValue::Address(WETH_TOKEN));
        assert!(!calls[0].publish_source);
    }

    #[tokio::test]
    async fn test_deploy_marketplace_uses_recorded_token() {
        let dir = tempfile::tempdir().unwrap();
        let deployments_path = dir.path().join("deployments.json");
        let registry = MockRegistry::new(local_accounts(1));
        let deployer = MockDeployer::default();

        parse(&["deploy-token"])
            .command
            .run(
                &development(),
                &AccountRequest::default(),
                &registry,
                &deployer,
                &deployments_path,
            )
            .await
            .unwrap();
        parse(&["deploy-marketplace"])
            .command
            .run(
                &development(),
                &AccountRequest::default(),
                &registry,
                &deployer,
                &deployments_path,
            )
            .await
            .unwrap();

        let calls = deployer.calls();
        let weth = parse_addr_from_deployments_file(
            &deployments_path,
            DEVELOPMENT_NETWORK,
            Contract::Weth.deployments_key(),
        )
        .unwrap();
        assert_eq!(calls[1].args[1], alloy::dyn_abi::DynSolValue::Address(weth));
    }

    #[tokio::test]
    async fn test_deploy_marketplace_ignores_recorded_token_on_remote() {
        let dir = tempfile::tempdir().unwrap();
        let deployments_path = dir.path().join("deployments.json");
        let recorded = Address::repeat_byte(0x77);
        write_deployed_address(
            &deployments_path,
            "mainnet",
            Contract::Weth.deployments_key(),
            recorded,
        )
        .unwrap();

        let ctx = NetworkContext::new("mainnet", Default::default());
        let registry = MockRegistry::new(local_accounts(1));
        let deployer = MockDeployer::default();
        let request = AccountRequest {
            index: Some(0),
            ..Default::default()
        };

        let res = parse(&["deploy-marketplace", "--no-publish"])
            .command
            .run(&ctx, &request, &registry, &deployer, &deployments_path)
            .await;

        assert!(matches!(res, Err(ScriptError::ReadConfig(_))));
        assert!(deployer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_marketplace_rejects_conflicting_token_on_remote() {
        let dir = tempfile::tempdir().unwrap();
        let registry = MockRegistry::new(local_accounts(1));
        let deployer = MockDeployer::default();
        let request = AccountRequest {
            index: Some(0),
            ..Default::default()
        };
        let other = format!("{:#x}", Address::repeat_byte(0x77));

        let res = parse(&["deploy-marketplace", "--weth", &other, "--no-publish"])
            .command
            .run(&remote(), &request, &registry, &deployer, &dir.path().join("deployments.json"))
            .await;

        assert!(matches!(res, Err(ScriptError::ReadConfig(_))));
        assert!(deployer.calls().is_empty());
    }
}
