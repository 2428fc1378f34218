use clap::Parser;
use scripts::{
    accounts::NodeAccounts, cli::Cli, config::NetworkContext, deployer::RpcDeployer,
    errors::ScriptError, utils::setup_client,
};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // A missing `.env` file is fine
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let ctx = NetworkContext::load(&cli.config, &cli.network)?;
    let rpc_url = cli.rpc_url(&ctx)?;

    let client = setup_client(&rpc_url, None /* signer */)?;
    let registry = NodeAccounts::fetch(
        &client,
        &ctx,
        cli.keystore_dir.clone(),
        cli.keystore_password_path.as_deref(),
    )
    .await?;
    let deployer = RpcDeployer::new(rpc_url, cli.artifacts_dir.clone(), cli.publisher(&ctx));

    cli.command
        .run(&ctx, &cli.account_request(), &registry, &deployer, &cli.deployments_path)
        .await
}
