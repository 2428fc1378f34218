//! Implementations of the deploy scripts

use std::io::Write;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use tracing::info;

use crate::{
    accounts::{resolve_account, AccountRegistry, AccountRequest, SigningIdentity},
    config::NetworkContext,
    deployer::{DeployRequest, Deployer},
    errors::ScriptError,
    types::{Contract, DeployPlan, TokenSource},
    utils::write_deployed_address,
};

/// Deploy the WETH token from the default local account
pub async fn deploy_token(
    registry: &dyn AccountRegistry,
    deployer: &impl Deployer,
) -> Result<Address, ScriptError> {
    let from = registry.at(0)?;
    let request = DeployRequest {
        contract: Contract::Weth,
        args: Vec::new(),
        from,
        publish_source: false,
    };

    deployer.deploy(request).await
}

/// Deploy the marketplace with the given version identifier and token
pub async fn deploy_marketplace(
    version: u64,
    token: Address,
    from: &SigningIdentity,
    publish_source: bool,
    deployer: &impl Deployer,
) -> Result<Address, ScriptError> {
    let request = DeployRequest {
        contract: Contract::Marketplace,
        args: vec![DynSolValue::Uint(U256::from(version), 256), DynSolValue::Address(token)],
        from: from.clone(),
        publish_source,
    };

    deployer.deploy(request).await
}

/// Deploy the NFT contract
pub async fn deploy_nft(
    from: &SigningIdentity,
    deployer: &impl Deployer,
) -> Result<Address, ScriptError> {
    let request = DeployRequest {
        contract: Contract::Nft,
        args: Vec::new(),
        from: from.clone(),
        publish_source: false,
    };

    deployer.deploy(request).await
}

/// Decide the marketplace's token: a fresh WETH on the development network,
/// the configured one anywhere else
pub async fn resolve_token(
    ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
    deployer: &impl Deployer,
) -> Result<TokenSource, ScriptError> {
    if ctx.is_development() {
        let token = deploy_token(registry, deployer).await?;
        info!("deployed WETH at {token}");
        Ok(TokenSource::Fresh(token))
    } else {
        Ok(TokenSource::Configured(ctx.weth_token()?))
    }
}

/// Print a deployed address to `out` and record it in the deployments file
pub fn report(
    out: &mut impl Write,
    ctx: &NetworkContext,
    plan: &DeployPlan,
    contract: Contract,
    address: Address,
) -> Result<(), ScriptError> {
    writeln!(out, "{} deployed to {address}", contract.label())
        .map_err(|e| ScriptError::WriteOutput(e.to_string()))?;
    write_deployed_address(
        &plan.deployments_path,
        ctx.active(),
        contract.deployments_key(),
        address,
    )
}

/// Deploy the marketplace suite: resolve the account, pick the token, deploy
/// the marketplace, then the NFT contract if requested.
///
/// Returns the deployed contracts in order, each also printed to `out`.
pub async fn run(
    out: &mut impl Write,
    plan: &DeployPlan,
    request: &AccountRequest,
    ctx: &NetworkContext,
    registry: &dyn AccountRegistry,
    deployer: &impl Deployer,
) -> Result<Vec<(Contract, Address)>, ScriptError> {
    let account = resolve_account(request, ctx, registry)?;
    let mut deployed = Vec::new();

    let token = resolve_token(ctx, registry, deployer).await?;
    if let TokenSource::Fresh(addr) = token {
        report(out, ctx, plan, Contract::Weth, addr)?;
        deployed.push((Contract::Weth, addr));
    }

    let publish_source = plan.publish_source && !ctx.is_development();
    let marketplace = deploy_marketplace(
        plan.marketplace_version,
        token.address(),
        &account,
        publish_source,
        deployer,
    )
    .await?;
    report(out, ctx, plan, Contract::Marketplace, marketplace)?;
    deployed.push((Contract::Marketplace, marketplace));

    if plan.deploy_nft {
        let nft = deploy_nft(&account, deployer).await?;
        report(out, ctx, plan, Contract::Nft, nft)?;
        deployed.push((Contract::Nft, nft));
    }

    Ok(deployed)
}
