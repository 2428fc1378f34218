//! Utilities for the deploy scripts.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use serde_json::{Map, Value};

use crate::errors::ScriptError;

/// The provider type used by the scripts
pub type Client = DynProvider<Ethereum>;

/// Sets up a client for the given RPC url.
///
/// With a signer attached, transactions are signed locally; without one they
/// are handed to the node, which must manage the sending account.
pub fn setup_client(
    rpc_url: &str,
    signer: Option<PrivateKeySigner>,
) -> Result<Client, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let client = match signer {
        Some(signer) => DynProvider::new(ProviderBuilder::new().wallet(signer).connect_http(url)),
        None => DynProvider::new(ProviderBuilder::new().connect_http(url)),
    };

    Ok(client)
}

/// Read the deployments file, or an empty object if it does not exist yet
fn read_deployments(file_path: &Path) -> Result<Value, ScriptError> {
    if !file_path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents =
        fs::read_to_string(file_path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Read the address recorded for `contract_key` on `network`
pub fn parse_addr_from_deployments_file(
    file_path: &Path,
    network: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = read_deployments(file_path)?;

    let addr = parsed_json[network][contract_key].as_str().ok_or_else(|| {
        ScriptError::ReadDeployments(format!(
            "no `{contract_key}` recorded for network `{network}` in {}",
            file_path.display()
        ))
    })?;

    Address::from_str(addr).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record the address of `contract_key` on `network`, keeping all other entries
pub fn write_deployed_address(
    file_path: &Path,
    network: &str,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut parsed_json = read_deployments(file_path)?;

    let not_an_object =
        || ScriptError::WriteDeployments(format!("{} is not a JSON object", file_path.display()));
    parsed_json
        .as_object_mut()
        .ok_or_else(not_an_object)?
        .entry(network)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(not_an_object)?
        .insert(contract_key.to_string(), Value::String(format!("{address:#x}")));

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}
