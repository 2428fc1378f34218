//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading or interpreting the network configuration
    ReadConfig(String),
    /// No strategy produced a signing identity
    AccountResolution(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error constructing constructor calldata for a contract
    CalldataConstruction(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error publishing verified source to a block explorer
    SourcePublication(String),
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
    /// Error printing a deployed address
    WriteOutput(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadConfig(s) => write!(f, "error reading config: {}", s),
            ScriptError::AccountResolution(s) => write!(f, "error resolving account: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::SourcePublication(s) => write!(f, "error publishing source: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::WriteOutput(s) => write!(f, "error writing output: {}", s),
        }
    }
}

impl Error for ScriptError {}
