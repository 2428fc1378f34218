//! Publication of verified contract source to an Etherscan-compatible explorer

use alloy::primitives::Address;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    artifacts::ContractArtifact,
    constants::{
        ALREADY_VERIFIED, CONTRACT_NOT_INDEXED, EXPLORER_POLL_INTERVAL,
        MAX_VERIFICATION_STATUS_POLLS, MAX_VERIFICATION_SUBMISSIONS, VERIFICATION_PASSED,
        VERIFICATION_PENDING,
    },
    errors::ScriptError,
};

/// The envelope of every explorer API response
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    /// `"1"` on success, `"0"` otherwise
    pub status: String,
    /// A short status message
    pub message: String,
    /// The payload: a GUID, a status string or an error message
    pub result: String,
}

/// The outcome of a verification submission
#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    /// Accepted, with the GUID to poll
    Accepted(String),
    /// The source is already public
    AlreadyVerified,
    /// The explorer has not indexed the bytecode yet
    NotIndexed,
    /// Rejected outright
    Rejected(String),
}

impl From<ExplorerResponse> for Submission {
    fn from(resp: ExplorerResponse) -> Self {
        if resp.status == "1" {
            Submission::Accepted(resp.result)
        } else if resp.result.to_lowercase().contains(ALREADY_VERIFIED) {
            Submission::AlreadyVerified
        } else if resp.result.contains(CONTRACT_NOT_INDEXED) {
            Submission::NotIndexed
        } else {
            Submission::Rejected(format!("{}: {}", resp.message, resp.result))
        }
    }
}

/// The state of a submitted verification
#[derive(Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Still queued
    Pending,
    /// Verified
    Passed,
    /// Verification failed
    Failed(String),
}

impl From<ExplorerResponse> for VerificationStatus {
    fn from(resp: ExplorerResponse) -> Self {
        if resp.result == VERIFICATION_PENDING {
            VerificationStatus::Pending
        } else if resp.result.starts_with(VERIFICATION_PASSED)
            || resp.result.to_lowercase().contains(ALREADY_VERIFIED)
        {
            VerificationStatus::Passed
        } else {
            VerificationStatus::Failed(resp.result)
        }
    }
}

/// Builds the form fields of a `verifysourcecode` request, without the API key
pub fn verification_params(
    artifact: &ContractArtifact,
    address: Address,
    constructor_args: &[u8],
) -> Result<Vec<(&'static str, String)>, ScriptError> {
    let source = artifact.source.clone().ok_or_else(|| {
        ScriptError::SourcePublication(format!("artifact of `{}` has no source", artifact.name))
    })?;
    let compiler = artifact.compiler.as_ref().ok_or_else(|| {
        ScriptError::SourcePublication(format!(
            "artifact of `{}` has no compiler settings",
            artifact.name
        ))
    })?;

    Ok(vec![
        ("module", "contract".to_string()),
        ("action", "verifysourcecode".to_string()),
        ("contractaddress", format!("{address:#x}")),
        ("sourceCode", source),
        ("codeformat", "solidity-single-file".to_string()),
        ("contractname", artifact.name.clone()),
        ("compilerversion", format!("v{}", compiler.version.trim_start_matches('v'))),
        ("optimizationUsed", u8::from(compiler.optimizer.enabled).to_string()),
        ("runs", compiler.optimizer.runs.to_string()),
        // Misspelled in the explorer API itself
        ("constructorArguements", hex::encode(constructor_args)),
    ])
}

/// Client for an Etherscan-compatible verification API
#[derive(Clone, Debug)]
pub struct EtherscanPublisher {
    /// The HTTP client
    client: reqwest::Client,
    /// The explorer API endpoint
    api_url: String,
    /// The explorer API key
    api_key: String,
}

impl EtherscanPublisher {
    /// Create a publisher for the given endpoint and key
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    /// Publish the source of `artifact`, deployed at `address`, and wait for the
    /// explorer to confirm it
    pub async fn publish(
        &self,
        artifact: &ContractArtifact,
        address: Address,
        constructor_args: &[u8],
    ) -> Result<(), ScriptError> {
        let mut params = verification_params(artifact, address, constructor_args)?;
        params.push(("apikey", self.api_key.clone()));

        let Some(guid) = self.submit(&params).await? else {
            info!("{} at {address} is already verified", artifact.name);
            return Ok(());
        };

        for _ in 0..MAX_VERIFICATION_STATUS_POLLS {
            sleep(EXPLORER_POLL_INTERVAL).await;
            match self.status(&guid).await? {
                VerificationStatus::Pending => continue,
                VerificationStatus::Passed => {
                    info!("verified source of {} at {address}", artifact.name);
                    return Ok(());
                }
                VerificationStatus::Failed(reason) => {
                    return Err(ScriptError::SourcePublication(reason));
                }
            }
        }

        Err(ScriptError::SourcePublication(format!("verification {guid} still pending")))
    }

    /// Submit the verification request, returning the GUID to poll, or `None`
    /// if the source is already public
    async fn submit(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<Option<String>, ScriptError> {
        for _ in 0..MAX_VERIFICATION_SUBMISSIONS {
            let resp: ExplorerResponse = self
                .client
                .post(&self.api_url)
                .form(params)
                .send()
                .await
                .and_then(|resp| resp.error_for_status())
                .map_err(|e| ScriptError::SourcePublication(e.to_string()))?
                .json()
                .await
                .map_err(|e| ScriptError::SourcePublication(e.to_string()))?;

            match Submission::from(resp) {
                Submission::Accepted(guid) => return Ok(Some(guid)),
                Submission::AlreadyVerified => return Ok(None),
                Submission::NotIndexed => {
                    warn!("explorer has not indexed the contract yet, retrying");
                    sleep(EXPLORER_POLL_INTERVAL).await;
                }
                Submission::Rejected(reason) => {
                    return Err(ScriptError::SourcePublication(reason));
                }
            }
        }

        Err(ScriptError::SourcePublication("explorer never indexed the contract".to_string()))
    }

    /// Fetch the status of a submitted verification
    async fn status(&self, guid: &str) -> Result<VerificationStatus, ScriptError> {
        let resp: ExplorerResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| ScriptError::SourcePublication(e.to_string()))?
            .json()
            .await
            .map_err(|e| ScriptError::SourcePublication(e.to_string()))?;

        Ok(resp.into())
    }
}
