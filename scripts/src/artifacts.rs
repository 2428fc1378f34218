//! Compiled contract artifacts and the creation code built from them

use std::{fs, path::Path};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{hex, Bytes},
};
use serde::Deserialize;

use crate::{constants::JSON_EXTENSION, errors::ScriptError, types::Contract};

/// The on-disk layout of a compilation artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// The name of the compiled contract
    contract_name: Option<String>,
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: RawBytecode,
    /// The flattened Solidity source, when the compiler kept it
    source: Option<String>,
    /// The compiler settings used to produce the bytecode
    compiler: Option<CompilerSettings>,
}

/// Creation bytecode, either a bare hex string or a `{ "object": hex }` map
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// A bare hex string
    Hex(String),
    /// A map holding the hex string under `object`
    Object {
        /// The hex string
        object: String,
    },
}

/// Compiler settings recorded in an artifact
#[derive(Clone, Debug, Deserialize)]
pub struct CompilerSettings {
    /// The full compiler version, e.g. `0.8.19+commit.7dd6d404`
    pub version: String,
    /// The optimizer settings
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

/// Optimizer settings recorded in an artifact
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OptimizerSettings {
    /// Whether the optimizer ran
    #[serde(default)]
    pub enabled: bool,
    /// The number of optimizer runs
    #[serde(default)]
    pub runs: u32,
}

/// A compiled contract, ready to be deployed
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The contract name
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
    /// The flattened Solidity source, if present
    pub source: Option<String>,
    /// The compiler settings, if present
    pub compiler: Option<CompilerSettings>,
}

impl ContractArtifact {
    /// Load the artifact of `contract` from `artifacts_dir`
    pub fn load(artifacts_dir: &Path, contract: Contract) -> Result<Self, ScriptError> {
        let path = artifacts_dir.join(format!("{}.{JSON_EXTENSION}", contract.name()));
        let contents = fs::read_to_string(&path).map_err(|e| {
            ScriptError::ArtifactParsing(format!("could not read {}: {e}", path.display()))
        })?;

        Self::parse(contract.name(), &contents)
    }

    /// Parse an artifact from its JSON contents
    pub fn parse(default_name: &str, contents: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        let hex_code = match &raw.bytecode {
            RawBytecode::Hex(code) | RawBytecode::Object { object: code } => code,
        };
        let bytecode = hex::decode(hex_code)
            .map_err(|e| ScriptError::ArtifactParsing(format!("invalid bytecode: {e}")))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "`{default_name}` has no bytecode, is it abstract?"
            )));
        }

        Ok(Self {
            name: raw.contract_name.unwrap_or_else(|| default_name.to_string()),
            abi: raw.abi,
            bytecode: bytecode.into(),
            source: raw.source,
            compiler: raw.compiler,
        })
    }

    /// ABI-encode constructor arguments, type-checked against the constructor
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> Result<Vec<u8>, ScriptError> {
        match self.abi.constructor() {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string())),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(ScriptError::CalldataConstruction(format!(
                "`{}` has no constructor but {} arguments were given",
                self.name,
                args.len()
            ))),
        }
    }

    /// The creation code: bytecode followed by the encoded constructor arguments
    pub fn deploy_code(&self, encoded_args: &[u8]) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(encoded_args);
        code.into()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256};

    use super::*;

    /// A marketplace-shaped artifact: `constructor(uint256, address)`
    const MARKETPLACE_ARTIFACT: &str = r#"{
        "contractName": "Marketplace",
        "abi": [{
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "_version", "type": "uint256", "internalType": "uint256" },
                { "name": "_weth", "type": "address", "internalType": "address" }
            ]
        }],
        "bytecode": "0x6080604052",
        "source": "contract Marketplace {}",
        "compiler": { "version": "0.8.19+commit.7dd6d404", "optimizer": { "enabled": true, "runs": 200 } }
    }"#;

    /// An artifact without constructor, with `{ "object": .. }` bytecode
    const NFT_ARTIFACT: &str = r#"{ "abi": [], "bytecode": { "object": "6080" } }"#;

    #[test]
    fn test_encode_marketplace_constructor() {
        let artifact = ContractArtifact::parse("Marketplace", MARKETPLACE_ARTIFACT).unwrap();
        let weth = Address::repeat_byte(0x11);
        let args = [DynSolValue::Uint(U256::from(2), 256), DynSolValue::Address(weth)];

        let encoded = artifact.encode_constructor_args(&args).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 2);
        assert_eq!(&encoded[44..], weth.as_slice());

        let code = artifact.deploy_code(&encoded);
        assert_eq!(&code[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(code.len(), 5 + 64);
    }

    #[test]
    fn test_constructor_type_mismatch() {
        let artifact = ContractArtifact::parse("Marketplace", MARKETPLACE_ARTIFACT).unwrap();
        let args = [DynSolValue::Address(Address::ZERO)];

        assert!(matches!(
            artifact.encode_constructor_args(&args),
            Err(ScriptError::CalldataConstruction(_))
        ));
    }

    #[test]
    fn test_no_constructor() {
        let artifact = ContractArtifact::parse("NFT", NFT_ARTIFACT).unwrap();

        assert_eq!(artifact.name, "NFT");
        assert!(artifact.source.is_none());
        assert!(artifact.encode_constructor_args(&[]).unwrap().is_empty());
        assert!(artifact.encode_constructor_args(&[DynSolValue::Bool(true)]).is_err());
    }

    #[test]
    fn test_compiler_settings() {
        let artifact = ContractArtifact::parse("Marketplace", MARKETPLACE_ARTIFACT).unwrap();
        let compiler = artifact.compiler.unwrap();

        assert_eq!(compiler.version, "0.8.19+commit.7dd6d404");
        assert!(compiler.optimizer.enabled);
        assert_eq!(compiler.optimizer.runs, 200);
    }

    #[test]
    fn test_invalid_artifacts() {
        let empty = r#"{ "abi": [], "bytecode": "0x" }"#;
        let unlinked = r#"{ "abi": [], "bytecode": "0x60__$lib$__" }"#;

        assert!(matches!(
            ContractArtifact::parse("WETH", empty),
            Err(ScriptError::ArtifactParsing(_))
        ));
        assert!(ContractArtifact::parse("WETH", unlinked).is_err());
        assert!(ContractArtifact::parse("WETH", "[]").is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("NFT.json"), NFT_ARTIFACT).unwrap();

        assert!(ContractArtifact::load(dir.path(), Contract::Nft).is_ok());
        assert!(ContractArtifact::load(dir.path(), Contract::Weth).is_err());
    }
}
