use std::sync::Arc;

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;
use starknet_core::types::contract::legacy::LegacyContractClass;
use starknet_core::types::contract::{AbiEntry, SierraClass, SierraClassDebugInfo};
use starknet_core::types::{EntryPointsByType, FlattenedSierraClass};
use starknet_types_core::felt::Felt;

mod abi;

pub use abi::ConstructorArity;

/// The only Sierra contract class version the class hash is defined for.
pub const CONTRACT_CLASS_VERSION: &str = "0.1.0";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact is not valid json: {0:#}")]
    InvalidEncoding(#[source] serde_json::Error),
    #[error("Artifact is missing the `{0}` section")]
    MissingSection(&'static str),
    #[error("Artifact abi is not a json array of entries: {0:#}")]
    InvalidAbi(#[source] serde_json::Error),
    #[error("Unsupported Sierra contract class version: {0}")]
    UnsupportedVersion(String),
    #[error("Failed to compute the class hash: {0}")]
    ClassHash(String),
}

/// A compiled class, either Sierra (Cairo 1) with its abi flattened the way it is declared, or a
/// legacy Cairo 0 class.
#[derive(Clone, Debug)]
pub enum ContractClass {
    Sierra(Arc<FlattenedSierraClass>),
    Legacy(Arc<LegacyContractClass>),
}

impl ContractClass {
    pub fn is_legacy(&self) -> bool {
        matches!(self, ContractClass::Legacy(_))
    }
}

/// Only used to tell the two compiler output layouts apart.
#[derive(Deserialize)]
struct ArtifactLayout {
    program: Option<IgnoredAny>,
}

/// `contract_class.json` as emitted by the compiler, or the flattened layout served by the feeder
/// gateway (abi as a string, no debug info).
#[derive(Deserialize)]
struct RawSierraClass {
    sierra_program: Option<Vec<Felt>>,
    contract_class_version: Option<String>,
    entry_points_by_type: Option<EntryPointsByType>,
    abi: Option<Value>,
}

/// A compiled contract class, ready to be deployed.
///
/// Immutable once parsed: the class hash is computed during [`ContractArtifact::parse`] and
/// cached alongside the class.
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    class: ContractClass,
    constructor_arity: ConstructorArity,
    class_hash: Felt,
}

impl ContractArtifact {
    pub fn parse(serialized: &[u8]) -> Result<Self, ArtifactError> {
        let layout: ArtifactLayout = serde_json::from_slice(serialized).map_err(ArtifactError::InvalidEncoding)?;
        let artifact = if layout.program.is_some() { Self::parse_legacy(serialized)? } else { Self::parse_sierra(serialized)? };

        tracing::debug!(
            class_hash = %format!("{:#x}", artifact.class_hash),
            legacy = artifact.class.is_legacy(),
            constructor_arity = %artifact.constructor_arity,
            "Parsed contract artifact"
        );
        Ok(artifact)
    }

    fn parse_legacy(serialized: &[u8]) -> Result<Self, ArtifactError> {
        let class: LegacyContractClass =
            serde_json::from_slice(serialized).map_err(ArtifactError::InvalidEncoding)?;
        let class_hash = class.class_hash().map_err(|err| ArtifactError::ClassHash(err.to_string()))?;
        let constructor_arity = ConstructorArity::from_legacy_abi(&class.abi);
        Ok(Self { class: ContractClass::Legacy(Arc::new(class)), constructor_arity, class_hash })
    }

    fn parse_sierra(serialized: &[u8]) -> Result<Self, ArtifactError> {
        let raw: RawSierraClass = serde_json::from_slice(serialized).map_err(ArtifactError::InvalidEncoding)?;

        let sierra_program = raw.sierra_program.ok_or(ArtifactError::MissingSection("sierra_program"))?;
        let abi = raw.abi.ok_or(ArtifactError::MissingSection("abi"))?;
        let contract_class_version =
            raw.contract_class_version.ok_or(ArtifactError::MissingSection("contract_class_version"))?;
        if contract_class_version != CONTRACT_CLASS_VERSION {
            return Err(ArtifactError::UnsupportedVersion(contract_class_version));
        }
        let entry_points_by_type = raw
            .entry_points_by_type
            .unwrap_or(EntryPointsByType { constructor: vec![], external: vec![], l1_handler: vec![] });

        let (class, abi_entries) = match abi {
            // Already flattened: hashed as is, whatever its formatting.
            Value::String(abi) => {
                let abi_entries: Vec<AbiEntry> = serde_json::from_str(&abi).map_err(ArtifactError::InvalidAbi)?;
                let class = FlattenedSierraClass { sierra_program, contract_class_version, entry_points_by_type, abi };
                (class, abi_entries)
            }
            abi => {
                let abi_entries: Vec<AbiEntry> = serde_json::from_value(abi).map_err(ArtifactError::InvalidAbi)?;
                let class = SierraClass {
                    sierra_program,
                    // Not part of the class hash.
                    sierra_program_debug_info: SierraClassDebugInfo {
                        type_names: vec![],
                        libfunc_names: vec![],
                        user_func_names: vec![],
                    },
                    contract_class_version,
                    entry_points_by_type,
                    abi: abi_entries.clone(),
                };
                let class = class.flatten().map_err(|err| ArtifactError::ClassHash(err.to_string()))?;
                (class, abi_entries)
            }
        };

        let class_hash = class.class_hash();
        let constructor_arity = ConstructorArity::from_sierra_abi(&abi_entries);
        Ok(Self { class: ContractClass::Sierra(Arc::new(class)), constructor_arity, class_hash })
    }

    pub fn class_hash(&self) -> Felt {
        self.class_hash
    }

    pub fn class(&self) -> &ContractClass {
        &self.class
    }

    pub fn constructor_arity(&self) -> ConstructorArity {
        self.constructor_arity
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const PRIME: &str = "0x800000000000011000000000000000000000000000000000000000000000001";

    pub(crate) fn dummy_class_json() -> Value {
        json!({
            "sierra_program": ["0x1", "0x2", "0x3", "0x4"],
            "sierra_program_debug_info": { "type_names": [], "libfunc_names": [], "user_func_names": [] },
            "contract_class_version": "0.1.0",
            "entry_points_by_type": {
                "EXTERNAL": [
                    { "selector": "0x22ff5f21f0b81b113e63f7db6da94fedef11b2119b4088b89664fb9a3cb658", "function_idx": 0 }
                ],
                "L1_HANDLER": [],
                "CONSTRUCTOR": [
                    { "selector": "0x28ffe4ff0f226a9107253e17a904099aa4f63a02a5621de0576e5aa71bc5194", "function_idx": 1 }
                ]
            },
            "abi": [
                {
                    "type": "constructor",
                    "name": "constructor",
                    "inputs": [{ "name": "token", "type": "core::starknet::contract_address::ContractAddress" }]
                },
                {
                    "type": "function",
                    "name": "get_token",
                    "inputs": [],
                    "outputs": [{ "type": "core::starknet::contract_address::ContractAddress" }],
                    "state_mutability": "view"
                }
            ]
        })
    }

    /// Cairo 0 pricing contract, its constructor takes the fee token address.
    fn legacy_class_json() -> Value {
        json!({
            "abi": [
                {
                    "type": "constructor",
                    "name": "constructor",
                    "inputs": [{ "name": "erc20_address", "type": "felt" }],
                    "outputs": []
                },
                {
                    "type": "function",
                    "name": "compute_buy_price",
                    "inputs": [{ "name": "domain_len", "type": "felt" }, { "name": "domain", "type": "felt*" }],
                    "outputs": [{ "name": "erc20_address", "type": "felt" }, { "name": "price", "type": "Uint256" }],
                    "stateMutability": "view"
                },
                {
                    "type": "struct",
                    "name": "Uint256",
                    "size": 2,
                    "members": [
                        { "name": "low", "offset": 0, "type": "felt" },
                        { "name": "high", "offset": 1, "type": "felt" }
                    ]
                }
            ],
            "entry_points_by_type": {
                "CONSTRUCTOR": [
                    { "offset": "0x3a", "selector": "0x28ffe4ff0f226a9107253e17a904099aa4f63a02a5621de0576e5aa71bc5194" }
                ],
                "EXTERNAL": [
                    { "offset": "0x5f", "selector": "0x1d5d4f1e9cad1bd2aa0ed4a1dd8d7bf70e2fb1c3ca2bda6e8c6d5d2d6c5ca21" }
                ],
                "L1_HANDLER": []
            },
            "program": {
                "attributes": [],
                "builtins": ["pedersen", "range_check"],
                "compiler_version": "0.10.3",
                "data": ["0x40780017fff7fff", "0x1", "0x208b7fff7fff7ffe"],
                "debug_info": null,
                "hints": {},
                "identifiers": {},
                "main_scope": "__main__",
                "prime": PRIME,
                "reference_manager": { "references": [] }
            }
        })
    }

    fn parse(value: &Value) -> Result<ContractArtifact, ArtifactError> {
        ContractArtifact::parse(&serde_json::to_vec(value).unwrap())
    }

    fn flattened(artifact: &ContractArtifact) -> &FlattenedSierraClass {
        match artifact.class() {
            ContractClass::Sierra(class) => class,
            ContractClass::Legacy(_) => panic!("Expected a Sierra class"),
        }
    }

    #[test]
    fn parse_contract_class() {
        let artifact = parse(&dummy_class_json()).unwrap();
        let class = flattened(&artifact);

        assert_eq!(class.sierra_program, vec![Felt::ONE, Felt::TWO, Felt::THREE, Felt::from(4)]);
        assert_eq!(class.entry_points_by_type.external.len(), 1);
        assert_eq!(class.entry_points_by_type.constructor[0].function_idx, 1);
        assert!(class.entry_points_by_type.l1_handler.is_empty());
        assert_eq!(artifact.constructor_arity(), ConstructorArity::Exact(1));
        assert!(class.abi.starts_with(r#"[{"type": "constructor", "name": "constructor", "inputs": [{"#));
    }

    #[test]
    fn class_hash_matches_compiler_output_hash() {
        let artifact = parse(&dummy_class_json()).unwrap();
        let class: SierraClass = serde_json::from_value(dummy_class_json()).unwrap();
        assert_eq!(artifact.class_hash(), class.class_hash().unwrap());
    }

    #[test]
    fn parse_is_deterministic() {
        let a = parse(&dummy_class_json()).unwrap();
        let b = parse(&dummy_class_json()).unwrap();
        assert_eq!(a.class_hash(), b.class_hash());
        assert_eq!(flattened(&a), flattened(&b));
    }

    #[test]
    fn debug_info_is_optional() {
        let mut class = dummy_class_json();
        class.as_object_mut().unwrap().remove("sierra_program_debug_info");
        assert_eq!(parse(&class).unwrap().class_hash(), parse(&dummy_class_json()).unwrap().class_hash());
    }

    #[test]
    fn flattened_abi_hashes_like_abi_entries() {
        let artifact = parse(&dummy_class_json()).unwrap();

        let mut flattened_json = dummy_class_json();
        flattened_json["abi"] = Value::String(flattened(&artifact).abi.clone());
        let from_flattened = parse(&flattened_json).unwrap();

        assert_eq!(from_flattened.class_hash(), artifact.class_hash());
        assert_eq!(from_flattened.constructor_arity(), artifact.constructor_arity());
    }

    #[test]
    fn class_hash_depends_on_bytecode_and_abi() {
        let artifact = parse(&dummy_class_json()).unwrap();

        let mut other_program = dummy_class_json();
        other_program["sierra_program"] = json!(["0x1", "0x2", "0x3", "0x5"]);
        assert_ne!(parse(&other_program).unwrap().class_hash(), artifact.class_hash());

        let mut other_abi = dummy_class_json();
        other_abi["abi"][1]["state_mutability"] = json!("external");
        assert_ne!(parse(&other_abi).unwrap().class_hash(), artifact.class_hash());
    }

    #[test]
    fn missing_sections() {
        let mut no_program = dummy_class_json();
        no_program.as_object_mut().unwrap().remove("sierra_program");
        assert_matches!(parse(&no_program), Err(ArtifactError::MissingSection("sierra_program")));

        let mut no_abi = dummy_class_json();
        no_abi.as_object_mut().unwrap().remove("abi");
        assert_matches!(parse(&no_abi), Err(ArtifactError::MissingSection("abi")));
    }

    #[test]
    fn undecodable_artifacts() {
        assert_matches!(ContractArtifact::parse(b"not json"), Err(ArtifactError::InvalidEncoding(_)));

        let mut bad_felt = dummy_class_json();
        bad_felt["sierra_program"] = json!(["0xnotafelt"]);
        assert_matches!(parse(&bad_felt), Err(ArtifactError::InvalidEncoding(_)));

        let mut bad_abi = dummy_class_json();
        bad_abi["abi"] = json!("{ not an abi");
        assert_matches!(parse(&bad_abi), Err(ArtifactError::InvalidAbi(_)));

        let mut unknown_entry = dummy_class_json();
        unknown_entry["abi"] = json!([{ "type": "mystery" }]);
        assert_matches!(parse(&unknown_entry), Err(ArtifactError::InvalidAbi(_)));
    }

    #[test]
    fn unsupported_class_version() {
        let mut class = dummy_class_json();
        class["contract_class_version"] = json!("0.2.0");
        assert_matches!(parse(&class), Err(ArtifactError::UnsupportedVersion(v)) if v == "0.2.0");
    }

    #[test]
    fn parse_legacy_class() {
        let artifact = parse(&legacy_class_json()).unwrap();
        assert!(artifact.class().is_legacy());
        assert_eq!(artifact.constructor_arity(), ConstructorArity::Exact(1));

        let class: LegacyContractClass = serde_json::from_value(legacy_class_json()).unwrap();
        assert_eq!(artifact.class_hash(), class.class_hash().unwrap());
    }

    #[test]
    fn legacy_class_hash_depends_on_bytecode() {
        let artifact = parse(&legacy_class_json()).unwrap();

        let mut other = legacy_class_json();
        other["program"]["data"] = json!(["0x40780017fff7fff", "0x2", "0x208b7fff7fff7ffe"]);
        assert_ne!(parse(&other).unwrap().class_hash(), artifact.class_hash());
    }

    #[test]
    fn malformed_legacy_class() {
        let mut class = legacy_class_json();
        class["program"].as_object_mut().unwrap().remove("data");
        assert_matches!(parse(&class), Err(ArtifactError::InvalidEncoding(_)));
    }
}
