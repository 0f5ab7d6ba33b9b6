//! Deploys Sierra and legacy Cairo 0 contract classes through the Universal Deployer Contract.
//!
//! The [`DeploymentOrchestrator`] drives one deployment from a parsed [`ContractArtifact`] to a submitted
//! transaction: it resolves the account nonce, builds the deploy transaction, signs it with the
//! [`Account`]'s signer and hands it to a [`Transport`]. Confirmation is left to the caller, see
//! [`DeploymentOrchestrator::wait_for_acceptance`].
//!
//! [`ContractArtifact`]: mp_class::ContractArtifact
//! [`Account`]: mp_signer::Account
//! [`Transport`]: mc_gateway_client::Transport

mod config;
mod error;
mod orchestrator;
mod result;

pub use config::{DeployOptions, NetworkConfig, DEFAULT_MAX_FEE, DEFAULT_MAX_RESOURCE_FEE};
pub use error::{DeployError, DeploymentStage};
pub use orchestrator::DeploymentOrchestrator;
pub use result::{DeploymentResult, DeploymentStatus};

#[cfg(test)]
pub(crate) mod test_utils {
    use mp_class::ContractArtifact;
    use serde_json::json;

    /// A class whose constructor takes a single `ContractAddress`.
    pub fn artifact() -> ContractArtifact {
        let class = json!({
            "sierra_program": ["0x1", "0x2", "0x3"],
            "contract_class_version": "0.1.0",
            "entry_points_by_type": {
                "CONSTRUCTOR": [
                    { "selector": "0x28ffe4ff0f226a9107253e17a904099aa4f63a02a5621de0576e5aa71bc5194", "function_idx": 0 }
                ],
                "EXTERNAL": [],
                "L1_HANDLER": []
            },
            "abi": [
                {
                    "type": "constructor",
                    "name": "constructor",
                    "inputs": [{ "name": "owner", "type": "core::starknet::contract_address::ContractAddress" }]
                }
            ]
        });
        ContractArtifact::parse(&serde_json::to_vec(&class).unwrap()).unwrap()
    }
}
