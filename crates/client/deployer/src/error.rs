use std::fmt;

use mc_gateway_client::TransportError;
use mp_chain_config::ChainId;
use mp_class::{ArtifactError, ConstructorArity};
use mp_gateway::error::StarknetErrorCode;
use mp_signer::SignerError;
use mp_transactions::BuildError;
use starknet_types_core::felt::Felt;

/// How far a deployment went. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeploymentStage {
    /// Validating inputs and resolving the nonce, nothing has been built yet.
    Preparing,
    Built,
    Signed,
    Submitted,
    Accepted,
    Rejected,
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeploymentStage::Preparing => "preparing",
            DeploymentStage::Built => "built",
            DeploymentStage::Signed => "signed",
            DeploymentStage::Submitted => "submitted",
            DeploymentStage::Accepted => "accepted",
            DeploymentStage::Rejected => "rejected",
        })
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DeployError {
    #[error("Malformed contract artifact: {0}")]
    MalformedArtifact(String),
    #[error("Constructor expects {expected} calldata felts, got {actual}")]
    CalldataArityMismatch { expected: ConstructorArity, actual: usize },
    #[error("Invalid signing key: {0}")]
    InvalidKey(#[source] SignerError),
    #[error("Transport failure after the deployment was {stage}: {source}")]
    Transport {
        stage: DeploymentStage,
        #[source]
        source: TransportError,
    },
    #[error("Gateway rejected the deployment with {code}: {reason}")]
    GatewayRejected { stage: DeploymentStage, code: StarknetErrorCode, reason: String },
    #[error("Unexpected gateway response after the deployment was {stage}: {message}")]
    UnexpectedResponse { stage: DeploymentStage, message: String },
    #[error("Account is configured for chain {account} but the network is {network}")]
    ChainIdMismatch { account: ChainId, network: ChainId },
    #[error("Requested max fee {requested:#x} is above the configured ceiling {ceiling:#x}")]
    MaxFeeAboveCeiling { requested: Felt, ceiling: Felt },
    #[error("Resource bounds allow a fee of {requested:#x}, above the configured ceiling {ceiling:#x}")]
    ResourceBoundsAboveCeiling { requested: Felt, ceiling: Felt },
    #[error("Version 3 deployments require resource bounds")]
    MissingResourceBounds,
}

impl DeployError {
    pub(crate) fn transport(stage: DeploymentStage, error: TransportError) -> Self {
        match error {
            TransportError::GatewayRejected { code, reason } => DeployError::GatewayRejected { stage, code, reason },
            TransportError::UnexpectedResponse(message) => DeployError::UnexpectedResponse { stage, message },
            source => DeployError::Transport { stage, source },
        }
    }

    /// The last stage the deployment reached before failing.
    pub fn stage(&self) -> DeploymentStage {
        match self {
            DeployError::MalformedArtifact(_)
            | DeployError::CalldataArityMismatch { .. }
            | DeployError::ChainIdMismatch { .. }
            | DeployError::MaxFeeAboveCeiling { .. }
            | DeployError::ResourceBoundsAboveCeiling { .. }
            | DeployError::MissingResourceBounds => DeploymentStage::Preparing,
            DeployError::InvalidKey(_) => DeploymentStage::Built,
            DeployError::Transport { stage, .. }
            | DeployError::GatewayRejected { stage, .. }
            | DeployError::UnexpectedResponse { stage, .. } => *stage,
        }
    }

    /// Stable, machine readable name of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            DeployError::MalformedArtifact(_) => "malformed_artifact",
            DeployError::CalldataArityMismatch { .. } => "calldata_arity_mismatch",
            DeployError::InvalidKey(_) => "invalid_key",
            DeployError::Transport { source: TransportError::Timeout, .. } => "transport_timeout",
            DeployError::Transport { .. } => "transport",
            DeployError::GatewayRejected { .. } => "gateway_rejected",
            DeployError::UnexpectedResponse { .. } => "unexpected_response",
            DeployError::ChainIdMismatch { .. } => "chain_id_mismatch",
            DeployError::MaxFeeAboveCeiling { .. } => "max_fee_above_ceiling",
            DeployError::ResourceBoundsAboveCeiling { .. } => "resource_bounds_above_ceiling",
            DeployError::MissingResourceBounds => "missing_resource_bounds",
        }
    }
}

impl From<ArtifactError> for DeployError {
    fn from(error: ArtifactError) -> Self {
        DeployError::MalformedArtifact(error.to_string())
    }
}

impl From<BuildError> for DeployError {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::CalldataArityMismatch { expected, actual } => {
                DeployError::CalldataArityMismatch { expected, actual }
            }
            BuildError::MissingResourceBounds => DeployError::MissingResourceBounds,
        }
    }
}

impl From<SignerError> for DeployError {
    fn from(error: SignerError) -> Self {
        DeployError::InvalidKey(error)
    }
}
