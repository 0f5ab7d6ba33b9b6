use mp_chain_config::ChainId;
use mp_class::{ConstructorArity, ContractArtifact};
use starknet_types_core::felt::Felt;

use crate::udc::{self, DEPLOY_CONTRACT_SELECTOR, UDC_ADDRESS};
use crate::{
    DataAvailabilityMode, DeployTransaction, DeployVersion, ExecutionEncoding, InvokeTransaction, InvokeTransactionV1,
    InvokeTransactionV3, ResourceBoundsMapping,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Constructor expects {expected} calldata felts, got {actual}")]
    CalldataArityMismatch { expected: ConstructorArity, actual: usize },
    #[error("Version 3 transactions require resource bounds")]
    MissingResourceBounds,
}

/// Assembles deploy transactions sent from one account on one chain.
///
/// ```ignore
/// let tx = TransactionBuilder::new(account_address, ChainId::Sepolia)
///     .nonce(nonce)
///     .salt(salt)
///     .max_fee(max_fee)
///     .build_deploy(&artifact, &constructor_calldata, DeployVersion::V1)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    sender_address: Felt,
    chain_id: ChainId,
    nonce: Felt,
    salt: Felt,
    unique: bool,
    execution_encoding: ExecutionEncoding,
    max_fee: Option<Felt>,
    resource_bounds: Option<ResourceBoundsMapping>,
    tip: u64,
    query_only: bool,
}

impl TransactionBuilder {
    pub fn new(sender_address: Felt, chain_id: ChainId) -> Self {
        Self {
            sender_address,
            chain_id,
            nonce: Felt::ZERO,
            salt: Felt::ZERO,
            unique: true,
            execution_encoding: ExecutionEncoding::New,
            max_fee: None,
            resource_bounds: None,
            tip: 0,
            query_only: false,
        }
    }

    pub fn nonce(mut self, nonce: Felt) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn salt(mut self, salt: Felt) -> Self {
        self.salt = salt;
        self
    }

    /// Unique deployments derive the contract address from the sender address too.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn execution_encoding(mut self, execution_encoding: ExecutionEncoding) -> Self {
        self.execution_encoding = execution_encoding;
        self
    }

    /// Only used by version 1 transactions. Defaults to zero.
    pub fn max_fee(mut self, max_fee: Felt) -> Self {
        self.max_fee = Some(max_fee);
        self
    }

    /// Required by version 3 transactions.
    pub fn resource_bounds(mut self, resource_bounds: ResourceBoundsMapping) -> Self {
        self.resource_bounds = Some(resource_bounds);
        self
    }

    pub fn tip(mut self, tip: u64) -> Self {
        self.tip = tip;
        self
    }

    /// Builds a transaction for simulation only. The network will never execute it.
    pub fn query_only(mut self, query_only: bool) -> Self {
        self.query_only = query_only;
        self
    }

    pub fn build_deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_calldata: &[Felt],
        version: DeployVersion,
    ) -> Result<DeployTransaction, BuildError> {
        let expected = artifact.constructor_arity();
        if !expected.accepts(constructor_calldata.len()) {
            return Err(BuildError::CalldataArityMismatch { expected, actual: constructor_calldata.len() });
        }

        let class_hash = artifact.class_hash();
        let deploy_calldata = udc::deploy_contract_calldata(class_hash, self.salt, self.unique, constructor_calldata);
        let calldata =
            udc::execute_calldata(self.execution_encoding, UDC_ADDRESS, DEPLOY_CONTRACT_SELECTOR, &deploy_calldata);

        let invoke = match version {
            DeployVersion::V1 => InvokeTransaction::V1(InvokeTransactionV1 {
                sender_address: self.sender_address,
                calldata,
                max_fee: self.max_fee.unwrap_or(Felt::ZERO),
                nonce: self.nonce,
            }),
            DeployVersion::V3 => InvokeTransaction::V3(InvokeTransactionV3 {
                sender_address: self.sender_address,
                calldata,
                nonce: self.nonce,
                resource_bounds: self.resource_bounds.clone().ok_or(BuildError::MissingResourceBounds)?,
                tip: self.tip,
                paymaster_data: vec![],
                account_deployment_data: vec![],
                nonce_data_availability_mode: DataAvailabilityMode::L1,
                fee_data_availability_mode: DataAvailabilityMode::L1,
            }),
        };

        let transaction_hash = invoke.compute_hash(self.chain_id.to_felt(), self.query_only);
        let contract_address =
            udc::deployed_contract_address(self.sender_address, class_hash, self.salt, self.unique, constructor_calldata);

        tracing::debug!(
            tx_hash = %format!("{transaction_hash:#x}"),
            contract_address = %format!("{contract_address:#x}"),
            class_hash = %format!("{class_hash:#x}"),
            %version,
            nonce = %format!("{:#x}", self.nonce),
            "Built deploy transaction"
        );

        Ok(DeployTransaction {
            class_hash,
            constructor_calldata: constructor_calldata.to_vec(),
            salt: self.salt,
            unique: self.unique,
            chain_id: self.chain_id.clone(),
            query_only: self.query_only,
            invoke,
            contract_address,
            transaction_hash,
        })
    }
}
