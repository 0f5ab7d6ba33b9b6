use std::fmt;
use std::sync::Arc;

use mockall::automock;
use mp_chain_config::ChainId;
use mp_transactions::{DeployTransaction, ExecutionEncoding, SignedDeployTransaction};
use starknet_types_core::felt::Felt;

mod key;

pub use key::{sign, verify, SigningKey};
pub use mp_transactions::Signature;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Invalid private key: it must be a non-zero scalar below the Stark curve order")]
    InvalidKey,
    #[error("Message hash {0:#x} is out of the signable range")]
    InvalidMessageHash(Felt),
}

/// Produces signatures on behalf of an account.
#[automock]
pub trait Signer: Send + Sync {
    fn public_key(&self) -> Felt;
    fn sign_hash(&self, hash: &Felt) -> Result<Signature, SignerError>;
}

/// Signs with a private key held in memory.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    key: SigningKey,
    public_key: Felt,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let public_key = key.public_key();
        Self { key, public_key }
    }
}

impl Signer for LocalSigner {
    fn public_key(&self) -> Felt {
        self.public_key
    }

    fn sign_hash(&self, hash: &Felt) -> Result<Signature, SignerError> {
        sign(hash, &self.key)
    }
}

/// An account contract already deployed on chain, and the key material controlling it.
#[derive(Clone)]
pub struct Account {
    address: Felt,
    signer: Arc<dyn Signer>,
    chain_id: ChainId,
    execution_encoding: ExecutionEncoding,
}

impl Account {
    pub fn new(address: Felt, signer: impl Signer + 'static, chain_id: ChainId) -> Self {
        Self { address, signer: Arc::new(signer), chain_id, execution_encoding: ExecutionEncoding::New }
    }

    /// Cairo 0 accounts decode their `__execute__` calldata differently.
    pub fn with_execution_encoding(mut self, execution_encoding: ExecutionEncoding) -> Self {
        self.execution_encoding = execution_encoding;
        self
    }

    pub fn address(&self) -> Felt {
        self.address
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn execution_encoding(&self) -> ExecutionEncoding {
        self.execution_encoding
    }

    pub fn public_key(&self) -> Felt {
        self.signer.public_key()
    }

    pub fn sign_transaction(&self, transaction: DeployTransaction) -> Result<SignedDeployTransaction, SignerError> {
        let signature = self.signer.sign_hash(&transaction.transaction_hash())?;
        tracing::debug!(
            tx_hash = %format!("{:#x}", transaction.transaction_hash()),
            account = %format!("{:#x}", self.address),
            "Signed transaction"
        );
        Ok(transaction.with_signature(signature))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &format_args!("{:#x}", self.address))
            .field("chain_id", &self.chain_id)
            .field("execution_encoding", &self.execution_encoding)
            .finish_non_exhaustive()
    }
}
