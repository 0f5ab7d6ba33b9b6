use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Error body returned by the gateway alongside a non-success http status.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StarknetError {
    pub code: StarknetErrorCode,
    pub message: String,
}

impl StarknetError {
    pub fn new(code: StarknetErrorCode, message: String) -> Self {
        Self { code, message }
    }

    pub fn rate_limited() -> Self {
        Self { code: StarknetErrorCode::RateLimited, message: "Too many requests".to_string() }
    }
}

macro_rules! starknet_error_codes {
    ($($variant:ident => $code:literal,)*) => {
        /// Error codes the sequencer answers with. Codes this client does not know about are kept
        /// verbatim in [`StarknetErrorCode::Unknown`].
        #[derive(Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
        pub enum StarknetErrorCode {
            $($variant,)*
            Unknown(String),
        }

        impl StarknetErrorCode {
            pub fn as_str(&self) -> &str {
                match self {
                    $(StarknetErrorCode::$variant => $code,)*
                    StarknetErrorCode::Unknown(code) => code,
                }
            }
        }

        impl FromStr for StarknetErrorCode {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($code => StarknetErrorCode::$variant,)*
                    other => StarknetErrorCode::Unknown(other.to_string()),
                })
            }
        }
    };
}

starknet_error_codes! {
    EntryPointNotFound => "StarknetErrorCode.ENTRY_POINT_NOT_FOUND_IN_CONTRACT",
    OutOfRangeContractAddress => "StarknetErrorCode.OUT_OF_RANGE_CONTRACT_ADDRESS",
    SchemaValidationError => "StarkErrorCode.SCHEMA_VALIDATION_ERROR",
    TransactionFailed => "StarknetErrorCode.TRANSACTION_FAILED",
    UninitializedContract => "StarknetErrorCode.UNINITIALIZED_CONTRACT",
    OutOfRangeTransactionHash => "StarknetErrorCode.OUT_OF_RANGE_TRANSACTION_HASH",
    MalformedRequest => "StarkErrorCode.MALFORMED_REQUEST",
    UndeclaredClass => "StarknetErrorCode.UNDECLARED_CLASS",
    TransactionLimitExceeded => "StarknetErrorCode.TRANSACTION_LIMIT_EXCEEDED",
    InvalidTransactionNonce => "StarknetErrorCode.INVALID_TRANSACTION_NONCE",
    OutOfRangeFee => "StarknetErrorCode.OUT_OF_RANGE_FEE",
    InvalidTransactionVersion => "StarknetErrorCode.INVALID_TRANSACTION_VERSION",
    DeprecatedTransaction => "StarknetErrorCode.DEPRECATED_TRANSACTION",
    UnauthorizedEntryPointForInvoke => "StarknetErrorCode.UNAUTHORIZED_ENTRY_POINT_FOR_INVOKE",
    InvalidSignature => "StarknetErrorCode.INVALID_SIGNATURE",
    InsufficientAccountBalance => "StarknetErrorCode.INSUFFICIENT_ACCOUNT_BALANCE",
    InsufficientMaxFee => "StarknetErrorCode.INSUFFICIENT_MAX_FEE",
    InsufficientResourcesForValidate => "StarknetErrorCode.INSUFFICIENT_RESOURCES_FOR_VALIDATE",
    ValidateFailure => "StarknetErrorCode.VALIDATE_FAILURE",
    DuplicatedTransaction => "StarknetErrorCode.DUPLICATED_TRANSACTION",
    RateLimited => "StarknetErrorCode.RATE_LIMITED",
}

impl StarknetErrorCode {
    /// Retrying the exact same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StarknetErrorCode::RateLimited | StarknetErrorCode::TransactionLimitExceeded)
    }
}

impl fmt::Display for StarknetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
