use std::error::Error;

use http::StatusCode;
use mp_gateway::error::{StarknetError, StarknetErrorCode};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request may succeed if sent again.
    #[error("Transient transport failure: {0}")]
    Transient(String),
    /// No response was received in time. The request may or may not have reached the sequencer.
    #[error("Request timed out")]
    Timeout,
    #[error("Gateway rejected the transaction with {code}: {reason}")]
    GatewayRejected { code: StarknetErrorCode, reason: String },
    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Transient(_) | TransportError::Timeout)
    }

    /// Maps an error raised by the http service stack (connector, timeout layer).
    pub(crate) fn from_service_error(error: Box<dyn Error + Send + Sync>) -> Self {
        if error.is::<tower::timeout::error::Elapsed>() {
            return TransportError::Timeout;
        }
        TransportError::Transient(error_chain(error.as_ref()))
    }

    /// Maps a non-success http response.
    pub(crate) fn from_http_failure(http_status: StatusCode, body: &[u8]) -> Self {
        if http_status == StatusCode::TOO_MANY_REQUESTS {
            return StarknetError::rate_limited().into();
        }
        match serde_json::from_slice::<StarknetError>(body) {
            Ok(starknet_error) => starknet_error.into(),
            Err(_)
                if matches!(
                    http_status,
                    StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
                ) =>
            {
                TransportError::Transient(format!("http status {http_status}"))
            }
            Err(serde_error) => TransportError::UnexpectedResponse(format!(
                "http status {http_status} with an unparsable error body: {serde_error}"
            )),
        }
    }
}

impl From<StarknetError> for TransportError {
    fn from(error: StarknetError) -> Self {
        if error.code.is_transient() {
            TransportError::Transient(error.to_string())
        } else {
            TransportError::GatewayRejected { code: error.code, reason: error.message }
        }
    }
}

fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
