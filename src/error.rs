//! Error types for the twocaptcha library.

use thiserror::Error;

/// Main error type for the twocaptcha library.
#[derive(Error, Debug)]
pub enum TwoCaptchaError {
    /// Request rejected locally before anything was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Service answered with something other than the expected format
    #[error("{0}")]
    Api(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Network(#[from] rquest::Error),

    /// Transport failure not originating from rquest
    #[error("Network error: {0}")]
    NetworkMessage(String),

    /// Poll loop ran out of time
    #[error("Timeout {0} seconds reached")]
    Timeout(u64),

    /// Poll loop stopped by the caller
    #[error("Waiting for result was cancelled")]
    Cancelled,

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TwoCaptchaError {
    /// Build an [`TwoCaptchaError::Api`] embedding the raw service response.
    pub fn unrecognised(response: &str) -> Self {
        TwoCaptchaError::Api(format!("Cannot recognise api response ({})", response))
    }

    /// Transport-level failures, the only kind the poll loop tolerates.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            TwoCaptchaError::Network(_) | TwoCaptchaError::NetworkMessage(_)
        )
    }
}

/// Result type alias for twocaptcha operations.
pub type Result<T> = std::result::Result<T, TwoCaptchaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_mentions_seconds() {
        let err = TwoCaptchaError::Timeout(30);
        assert_eq!(err.to_string(), "Timeout 30 seconds reached");
    }

    #[test]
    fn test_unrecognised_keeps_raw_text() {
        let err = TwoCaptchaError::unrecognised("ERROR_WRONG_USER_KEY");
        assert!(err.to_string().contains("ERROR_WRONG_USER_KEY"));
        assert!(!err.is_network());
    }

    #[test]
    fn test_network_classification() {
        assert!(TwoCaptchaError::NetworkMessage("reset".into()).is_network());
        assert!(!TwoCaptchaError::Validation("File required".into()).is_network());
    }
}
