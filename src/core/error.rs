//! Error types raised by the valuation and statistics core.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SandboxError {
    /// Malformed or out-of-domain parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A price series could not be retrieved for a ticker.
    #[error("Data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },
}

impl SandboxError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SandboxError::InvalidInput(message.into())
    }

    pub fn data_unavailable(ticker: &str, reason: impl ToString) -> Self {
        SandboxError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SandboxError::invalid_input("maturity must be at least 1").to_string(),
            "Invalid input: maturity must be at least 1"
        );
        assert_eq!(
            SandboxError::data_unavailable("MSFT", "HTTP error: 404 Not Found").to_string(),
            "Data unavailable for MSFT: HTTP error: 404 Not Found"
        );
    }
}
