//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining fallback behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines whether the
/// fallback client should move on to the next source.
///
/// None of these errors ever reach the reconciliation pipeline: the unified
/// client logs them as degraded-mode signals and returns an empty result.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the source.
    /// This is a terminal error - another source won't know it either.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The source answered but the payload carried no usable data.
    #[error("Empty response from {provider}")]
    EmptyResponse {
        /// The source that returned the empty payload
        provider: String,
    },

    /// The request to the source timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The source that timed out
        provider: String,
    },

    /// The source rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The source that rate limited the request
        provider: String,
    },

    /// A source-specific error occurred.
    #[error("Source error: {provider} - {message}")]
    SourceError {
        /// The source that returned the error
        provider: String,
        /// The error message from the source
        message: String,
    },

    /// The source requires an API key that was not configured.
    #[error("Missing API key for {provider}")]
    MissingApiKey {
        /// The source lacking credentials
        provider: String,
    },

    /// All eligible sources were tried and all failed.
    #[error("All sources failed")]
    AllSourcesFailed,

    /// A network error occurred while communicating with a source.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Never`]: the error is terminal, stop here
    /// - [`RetryClass::NextSource`]: try the next source in the chain
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Terminal - no other source can answer
            Self::SymbolNotFound(_) | Self::AllSourcesFailed => RetryClass::Never,

            // Source-specific failures - fall through to the next source
            Self::EmptyResponse { .. }
            | Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::SourceError { .. }
            | Self::MissingApiKey { .. }
            | Self::Network(_) => RetryClass::NextSource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_never_retries() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_all_sources_failed_never_retries() {
        assert_eq!(
            MarketDataError::AllSourcesFailed.retry_class(),
            RetryClass::Never
        );
    }

    #[test]
    fn test_timeout_tries_next_source() {
        let error = MarketDataError::Timeout {
            provider: "INTRINIO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextSource);
    }

    #[test]
    fn test_rate_limited_tries_next_source() {
        let error = MarketDataError::RateLimited {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextSource);
    }

    #[test]
    fn test_missing_api_key_tries_next_source() {
        let error = MarketDataError::MissingApiKey {
            provider: "INTRINIO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextSource);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::SourceError {
            provider: "FRED".to_string(),
            message: "API key invalid".to_string(),
        };
        assert_eq!(format!("{}", error), "Source error: FRED - API key invalid");
    }
}
