//! Quote source trait definitions.
//!
//! This module defines the core `QuoteProvider` trait that all quote
//! sources must implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CompanyInfo, StockQuote};

/// Trait for quote sources.
///
/// Implement this trait to add support for a new quote source. The unified
/// client consults the configured priority policy to decide which sources
/// are eligible for a request and in what order; a new source never requires
/// changes at the call sites.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this source.
    ///
    /// Should be a constant string like "INTRINIO" or "YAHOO".
    /// Used for logging and for the snapshot's data_sources list.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a ticker.
    ///
    /// # Returns
    ///
    /// The latest quote on success, or a `MarketDataError` on failure. The
    /// error's retry class decides whether the client falls through to the
    /// next source.
    async fn get_quote(&self, ticker: &str) -> Result<StockQuote, MarketDataError>;

    /// Fetch company fundamental information for a ticker.
    ///
    /// Default implementation reports the operation as unsupported so that
    /// quote-only sources don't have to stub it out.
    async fn get_company_info(&self, ticker: &str) -> Result<CompanyInfo, MarketDataError> {
        Err(MarketDataError::SourceError {
            provider: self.id().to_string(),
            message: format!("company info not supported for {ticker}"),
        })
    }
}
