use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::SourceId;

/// A point-in-time stock quote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockQuote {
    /// Ticker symbol the quote is for
    pub ticker: String,

    /// Last traded / closing price
    pub price: Decimal,

    /// Absolute change versus the previous close
    pub change: Decimal,

    /// Percent change versus the previous close
    pub change_percent: f64,

    /// Trading volume (optional, not all sources report it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,

    /// When the quote was fetched
    pub timestamp: DateTime<Utc>,

    /// Source that answered ("INTRINIO", "YAHOO")
    pub source: SourceId,
}

impl StockQuote {
    /// Create a quote with the minimal required fields.
    pub fn new(ticker: &str, price: Decimal, source: SourceId) -> Self {
        Self {
            ticker: ticker.to_string(),
            price,
            change: Decimal::ZERO,
            change_percent: 0.0,
            volume: None,
            timestamp: Utc::now(),
            source,
        }
    }
}

/// Company fundamental information.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Ticker symbol
    pub ticker: String,

    /// Legal or display name
    pub name: String,

    /// Sector classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Industry classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Whether the listing is still active
    pub is_active: bool,

    /// Exchange the security trades on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    /// Source that answered
    pub source: SourceId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;

    #[test]
    fn test_quote_new() {
        let quote = StockQuote::new("AAPL", dec!(150.25), Cow::Borrowed("YAHOO"));
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.change, Decimal::ZERO);
        assert!(quote.volume.is_none());
    }
}
