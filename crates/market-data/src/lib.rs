//! Ledgermatch Market Data Crate
//!
//! Source-agnostic market and economic data for reconciliation context.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple quote sources: a premium source (Intrinio) and a free source
//!   (Yahoo Finance), behind one trait
//! - An economic indicator source (FRED) for rates, yields and inflation
//! - Configurable source priority with automatic fallback
//! - Time-boxed caching with single-flight deduplication
//! - Vendor name to ticker resolution for payee validation
//!
//! # Architecture
//!
//! ```text
//! +--------------------+
//! |  MarketDataClient  |  (priority policy, fallback, cache)
//! +--------------------+
//!      |          |
//!      v          v
//! +---------+ +----------+     +----------------------+
//! | Intrinio| |  Yahoo   |     | VendorTickerResolver |
//! +---------+ +----------+     +----------------------+
//!      |          |
//!      v          v
//! +--------------------+      +------+
//! |   StockQuote /     |      | FRED |  (EconomicIndicator)
//! |   CompanyInfo      |      +------+
//! +--------------------+
//! ```
//!
//! Failures never cross the client boundary: a source that errors or times
//! out is logged and the next eligible source is consulted; when every
//! source fails the caller gets an empty result, which downstream code
//! treats as a valid "no data" state.
//!
//! # Core Types
//!
//! - [`MarketDataClient`] - The unified query surface
//! - [`MarketSnapshot`] - Assembled market/economic context
//! - [`StockQuote`] / [`CompanyInfo`] - Per-ticker data
//! - [`EconomicIndicator`] - One economic series observation
//! - [`VendorValidation`] - Vendor name resolution + liveness result
//! - [`DataPriority`] - Source selection policy

pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;

// Re-export all public types from models
pub use models::{
    CompanyInfo, EconomicIndicator, MarketSnapshot, MarketStatus, SourceId, StockQuote,
    VendorValidation, HIGH_VOLATILITY_VIX,
};

// Re-export configuration
pub use config::{MarketDataConfig, DEFAULT_CACHE_TTL, DEFAULT_REQUEST_TIMEOUT};

// Re-export provider types
pub use provider::{FredProvider, IntrinioProvider, QuoteProvider, YahooProvider};

// Re-export registry types
pub use registry::{DataPriority, MarketDataClient, SingleFlightCache};

// Re-export resolver
pub use resolver::VendorTickerResolver;
