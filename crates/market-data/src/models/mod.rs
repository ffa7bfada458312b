//! Data models for market data operations.

mod indicator;
mod quote;
mod snapshot;
mod types;
mod vendor;

pub use indicator::EconomicIndicator;
pub use quote::{CompanyInfo, StockQuote};
pub use snapshot::{MarketSnapshot, MarketStatus, HIGH_VOLATILITY_VIX};
pub use types::SourceId;
pub use vendor::VendorValidation;
