//! Market data client configuration.

use std::env;
use std::time::Duration;

use crate::registry::DataPriority;

/// Default cache time-to-live: 15 minutes.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Default per-call timeout before falling through to the next source.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for the unified market data client.
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    /// API key for the premium source; `None` disables it.
    pub intrinio_api_key: Option<String>,

    /// API key for the economic indicator source; `None` disables it.
    pub fred_api_key: Option<String>,

    /// Which sources to consult, and in what order.
    pub priority: DataPriority,

    /// How long fetched results stay fresh.
    pub cache_ttl: Duration,

    /// Per-call timeout; an elapsed timeout routes to the next source.
    pub request_timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            intrinio_api_key: None,
            fred_api_key: None,
            priority: DataPriority::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl MarketDataConfig {
    /// Build a configuration from the conventional environment variables.
    ///
    /// Missing keys simply leave the corresponding source disabled; the
    /// fallback chain treats that as "next source".
    pub fn from_env() -> Self {
        Self {
            intrinio_api_key: env::var("INTRINIO_API_KEY").ok().filter(|k| !k.is_empty()),
            fred_api_key: env::var("FRED_API_KEY").ok().filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }
}
