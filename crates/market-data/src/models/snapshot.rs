use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::SourceId;

/// VIX level above which the market is considered to be in a high
/// volatility regime.
pub const HIGH_VOLATILITY_VIX: f64 = 30.0;

/// Trading-session state at snapshot time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    Closed,
    PreMarket,
    AfterHours,
}

impl MarketStatus {
    /// Derive the session state from a wall-clock time.
    ///
    /// Weekend days are always Closed; weekdays split into pre-market
    /// (before 09:00), open (09:00-15:59) and after-hours.
    pub fn from_datetime(now: DateTime<Utc>) -> Self {
        match now.weekday() {
            Weekday::Sat | Weekday::Sun => MarketStatus::Closed,
            _ => match now.hour() {
                0..=8 => MarketStatus::PreMarket,
                9..=15 => MarketStatus::Open,
                _ => MarketStatus::AfterHours,
            },
        }
    }
}

/// Complete market data snapshot used for economic validation.
///
/// Every field is optional because each backing source can fail
/// independently; [`data_sources`](Self::data_sources) records which sources
/// actually answered. A snapshot with no sources is treated as "no data" by
/// callers, never as an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// When the snapshot was assembled
    pub as_of: DateTime<Utc>,

    /// S&P 500 index level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp500: Option<Decimal>,

    /// S&P 500 percent change versus previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp500_change_percent: Option<f64>,

    /// CBOE volatility index level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vix: Option<f64>,

    /// Federal funds effective rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fed_funds_rate: Option<f64>,

    /// 2-year treasury yield
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasury_2y: Option<f64>,

    /// 5-year treasury yield
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasury_5y: Option<f64>,

    /// 10-year treasury yield
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasury_10y: Option<f64>,

    /// 30-year treasury yield
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasury_30y: Option<f64>,

    /// 10y minus 2y yield spread
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yield_curve_spread: Option<f64>,

    /// True when the 10y-2y spread is negative
    pub yield_curve_inverted: bool,

    /// Trading-session state at snapshot time
    pub market_status: MarketStatus,

    /// Sources that actually answered, in query order
    pub data_sources: Vec<SourceId>,
}

impl MarketSnapshot {
    /// An empty snapshot at the given time, with no sources answered.
    pub fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            sp500: None,
            sp500_change_percent: None,
            vix: None,
            fed_funds_rate: None,
            treasury_2y: None,
            treasury_5y: None,
            treasury_10y: None,
            treasury_30y: None,
            yield_curve_spread: None,
            yield_curve_inverted: false,
            market_status: MarketStatus::from_datetime(as_of),
            data_sources: Vec::new(),
        }
    }

    /// True when no source contributed any data.
    pub fn is_empty(&self) -> bool {
        self.data_sources.is_empty()
    }

    /// True when the market is in a high volatility regime (VIX above 30).
    pub fn is_high_volatility(&self) -> bool {
        self.vix.is_some_and(|v| v > HIGH_VOLATILITY_VIX)
    }

    /// True when the S&P 500 is down versus the previous close.
    pub fn is_market_decline(&self) -> bool {
        self.sp500_change_percent.is_some_and(|p| p < 0.0)
    }
}
