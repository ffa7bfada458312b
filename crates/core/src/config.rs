//! Reconciliation pipeline configuration.

use ledgermatch_market_data::DataPriority;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Tunables for a reconciliation run.
///
/// The four factor weights must sum to 1.0; [`validate`](Self::validate)
/// enforces that and the other range constraints before a run starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Minimum weighted score, on a 0-100 scale, for a fuzzy pairing
    pub fuzzy_match_threshold: u8,

    /// Maximum date distance, in days, considered for fuzzy and batch passes
    pub date_tolerance_days: i64,

    /// Relative amount difference treated as equal (0.01 = 1%)
    pub amount_tolerance_percent: f64,

    /// Factor weight: amount closeness
    pub weight_amount: f64,
    /// Factor weight: date proximity
    pub weight_date: f64,
    /// Factor weight: vendor name similarity
    pub weight_vendor: f64,
    /// Factor weight: reference similarity
    pub weight_reference: f64,

    /// Maximum AP records combined into one batch match
    pub max_batch_items: usize,

    /// Maximum AP candidates considered per batch subset-sum search
    pub max_batch_pool: usize,

    /// Days after issue before a cleared check is stale
    pub stale_check_days: i64,

    /// Window, in days, for flagging duplicate AP payments
    pub duplicate_window_days: i64,

    /// Unmatched transactions below this magnitude raise no exception;
    /// zero disables the exemption
    pub materiality_threshold: Decimal,

    /// Whether to run the economic validation pass at all
    pub enable_economic_validation: bool,

    /// Source selection policy handed to the market data client
    pub market_data_priority: DataPriority,

    /// Market data cache time-to-live, in minutes
    pub cache_ttl_minutes: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fuzzy_match_threshold: 85,
            date_tolerance_days: 5,
            amount_tolerance_percent: 0.01,
            weight_amount: 0.40,
            weight_date: 0.25,
            weight_vendor: 0.25,
            weight_reference: 0.10,
            max_batch_items: 5,
            max_batch_pool: 20,
            stale_check_days: 90,
            duplicate_window_days: 7,
            materiality_threshold: Decimal::ZERO,
            enable_economic_validation: true,
            market_data_priority: DataPriority::default(),
            cache_ttl_minutes: 15,
        }
    }
}

impl ReconcileConfig {
    /// Check range constraints. Called once when a reconciler is built.
    pub fn validate(&self) -> Result<()> {
        if self.fuzzy_match_threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "fuzzy_match_threshold must be 0-100, got {}",
                self.fuzzy_match_threshold
            )));
        }
        if self.date_tolerance_days < 0 {
            return Err(Error::InvalidConfig(
                "date_tolerance_days must be non-negative".to_string(),
            ));
        }
        if self.amount_tolerance_percent <= 0.0 || self.amount_tolerance_percent >= 1.0 {
            return Err(Error::InvalidConfig(format!(
                "amount_tolerance_percent must be in (0, 1), got {}",
                self.amount_tolerance_percent
            )));
        }
        let weight_sum =
            self.weight_amount + self.weight_date + self.weight_vendor + self.weight_reference;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidConfig(format!(
                "factor weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if self.max_batch_items < 2 {
            return Err(Error::InvalidConfig(
                "max_batch_items must be at least 2".to_string(),
            ));
        }
        if self.materiality_threshold < Decimal::ZERO {
            return Err(Error::InvalidConfig(
                "materiality_threshold must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Fuzzy threshold on the engine's 0-1 score scale.
    pub fn fuzzy_threshold_fraction(&self) -> f64 {
        f64::from(self.fuzzy_match_threshold) / 100.0
    }
}
