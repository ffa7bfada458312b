use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate figures for one reconciliation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Valid bank records that entered the pipeline
    pub total_bank_transactions: usize,
    /// Valid AP records that entered the pipeline
    pub total_ap_transactions: usize,
    pub matched_count: usize,
    pub exception_count: usize,
    pub unmatched_bank_count: usize,
    pub unmatched_ap_count: usize,
    /// Matched bank payments over total bank payments, in [0, 1]
    pub match_rate: f64,
    /// Sum of absolute bank payment amounts
    pub total_bank_amount: Decimal,
    /// Sum of AP paid amounts
    pub total_ap_amount: Decimal,
    /// Sum of absolute bank amounts across all matches
    pub total_matched_amount: Decimal,
    pub unreconciled_amount: Decimal,
    /// False when the run was cancelled between passes
    pub complete: bool,
}
