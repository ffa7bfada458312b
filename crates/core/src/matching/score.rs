//! Weighted pair scoring for the fuzzy matching pass.
//!
//! Four factors contribute to a candidate score: amount closeness, date
//! proximity, vendor name similarity, and reference similarity. Weights
//! come from [`ReconcileConfig`] and sum to 1.0.
//!
//! The factor curves are deliberately gentle inside their tolerance bands -
//! a pairing one day and a few cents off is still a near-certain match -
//! and drop steeply beyond them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::ReconcileConfig;
use crate::matching::vendor::vendor_similarity;
use crate::models::Transaction;

/// A scored bank/AP pairing.
#[derive(Clone, Debug)]
pub(crate) struct PairScore {
    /// Weighted total in [0, 1]
    pub score: f64,
    /// Ordered contributing factors, for match_reasons
    pub reasons: Vec<String>,
    /// Absolute amount difference
    pub amount_delta: Decimal,
}

/// Score one bank transaction against one AP transaction.
pub(crate) fn score_pair(
    bank: &Transaction,
    ap: &Transaction,
    config: &ReconcileConfig,
) -> PairScore {
    let mut reasons = Vec::new();
    let bank_amount = bank.abs_amount();
    let ap_amount = ap.amount;

    // Amount closeness (heaviest factor)
    let amount_delta = (bank_amount - ap_amount).abs();
    let pct_diff = if bank_amount.is_zero() {
        1.0
    } else {
        (amount_delta / bank_amount).to_f64().unwrap_or(1.0)
    };
    let amount_score = if pct_diff == 0.0 {
        reasons.push("Exact amount match".to_string());
        1.0
    } else if pct_diff <= config.amount_tolerance_percent {
        reasons.push(format!("Amount within tolerance (${amount_delta:.2} diff)"));
        1.0 - (pct_diff / config.amount_tolerance_percent) * 0.1
    } else if pct_diff <= 0.05 {
        reasons.push(format!("Amount close (${amount_delta:.2} diff)"));
        0.7
    } else {
        // Keeps the factor monotonically non-increasing past the 5% band
        (1.0 - pct_diff).max(0.0) * 0.5
    };

    // Date proximity
    let date_diff = (bank.date - ap.date).num_days().abs();
    let date_score = if date_diff == 0 {
        reasons.push("Same date".to_string());
        1.0
    } else if date_diff <= config.date_tolerance_days {
        reasons.push(format!("Date within {date_diff} days"));
        1.0 - (date_diff as f64 / config.date_tolerance_days as f64) * 0.3
    } else if date_diff <= 14 {
        0.5
    } else {
        0.2
    };

    // Vendor name similarity; neutral when either side lacks a name
    let vendor_score = match (&bank.vendor_name, &ap.vendor_name) {
        (Some(bank_vendor), Some(ap_vendor)) => {
            let similarity = vendor_similarity(bank_vendor, ap_vendor);
            if similarity >= 0.9 {
                reasons.push("Strong vendor name match".to_string());
            } else if similarity >= 0.7 {
                reasons.push("Similar vendor name".to_string());
            }
            similarity
        }
        _ => 0.5,
    };

    // Reference similarity; neutral when either side lacks a reference
    let reference_score = match (&bank.reference, &ap.reference) {
        (Some(bank_ref), Some(ap_ref)) => {
            if bank_ref == ap_ref {
                reasons.push("Reference number match".to_string());
                1.0
            } else if bank_ref.contains(ap_ref.as_str()) || ap_ref.contains(bank_ref.as_str()) {
                reasons.push("Partial reference match".to_string());
                0.8
            } else {
                0.0
            }
        }
        _ => 0.5,
    };

    let score = amount_score * config.weight_amount
        + date_score * config.weight_date
        + vendor_score * config.weight_vendor
        + reference_score * config.weight_reference;

    PairScore {
        score,
        reasons,
        amount_delta,
    }
}
