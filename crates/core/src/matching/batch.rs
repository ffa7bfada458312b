//! Batch payment detection (one bank transaction covering several AP
//! records).
//!
//! Search space is bounded on purpose: AP candidates are restricted to the
//! bank transaction's vendor within the date tolerance window, the
//! subset-sum pool is capped, and combination size is capped. Exceeding a
//! cap is not an error - the transaction simply falls through to the
//! exception pass.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::ReconcileConfig;
use crate::matching::vendor::normalize_vendor;
use crate::models::Transaction;

/// A successful batch pairing, as AP pool indices.
#[derive(Clone, Debug)]
pub(crate) struct BatchHit {
    pub ap_indices: Vec<usize>,
    pub ap_total: Decimal,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// Relative difference between a bank amount and an AP sum, as a fraction
/// of the configured tolerance (0 = exact, 1 = at the edge).
fn tolerance_ratio(bank_amount: Decimal, total: Decimal, tolerance: f64) -> Option<f64> {
    if bank_amount.is_zero() {
        return None;
    }
    let rel = ((bank_amount - total).abs() / bank_amount)
        .to_f64()
        .unwrap_or(f64::MAX);
    if rel <= tolerance {
        Some(rel / tolerance)
    } else {
        None
    }
}

/// Try to cover `bank` with a combination of still-available AP records.
///
/// Two bounded strategies, in order: all of the vendor's AP on one date
/// within the window, then subset-sum over the vendor's AP across the
/// window.
pub(crate) fn find_batch(
    bank: &Transaction,
    ap: &[Transaction],
    available: &[bool],
    config: &ReconcileConfig,
) -> Option<BatchHit> {
    let vendor = bank.vendor_name.as_deref()?;
    let normalized = normalize_vendor(vendor);
    if normalized.is_empty() {
        return None;
    }

    let bank_amount = bank.abs_amount();
    let tolerance = config.amount_tolerance_percent;

    // Vendor's open AP records inside the date window
    let candidates: Vec<usize> = ap
        .iter()
        .enumerate()
        .filter(|(i, tx)| {
            available[*i]
                && tx.is_payment()
                && (tx.date - bank.date).num_days().abs() <= config.date_tolerance_days
                && tx
                    .vendor_name
                    .as_deref()
                    .is_some_and(|v| normalize_vendor(v) == normalized)
        })
        .map(|(i, _)| i)
        .collect();

    if candidates.len() < 2 {
        return None;
    }

    // Strategy 1: everything the vendor was paid on a single date
    for offset in -config.date_tolerance_days..=config.date_tolerance_days {
        let date = bank.date + chrono::Duration::days(offset);
        let group: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| ap[i].date == date)
            .collect();
        if group.len() < 2 {
            continue;
        }

        let total: Decimal = group.iter().map(|&i| ap[i].amount).sum();
        if let Some(ratio) = tolerance_ratio(bank_amount, total, tolerance) {
            return Some(BatchHit {
                reasons: vec![
                    "Batch payment detected".to_string(),
                    format!("Sum of {} AP payments matches bank amount", group.len()),
                    "Same vendor".to_string(),
                ],
                ap_indices: group,
                ap_total: total,
                confidence: 0.85 - 0.05 * ratio,
            });
        }
    }

    // Strategy 2: bounded subset-sum across the window
    let mut pool = candidates;
    pool.retain(|&i| {
        // A single AP record larger than the bank amount (plus slack) can
        // never be part of a covering subset.
        ap[i].amount <= bank_amount * (Decimal::ONE + Decimal::new(1, 2))
    });
    pool.sort_by(|&a, &b| {
        ap[b].amount
            .cmp(&ap[a].amount)
            .then_with(|| ap[a].date.cmp(&ap[b].date))
            .then_with(|| ap[a].id.cmp(&ap[b].id))
    });
    pool.truncate(config.max_batch_pool);

    let max_size = config.max_batch_items.min(pool.len());
    for size in 2..=max_size {
        let mut combo = Vec::with_capacity(size);
        if let Some(hit) = search_combinations(
            &pool,
            ap,
            bank_amount,
            tolerance,
            size,
            0,
            Decimal::ZERO,
            &mut combo,
        ) {
            return Some(hit);
        }
    }

    None
}

/// Depth-first combination search in lexicographic pool order; first
/// in-tolerance subset wins, keeping results deterministic.
#[allow(clippy::too_many_arguments)]
fn search_combinations(
    pool: &[usize],
    ap: &[Transaction],
    bank_amount: Decimal,
    tolerance: f64,
    size: usize,
    start: usize,
    sum: Decimal,
    combo: &mut Vec<usize>,
) -> Option<BatchHit> {
    if combo.len() == size {
        let ratio = tolerance_ratio(bank_amount, sum, tolerance)?;
        return Some(BatchHit {
            reasons: vec![
                "Batch payment detected via subset sum".to_string(),
                format!("Sum of {} AP payments matches bank amount", combo.len()),
            ],
            ap_indices: combo.clone(),
            ap_total: sum,
            confidence: 0.80 - 0.05 * ratio,
        });
    }

    for pos in start..pool.len() {
        let idx = pool[pos];
        let next_sum = sum + ap[idx].amount;
        // Pool is sorted by amount descending: once the running sum
        // overshoots past tolerance, smaller tails may still fit, so no
        // pruning on overshoot - only the caps bound the search.
        combo.push(idx);
        if let Some(hit) = search_combinations(
            pool,
            ap,
            bank_amount,
            tolerance,
            size,
            pos + 1,
            next_sum,
            combo,
        ) {
            return Some(hit);
        }
        combo.pop();
    }

    None
}
