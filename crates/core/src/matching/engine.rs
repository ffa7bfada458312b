//! Multi-pass matching engine.
//!
//! Transactions flow through ordered, mutually exclusive passes; a record
//! matched in an earlier pass is never reconsidered:
//!
//! 1. Exact: check number equality plus amount equality at minor-unit
//!    precision.
//! 2. Weighted fuzzy: every remaining bank/AP pair is scored on four
//!    weighted factors, then assigned globally greedy in descending score
//!    order, so a contested AP record goes to the best pairing and the
//!    loser falls back to its next-best candidate automatically.
//! 3. Batch: remaining bank transactions are tested against bounded
//!    combinations of the vendor's remaining AP records.
//!
//! Scoring in pass 2 fans out across a worker pool; the assignment step is
//! serialized and fully ordered, so results are deterministic regardless of
//! parallelism.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, info};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::cancel::CancelToken;
use crate::config::ReconcileConfig;
use crate::matching::batch::find_batch;
use crate::matching::score::score_pair;
use crate::models::{MatchCandidate, MatchType, Transaction};

/// Engine output: accepted pairings plus the residual unmatched sets.
///
/// Finding nothing for a transaction is not an error - the residue is the
/// expected input of the exception pass.
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    pub candidates: Vec<MatchCandidate>,
    /// Unmatched bank payment ids, in input order
    pub unmatched_bank_ids: Vec<String>,
    /// Unmatched AP payment ids, in input order
    pub unmatched_ap_ids: Vec<String>,
    /// False when the run was cancelled between passes
    pub complete: bool,
}

/// A scored bank/AP pair surviving the fuzzy threshold.
struct ScoredPair {
    bank_idx: usize,
    ap_idx: usize,
    score: f64,
    amount_delta: Decimal,
    ap_date: NaiveDate,
    reasons: Vec<String>,
}

/// Multi-pass transaction matcher.
pub struct MatchingEngine {
    config: ReconcileConfig,
}

impl MatchingEngine {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Run all passes to completion.
    pub fn run(&self, bank: &[Transaction], ap: &[Transaction]) -> MatchOutcome {
        self.run_with_cancel(bank, ap, &CancelToken::new())
    }

    /// Run the passes, honoring `cancel` at pass boundaries.
    pub fn run_with_cancel(
        &self,
        bank: &[Transaction],
        ap: &[Transaction],
        cancel: &CancelToken,
    ) -> MatchOutcome {
        let mut bank_matched = vec![false; bank.len()];
        let mut ap_matched = vec![false; ap.len()];
        let mut candidates = Vec::new();

        self.pass_exact(bank, ap, &mut bank_matched, &mut ap_matched, &mut candidates);
        debug!("exact pass produced {} matches", candidates.len());

        if cancel.is_cancelled() {
            info!("reconciliation cancelled after exact pass");
            return finish(bank, ap, &bank_matched, &ap_matched, candidates, false);
        }

        let before = candidates.len();
        self.pass_fuzzy(bank, ap, &mut bank_matched, &mut ap_matched, &mut candidates);
        debug!("fuzzy pass produced {} matches", candidates.len() - before);

        if cancel.is_cancelled() {
            info!("reconciliation cancelled after fuzzy pass");
            return finish(bank, ap, &bank_matched, &ap_matched, candidates, false);
        }

        let before = candidates.len();
        self.pass_batch(bank, ap, &mut bank_matched, &mut ap_matched, &mut candidates);
        debug!("batch pass produced {} matches", candidates.len() - before);

        finish(bank, ap, &bank_matched, &ap_matched, candidates, true)
    }

    /// Pass 1: check number plus amount, both exact.
    fn pass_exact(
        &self,
        bank: &[Transaction],
        ap: &[Transaction],
        bank_matched: &mut [bool],
        ap_matched: &mut [bool],
        candidates: &mut Vec<MatchCandidate>,
    ) {
        // Index open AP records by check number
        let mut ap_by_check: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, tx) in ap.iter().enumerate() {
            if !tx.is_payment() {
                continue;
            }
            if let Some(check) = tx.check_number.as_deref() {
                ap_by_check.entry(check).or_default().push(i);
            }
        }

        for (bi, bank_tx) in bank.iter().enumerate() {
            if bank_matched[bi] || !bank_tx.is_payment() {
                continue;
            }
            let Some(check) = bank_tx.check_number.as_deref() else {
                continue;
            };
            let Some(ap_indices) = ap_by_check.get(check) else {
                continue;
            };

            let bank_amount = bank_tx.abs_amount().round_dp(2);
            let hit = ap_indices
                .iter()
                .copied()
                .filter(|&ai| !ap_matched[ai] && ap[ai].amount.round_dp(2) == bank_amount)
                // Several AP rows can share a check number; earliest date
                // then smallest id wins, deterministically.
                .min_by(|&a, &b| ap[a].date.cmp(&ap[b].date).then_with(|| ap[a].id.cmp(&ap[b].id)));

            if let Some(ai) = hit {
                bank_matched[bi] = true;
                ap_matched[ai] = true;
                candidates.push(build_candidate(
                    bank_tx,
                    &[&ap[ai]],
                    MatchType::Exact,
                    1.0,
                    vec![
                        "Check number exact match".to_string(),
                        "Amount match".to_string(),
                    ],
                ));
            }
        }
    }

    /// Pass 2: weighted scoring plus global greedy assignment.
    fn pass_fuzzy(
        &self,
        bank: &[Transaction],
        ap: &[Transaction],
        bank_matched: &mut [bool],
        ap_matched: &mut [bool],
        candidates: &mut Vec<MatchCandidate>,
    ) {
        let open_bank: Vec<usize> = (0..bank.len())
            .filter(|&i| !bank_matched[i] && bank[i].is_payment())
            .collect();
        let open_ap: Vec<usize> = (0..ap.len())
            .filter(|&i| !ap_matched[i] && ap[i].is_payment())
            .collect();
        if open_bank.is_empty() || open_ap.is_empty() {
            return;
        }

        let threshold = self.config.fuzzy_threshold_fraction();

        // Score every open pair; independent per bank transaction, so fan
        // out across the pool. The merge below re-sorts, so worker order
        // does not matter.
        let mut scored: Vec<ScoredPair> = open_bank
            .par_iter()
            .map(|&bi| {
                let mut local = Vec::new();
                for &ai in &open_ap {
                    let pair = score_pair(&bank[bi], &ap[ai], &self.config);
                    if pair.score >= threshold {
                        local.push(ScoredPair {
                            bank_idx: bi,
                            ap_idx: ai,
                            score: pair.score,
                            amount_delta: pair.amount_delta,
                            ap_date: ap[ai].date,
                            reasons: pair.reasons,
                        });
                    }
                }
                local
            })
            .flatten()
            .collect();

        // Global greedy assignment: best score first, ties broken by
        // smallest amount difference, then earliest AP date, then ids.
        // Serialized on purpose - this is what makes runs deterministic.
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.amount_delta.cmp(&b.amount_delta))
                .then_with(|| a.ap_date.cmp(&b.ap_date))
                .then_with(|| bank[a.bank_idx].id.cmp(&bank[b.bank_idx].id))
                .then_with(|| ap[a.ap_idx].id.cmp(&ap[b.ap_idx].id))
        });

        for pair in scored {
            if bank_matched[pair.bank_idx] || ap_matched[pair.ap_idx] {
                continue;
            }
            bank_matched[pair.bank_idx] = true;
            ap_matched[pair.ap_idx] = true;
            candidates.push(build_candidate(
                &bank[pair.bank_idx],
                &[&ap[pair.ap_idx]],
                MatchType::Fuzzy,
                pair.score,
                pair.reasons,
            ));
        }
    }

    /// Pass 3: bounded batch detection over what is left.
    fn pass_batch(
        &self,
        bank: &[Transaction],
        ap: &[Transaction],
        bank_matched: &mut [bool],
        ap_matched: &mut [bool],
        candidates: &mut Vec<MatchCandidate>,
    ) {
        for (bi, bank_tx) in bank.iter().enumerate() {
            if bank_matched[bi] || !bank_tx.is_payment() {
                continue;
            }

            let available: Vec<bool> = (0..ap.len()).map(|i| !ap_matched[i]).collect();
            if let Some(hit) = find_batch(bank_tx, ap, &available, &self.config) {
                bank_matched[bi] = true;
                for &ai in &hit.ap_indices {
                    ap_matched[ai] = true;
                }
                let ap_refs: Vec<&Transaction> = hit.ap_indices.iter().map(|&i| &ap[i]).collect();
                candidates.push(build_candidate(
                    bank_tx,
                    &ap_refs,
                    MatchType::Batch,
                    hit.confidence,
                    hit.reasons,
                ));
            }
        }
    }
}

/// Assemble a candidate, deriving the tie-break and downstream metadata.
fn build_candidate(
    bank_tx: &Transaction,
    ap_txs: &[&Transaction],
    match_type: MatchType,
    raw_score: f64,
    match_reasons: Vec<String>,
) -> MatchCandidate {
    let bank_amount = bank_tx.abs_amount();
    let ap_total: Decimal = ap_txs.iter().map(|tx| tx.amount).sum();
    let ap_date = ap_txs
        .iter()
        .map(|tx| tx.date)
        .min()
        .unwrap_or(bank_tx.date);
    let vendor_name = bank_tx
        .vendor_name
        .clone()
        .or_else(|| ap_txs.iter().find_map(|tx| tx.vendor_name.clone()));

    MatchCandidate {
        bank_transaction_id: bank_tx.id.clone(),
        ap_transaction_ids: ap_txs.iter().map(|tx| tx.id.clone()).collect(),
        match_type,
        raw_score,
        match_reasons,
        bank_amount,
        bank_date: bank_tx.date,
        vendor_name,
        amount_delta: (bank_amount - ap_total).abs(),
        ap_date,
    }
}

fn finish(
    bank: &[Transaction],
    ap: &[Transaction],
    bank_matched: &[bool],
    ap_matched: &[bool],
    candidates: Vec<MatchCandidate>,
    complete: bool,
) -> MatchOutcome {
    let unmatched_bank_ids = bank
        .iter()
        .enumerate()
        .filter(|(i, tx)| !bank_matched[*i] && tx.is_payment())
        .map(|(_, tx)| tx.id.clone())
        .collect();
    let unmatched_ap_ids = ap
        .iter()
        .enumerate()
        .filter(|(i, tx)| !ap_matched[*i] && tx.is_payment())
        .map(|(_, tx)| tx.id.clone())
        .collect();

    MatchOutcome {
        candidates,
        unmatched_bank_ids,
        unmatched_ap_ids,
        complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn engine() -> MatchingEngine {
        MatchingEngine::new(ReconcileConfig::default())
    }

    #[test]
    fn test_exact_match_on_check_number_and_amount() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1500.00), "CHECK 1042")
            .with_check_number("1042")];
        let ap = vec![Transaction::ap("AP-1", d(2024, 1, 9), dec!(1500.00), "Acme")
            .with_check_number("1042")];

        let outcome = engine().run(&bank, &ap);
        assert_eq!(outcome.candidates.len(), 1);
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.match_type, MatchType::Exact);
        assert!((candidate.raw_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(candidate.ap_transaction_ids, vec!["AP-1"]);
        assert!(outcome.unmatched_bank_ids.is_empty());
        assert!(outcome.unmatched_ap_ids.is_empty());
    }

    #[test]
    fn test_exact_requires_amount_equality() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1500.00), "CHECK 1042")
            .with_check_number("1042")];
        let ap = vec![Transaction::ap("AP-1", d(2024, 1, 9), dec!(1450.00), "Acme")
            .with_check_number("1042")];

        let outcome = engine().run(&bank, &ap);
        assert!(outcome
            .candidates
            .iter()
            .all(|c| c.match_type != MatchType::Exact));
    }

    #[test]
    fn test_exact_tie_breaks_on_earliest_ap_date() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-100.00), "CHECK 7")
            .with_check_number("7")];
        let ap = vec![
            Transaction::ap("AP-LATE", d(2024, 1, 9), dec!(100.00), "Acme").with_check_number("7"),
            Transaction::ap("AP-EARLY", d(2024, 1, 5), dec!(100.00), "Acme").with_check_number("7"),
        ];

        let outcome = engine().run(&bank, &ap);
        assert_eq!(outcome.candidates[0].ap_transaction_ids, vec!["AP-EARLY"]);
    }

    #[test]
    fn test_fuzzy_match_abbreviated_vendor() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 15), dec!(-998.50), "AMAZON WEB SVCS")
            .with_vendor("Amazon Web Svcs")];
        let ap = vec![Transaction::ap(
            "AP-1",
            d(2024, 1, 14),
            dec!(1000.00),
            "Amazon Web Services",
        )];

        let outcome = engine().run(&bank, &ap);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].match_type, MatchType::Fuzzy);
        assert_eq!(outcome.candidates[0].amount_delta, dec!(1.50));
    }

    #[test]
    fn test_fuzzy_below_threshold_stays_unmatched() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 15), dec!(-998.50), "x")
            .with_vendor("Totally Different Vendor")];
        // Amount far off and vendor unrelated
        let ap = vec![Transaction::ap("AP-1", d(2024, 1, 14), dec!(4000.00), "Acme")];

        let outcome = engine().run(&bank, &ap);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.unmatched_bank_ids, vec!["B-1"]);
        assert_eq!(outcome.unmatched_ap_ids, vec!["AP-1"]);
    }

    #[test]
    fn test_global_assignment_resolves_conflict() {
        // Both bank transactions prefer AP-1; B-GOOD is the better pairing,
        // so B-OK must fall back to its next-best candidate AP-2.
        let bank = vec![
            Transaction::bank("B-OK", d(2024, 1, 12), dec!(-1000.00), "x").with_vendor("Acme"),
            Transaction::bank("B-GOOD", d(2024, 1, 10), dec!(-1000.00), "x").with_vendor("Acme"),
        ];
        let ap = vec![
            Transaction::ap("AP-1", d(2024, 1, 10), dec!(1000.00), "Acme"),
            Transaction::ap("AP-2", d(2024, 1, 16), dec!(1000.00), "Acme"),
        ];

        let outcome = engine().run(&bank, &ap);
        assert_eq!(outcome.candidates.len(), 2);

        let by_bank: std::collections::HashMap<&str, &MatchCandidate> = outcome
            .candidates
            .iter()
            .map(|c| (c.bank_transaction_id.as_str(), c))
            .collect();
        // B-GOOD posted same day as AP-1, so it wins the contested record
        assert_eq!(by_bank["B-GOOD"].ap_transaction_ids, vec!["AP-1"]);
        assert_eq!(by_bank["B-OK"].ap_transaction_ids, vec!["AP-2"]);
    }

    #[test]
    fn test_three_way_conflict_reassigns_losers() {
        // Three bank transactions all prefer AP-X (exact amount). Only the
        // best pairing takes it; the next lands on AP-Y, and the last has
        // no surviving candidate and falls through to the residue.
        let bank = vec![
            Transaction::bank("B-1", d(2024, 1, 10), dec!(-500.00), "x").with_vendor("Acme"),
            Transaction::bank("B-2", d(2024, 1, 11), dec!(-500.00), "x").with_vendor("Acme"),
            Transaction::bank("B-3", d(2024, 1, 12), dec!(-500.00), "x").with_vendor("Acme"),
        ];
        let ap = vec![
            Transaction::ap("AP-X", d(2024, 1, 10), dec!(500.00), "Acme"),
            Transaction::ap("AP-Y", d(2024, 1, 10), dec!(495.00), "Acme"),
            Transaction::ap("AP-Z", d(2024, 1, 10), dec!(490.00), "Acme"),
        ];

        let outcome = engine().run(&bank, &ap);
        assert_eq!(outcome.candidates.len(), 2);

        let by_bank: std::collections::HashMap<&str, &MatchCandidate> = outcome
            .candidates
            .iter()
            .map(|c| (c.bank_transaction_id.as_str(), c))
            .collect();
        assert_eq!(by_bank["B-1"].ap_transaction_ids, vec!["AP-X"]);
        assert_eq!(by_bank["B-2"].ap_transaction_ids, vec!["AP-Y"]);
        // B-3's only remaining candidate scores below the threshold
        assert_eq!(outcome.unmatched_bank_ids, vec!["B-3"]);
        assert_eq!(outcome.unmatched_ap_ids, vec!["AP-Z"]);
    }

    #[test]
    fn test_batch_pass_picks_up_residue() {
        let bank = vec![Transaction::bank("B-1", d(2024, 2, 3), dec!(-1000.00), "ACH ACME")
            .with_vendor("Acme")];
        let ap = vec![
            Transaction::ap("AP-1", d(2024, 2, 1), dec!(500.00), "Acme"),
            Transaction::ap("AP-2", d(2024, 2, 2), dec!(300.00), "Acme"),
            Transaction::ap("AP-3", d(2024, 2, 3), dec!(200.00), "Acme"),
        ];

        let outcome = engine().run(&bank, &ap);
        assert_eq!(outcome.candidates.len(), 1);
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.match_type, MatchType::Batch);
        let mut ids = candidate.ap_transaction_ids.clone();
        ids.sort();
        assert_eq!(ids, vec!["AP-1", "AP-2", "AP-3"]);
    }

    #[test]
    fn test_mutual_exclusivity_across_passes() {
        let bank = vec![
            Transaction::bank("B-1", d(2024, 1, 10), dec!(-100.00), "CHECK 1")
                .with_check_number("1"),
            Transaction::bank("B-2", d(2024, 1, 10), dec!(-100.00), "x").with_vendor("Acme"),
        ];
        let ap = vec![
            Transaction::ap("AP-1", d(2024, 1, 10), dec!(100.00), "Acme").with_check_number("1"),
            Transaction::ap("AP-2", d(2024, 1, 10), dec!(100.00), "Acme"),
        ];

        let outcome = engine().run(&bank, &ap);
        let mut seen = std::collections::HashSet::new();
        for candidate in &outcome.candidates {
            assert!(seen.insert(candidate.bank_transaction_id.clone()));
            for id in &candidate.ap_transaction_ids {
                assert!(seen.insert(id.clone()), "transaction {id} matched twice");
            }
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let bank: Vec<Transaction> = (0..20)
            .map(|i| {
                Transaction::bank(
                    &format!("B-{i}"),
                    d(2024, 1, 1 + (i % 20) as u32),
                    Decimal::from(-100 - i),
                    "x",
                )
                .with_vendor("Acme Corp")
            })
            .collect();
        let ap: Vec<Transaction> = (0..20)
            .map(|i| {
                Transaction::ap(
                    &format!("AP-{i}"),
                    d(2024, 1, 1 + ((i + 1) % 20) as u32),
                    Decimal::from(100 + i),
                    "Acme Corporation",
                )
            })
            .collect();

        let first = engine().run(&bank, &ap);
        let second = engine().run(&bank, &ap);
        assert_eq!(first.candidates, second.candidates);
        assert_eq!(first.unmatched_bank_ids, second.unmatched_bank_ids);
        assert_eq!(first.unmatched_ap_ids, second.unmatched_ap_ids);
    }

    #[test]
    fn test_cancel_before_fuzzy_returns_partial() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1500.00), "CHECK 1042")
            .with_check_number("1042")];
        let ap = vec![Transaction::ap("AP-1", d(2024, 1, 9), dec!(1500.00), "Acme")
            .with_check_number("1042")];

        let outcome = engine().run_with_cancel(&bank, &ap, &cancel);
        // The exact pass still ran; the run is just tagged incomplete.
        assert_eq!(outcome.candidates.len(), 1);
        assert!(!outcome.complete);
    }

    #[test]
    fn test_deposits_are_exempt() {
        let bank = vec![Transaction::bank("B-DEP", d(2024, 1, 10), dec!(500.00), "DEPOSIT")];
        let ap: Vec<Transaction> = Vec::new();

        let outcome = engine().run(&bank, &ap);
        assert!(outcome.candidates.is_empty());
        assert!(outcome.unmatched_bank_ids.is_empty());
    }
}
