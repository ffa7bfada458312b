//! Classification of pipeline residue into the exception taxonomy.
//!
//! Classification order matters: duplicate payments are detected across the
//! whole AP residue before any missing_bank_record is raised, because a
//! duplicate implies one of the pair is not genuinely missing context. Each
//! transaction yields at most one exception; unmatched records below the
//! materiality threshold are exempt.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::ReconcileConfig;
use crate::matching::normalize_vendor;
use crate::models::{Exception, ExceptionKind, Match, Transaction};

/// Pass 5: turns unmatched residue and anomalous matches into exceptions.
pub struct ExceptionDetector {
    config: ReconcileConfig,
}

impl ExceptionDetector {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Classify residue and matched anomalies.
    pub fn detect(
        &self,
        matches: &[Match],
        bank: &[Transaction],
        ap: &[Transaction],
        unmatched_bank_ids: &[String],
        unmatched_ap_ids: &[String],
    ) -> Vec<Exception> {
        let mut exceptions = Vec::new();

        let bank_by_id: HashMap<&str, &Transaction> =
            bank.iter().map(|tx| (tx.id.as_str(), tx)).collect();
        let unmatched_ap_set: HashSet<&str> =
            unmatched_ap_ids.iter().map(|s| s.as_str()).collect();
        let residue_ap: Vec<&Transaction> = ap
            .iter()
            .filter(|tx| unmatched_ap_set.contains(tx.id.as_str()))
            .collect();

        // 1. Duplicate payments across the whole AP residue
        let duplicate_ids = self.detect_duplicates(&residue_ap, &mut exceptions);

        // 2. Missing bank records for what remains of the AP residue
        for tx in &residue_ap {
            if duplicate_ids.contains(tx.id.as_str()) {
                continue;
            }
            if self.below_materiality(tx.amount.abs()) {
                debug!("AP {} below materiality, exempt", tx.id);
                continue;
            }
            exceptions.push(Exception::new(
                ExceptionKind::MissingBankRecord,
                Some(tx.id.clone()),
                tx.amount,
                format!(
                    "No bank record found for AP payment: {} - ${:.2}",
                    tx.vendor_name.as_deref().unwrap_or("unknown vendor"),
                    tx.amount
                ),
            ));
        }

        // 3. Missing AP records for the bank residue
        for id in unmatched_bank_ids {
            let Some(tx) = bank_by_id.get(id.as_str()) else {
                continue;
            };
            if self.below_materiality(tx.abs_amount()) {
                debug!("bank {} below materiality, exempt", tx.id);
                continue;
            }
            exceptions.push(Exception::new(
                ExceptionKind::MissingApRecord,
                Some(tx.id.clone()),
                tx.abs_amount(),
                format!(
                    "No AP record found for bank transaction: {}",
                    tx.description
                ),
            ));
        }

        // 4 & 5. Anomalies on accepted matches, one exception per match,
        // mismatch taking precedence over staleness
        for m in matches {
            if self.is_amount_mismatch(m) {
                exceptions.push(Exception::new(
                    ExceptionKind::AmountMismatch,
                    Some(m.candidate.bank_transaction_id.clone()),
                    m.candidate.amount_delta,
                    format!(
                        "Matched amounts differ by ${:.2} (beyond tolerance)",
                        m.candidate.amount_delta
                    ),
                ));
            } else if let Some(days) = self.stale_check_days(m, &bank_by_id) {
                exceptions.push(Exception::new(
                    ExceptionKind::StaleCheck,
                    Some(m.candidate.bank_transaction_id.clone()),
                    m.candidate.bank_amount,
                    format!("Stale check cleared after {days} days"),
                ));
            }
        }

        exceptions
    }

    /// Same vendor, same amount, posted within the duplicate window.
    /// Returns every AP id involved in a duplicate pair.
    fn detect_duplicates<'a>(
        &self,
        residue_ap: &[&'a Transaction],
        exceptions: &mut Vec<Exception>,
    ) -> HashSet<&'a str> {
        let mut consumed: HashSet<&str> = HashSet::new();

        // Group by (normalized vendor, rounded amount); BTreeMap keeps the
        // scan order deterministic
        let mut groups: BTreeMap<(String, Decimal), Vec<&'a Transaction>> = BTreeMap::new();
        for &tx in residue_ap {
            let Some(vendor) = tx.vendor_name.as_deref() else {
                continue;
            };
            let key = (normalize_vendor(vendor), tx.amount.round_dp(2));
            groups.entry(key).or_default().push(tx);
        }

        for ((_, amount), mut group) in groups {
            if group.len() < 2 {
                continue;
            }
            group.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

            for window in group.windows(2) {
                let (first, second) = (window[0], window[1]);
                let days_apart = (second.date - first.date).num_days();
                if days_apart <= self.config.duplicate_window_days {
                    exceptions.push(Exception::new(
                        ExceptionKind::DuplicatePayment,
                        Some(second.id.clone()),
                        amount,
                        format!(
                            "Potential duplicate payment: {} ${:.2} on {} and {}",
                            second.vendor_name.as_deref().unwrap_or("unknown vendor"),
                            amount,
                            first.date,
                            second.date
                        ),
                    ));
                    consumed.insert(first.id.as_str());
                    consumed.insert(second.id.as_str());
                }
            }
        }

        consumed
    }

    fn below_materiality(&self, amount: Decimal) -> bool {
        !self.config.materiality_threshold.is_zero() && amount < self.config.materiality_threshold
    }

    /// Residual delta beyond tolerance on an accepted match.
    fn is_amount_mismatch(&self, m: &Match) -> bool {
        if m.candidate.bank_amount.is_zero() {
            return false;
        }
        let rel = (m.candidate.amount_delta / m.candidate.bank_amount)
            .to_f64()
            .unwrap_or(0.0);
        rel > self.config.amount_tolerance_percent
    }

    /// Days between AP issue and bank clearing for a matched check, when
    /// over the staleness threshold.
    fn stale_check_days(
        &self,
        m: &Match,
        bank_by_id: &HashMap<&str, &Transaction>,
    ) -> Option<i64> {
        let bank_tx = bank_by_id.get(m.candidate.bank_transaction_id.as_str())?;
        if !bank_tx.is_check() {
            return None;
        }
        let days = (m.candidate.bank_date - m.candidate.ap_date).num_days();
        (days > self.config.stale_check_days).then_some(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchCandidate, MatchType, Severity};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn detector() -> ExceptionDetector {
        ExceptionDetector::new(ReconcileConfig::default())
    }

    fn match_for(
        bank_id: &str,
        ap_id: &str,
        bank_amount: Decimal,
        delta: Decimal,
        bank_date: NaiveDate,
        ap_date: NaiveDate,
    ) -> Match {
        Match::from_candidate(MatchCandidate {
            bank_transaction_id: bank_id.to_string(),
            ap_transaction_ids: vec![ap_id.to_string()],
            match_type: MatchType::Fuzzy,
            raw_score: 0.9,
            match_reasons: vec![],
            bank_amount,
            bank_date,
            vendor_name: None,
            amount_delta: delta,
            ap_date,
        })
    }

    #[test]
    fn test_unmatched_bank_raises_missing_ap() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-250.00), "ACH VENDOR")];
        let exceptions =
            detector().detect(&[], &bank, &[], &["B-1".to_string()], &[]);

        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind, ExceptionKind::MissingApRecord);
        assert_eq!(exceptions[0].severity, Severity::Medium);
        assert_eq!(exceptions[0].transaction_id.as_deref(), Some("B-1"));
    }

    #[test]
    fn test_unmatched_ap_raises_missing_bank() {
        let ap = vec![Transaction::ap("AP-1", d(2024, 1, 10), dec!(900.00), "Acme")];
        let exceptions =
            detector().detect(&[], &[], &ap, &[], &["AP-1".to_string()]);

        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind, ExceptionKind::MissingBankRecord);
        assert_eq!(exceptions[0].severity, Severity::High);
    }

    #[test]
    fn test_duplicate_pair_preempts_missing_bank() {
        // Same vendor, same $750, three days apart
        let ap = vec![
            Transaction::ap("AP-1", d(2024, 1, 10), dec!(750.00), "Acme"),
            Transaction::ap("AP-2", d(2024, 1, 13), dec!(750.00), "Acme"),
        ];
        let exceptions = detector().detect(
            &[],
            &[],
            &ap,
            &[],
            &["AP-1".to_string(), "AP-2".to_string()],
        );

        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind, ExceptionKind::DuplicatePayment);
        assert_eq!(exceptions[0].severity, Severity::High);
        // Attached to the later (suspect) payment
        assert_eq!(exceptions[0].transaction_id.as_deref(), Some("AP-2"));
    }

    #[test]
    fn test_same_amount_far_apart_is_not_duplicate() {
        let ap = vec![
            Transaction::ap("AP-1", d(2024, 1, 1), dec!(750.00), "Acme"),
            Transaction::ap("AP-2", d(2024, 1, 20), dec!(750.00), "Acme"),
        ];
        let exceptions = detector().detect(
            &[],
            &[],
            &ap,
            &[],
            &["AP-1".to_string(), "AP-2".to_string()],
        );

        assert_eq!(exceptions.len(), 2);
        assert!(exceptions
            .iter()
            .all(|e| e.kind == ExceptionKind::MissingBankRecord));
    }

    #[test]
    fn test_amount_mismatch_on_accepted_match() {
        // Pass 2 accepted on other factors; 3% residual delta exceeds the
        // 1% tolerance
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1000.00), "x")];
        let matches = vec![match_for(
            "B-1",
            "AP-1",
            dec!(1000.00),
            dec!(30.00),
            d(2024, 1, 10),
            d(2024, 1, 10),
        )];

        let exceptions = detector().detect(&matches, &bank, &[], &[], &[]);
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind, ExceptionKind::AmountMismatch);
        assert_eq!(exceptions[0].amount, dec!(30.00));
    }

    #[test]
    fn test_within_tolerance_match_raises_nothing() {
        // A $1.50 delta on $998.50 is 0.15%, inside the 1% tolerance
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 15), dec!(-998.50), "x")];
        let matches = vec![match_for(
            "B-1",
            "AP-1",
            dec!(998.50),
            dec!(1.50),
            d(2024, 1, 15),
            d(2024, 1, 14),
        )];

        let exceptions = detector().detect(&matches, &bank, &[], &[], &[]);
        assert!(exceptions.is_empty());
    }

    #[test]
    fn test_stale_check_low_severity() {
        // Issued 2023-10-01, cleared 2024-01-10
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1200.00), "CHECK 88")
            .with_check_number("88")];
        let matches = vec![match_for(
            "B-1",
            "AP-1",
            dec!(1200.00),
            Decimal::ZERO,
            d(2024, 1, 10),
            d(2023, 10, 1),
        )];

        let exceptions = detector().detect(&matches, &bank, &[], &[], &[]);
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind, ExceptionKind::StaleCheck);
        assert_eq!(exceptions[0].severity, Severity::Low);
        assert!(exceptions[0].description.contains("101 days"));
    }

    #[test]
    fn test_recent_check_is_not_stale() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1200.00), "CHECK 88")
            .with_check_number("88")];
        let matches = vec![match_for(
            "B-1",
            "AP-1",
            dec!(1200.00),
            Decimal::ZERO,
            d(2024, 1, 10),
            d(2023, 12, 1),
        )];

        let exceptions = detector().detect(&matches, &bank, &[], &[], &[]);
        assert!(exceptions.is_empty());
    }

    #[test]
    fn test_non_check_is_never_stale() {
        let bank = vec![Transaction::bank("B-1", d(2024, 1, 10), dec!(-1200.00), "ACH OLD")];
        let matches = vec![match_for(
            "B-1",
            "AP-1",
            dec!(1200.00),
            Decimal::ZERO,
            d(2024, 1, 10),
            d(2023, 1, 1),
        )];

        let exceptions = detector().detect(&matches, &bank, &[], &[], &[]);
        assert!(exceptions.is_empty());
    }

    #[test]
    fn test_materiality_exemption() {
        let config = ReconcileConfig {
            materiality_threshold: dec!(50.00),
            ..ReconcileConfig::default()
        };
        let detector = ExceptionDetector::new(config);

        let bank = vec![
            Transaction::bank("B-SMALL", d(2024, 1, 10), dec!(-10.00), "small"),
            Transaction::bank("B-BIG", d(2024, 1, 10), dec!(-500.00), "big"),
        ];
        let exceptions = detector.detect(
            &[],
            &bank,
            &[],
            &["B-SMALL".to_string(), "B-BIG".to_string()],
            &[],
        );

        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].transaction_id.as_deref(), Some("B-BIG"));
    }
}
