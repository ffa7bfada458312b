//! Confidence adjustment and risk flagging from market context.
//!
//! Validation is additive: with no snapshot (or an empty one) every match
//! passes through untouched, so a market data outage degrades precision,
//! never correctness. Vendor validations are prefetched by the orchestrator
//! and passed in, keeping this pass synchronous and deterministic.

use std::collections::HashMap;

use chrono::Datelike;
use ledgermatch_market_data::{MarketSnapshot, VendorValidation};
use log::debug;
use rust_decimal::Decimal;

use crate::matching::normalize_vendor;
use crate::models::{EconomicFlag, Match};

/// Confidence boost for a vendor that resolved to an active ticker.
pub const VENDOR_BOOST_ACTIVE: f64 = 0.02;

/// Confidence boost when the active ticker also carries a live price.
pub const VENDOR_BOOST_PRICED: f64 = 0.03;

/// Above this absolute amount, a declining market attaches trend context.
pub const LARGE_PAYMENT_REVIEW_THRESHOLD: u32 = 100_000;

/// Above this absolute amount, wire authorization is required.
pub const WIRE_AUTHORIZATION_THRESHOLD: u32 = 500_000;

/// Pass 4: per-match confidence adjustment and informational flags.
pub struct EconomicValidator;

impl EconomicValidator {
    pub fn new() -> Self {
        Self
    }

    /// Adjust `matches` against the snapshot.
    ///
    /// `vendors` is keyed by normalized vendor name. Returns the input
    /// unchanged when the snapshot is absent or empty.
    pub fn validate(
        &self,
        matches: Vec<Match>,
        snapshot: Option<&MarketSnapshot>,
        vendors: &HashMap<String, VendorValidation>,
    ) -> Vec<Match> {
        let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
            return matches;
        };

        matches
            .into_iter()
            .map(|m| self.validate_match(m, snapshot, vendors))
            .collect()
    }

    fn validate_match(
        &self,
        mut m: Match,
        snapshot: &MarketSnapshot,
        vendors: &HashMap<String, VendorValidation>,
    ) -> Match {
        // Vendor verification boost, capped so stacked boosts never push
        // confidence past 1.0
        if let Some(vendor_name) = &m.candidate.vendor_name {
            if let Some(validation) = vendors.get(&normalize_vendor(vendor_name)) {
                if validation.is_public && validation.is_active {
                    let boost = if validation.price.is_some() {
                        VENDOR_BOOST_PRICED
                    } else {
                        VENDOR_BOOST_ACTIVE
                    };
                    debug!(
                        "vendor '{}' verified ({}), confidence +{}",
                        vendor_name,
                        validation.ticker.as_deref().unwrap_or("?"),
                        boost
                    );
                    m.confidence = (m.confidence + boost).min(1.0);
                }
            }
        }

        // Market condition flags - informational, never blocking
        if snapshot.is_high_volatility() {
            m.economic_flags.insert(EconomicFlag::HighVolatility);
        }
        if snapshot.yield_curve_inverted {
            m.economic_flags.insert(EconomicFlag::YieldCurveInverted);
        }
        if is_weekend(&m) {
            m.economic_flags.insert(EconomicFlag::WeekendPosting);
        }

        // Large payment validation
        let amount = m.candidate.bank_amount;
        if amount > Decimal::from(LARGE_PAYMENT_REVIEW_THRESHOLD) && snapshot.is_market_decline() {
            m.economic_flags.insert(EconomicFlag::MarketDecline);
        }
        if amount > Decimal::from(WIRE_AUTHORIZATION_THRESHOLD) {
            m.economic_flags
                .insert(EconomicFlag::RequiresWireAuthorization);
        }

        m.confidence = m.confidence.clamp(0.0, 1.0);
        m
    }
}

impl Default for EconomicValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_weekend(m: &Match) -> bool {
    matches!(
        m.candidate.bank_date.weekday(),
        chrono::Weekday::Sat | chrono::Weekday::Sun
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchCandidate, MatchType};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_match(confidence: f64, amount: Decimal, date: NaiveDate) -> Match {
        let candidate = MatchCandidate {
            bank_transaction_id: "B-1".to_string(),
            ap_transaction_ids: vec!["AP-1".to_string()],
            match_type: MatchType::Fuzzy,
            raw_score: confidence,
            match_reasons: vec![],
            bank_amount: amount,
            bank_date: date,
            vendor_name: Some("Microsoft Corp".to_string()),
            amount_delta: Decimal::ZERO,
            ap_date: date,
        };
        Match::from_candidate(candidate)
    }

    fn snapshot() -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::empty(Utc::now());
        snapshot
            .data_sources
            .push(std::borrow::Cow::Borrowed("YAHOO"));
        snapshot
    }

    fn verified_vendor(priced: bool) -> HashMap<String, VendorValidation> {
        let mut vendors = HashMap::new();
        vendors.insert(
            "MICROSOFT".to_string(),
            VendorValidation {
                vendor_name: "Microsoft Corp".to_string(),
                is_public: true,
                ticker: Some("MSFT".to_string()),
                is_active: true,
                price: priced.then(|| dec!(400.10)),
            },
        );
        vendors
    }

    #[test]
    fn test_no_snapshot_is_a_no_op() {
        let validator = EconomicValidator::new();
        let input = vec![sample_match(0.90, dec!(1000), d(2024, 1, 10))];
        let output = validator.validate(input.clone(), None, &verified_vendor(true));
        assert_eq!(input, output);
    }

    #[test]
    fn test_empty_snapshot_is_a_no_op() {
        let validator = EconomicValidator::new();
        let empty = MarketSnapshot::empty(Utc::now());
        let input = vec![sample_match(0.90, dec!(1000), d(2024, 1, 10))];
        let output = validator.validate(input.clone(), Some(&empty), &verified_vendor(true));
        assert_eq!(input, output);
    }

    #[test]
    fn test_priced_vendor_boost() {
        let validator = EconomicValidator::new();
        let output = validator.validate(
            vec![sample_match(0.90, dec!(1000), d(2024, 1, 10))],
            Some(&snapshot()),
            &verified_vendor(true),
        );
        assert!((output[0].confidence - 0.93).abs() < 1e-9);
    }

    #[test]
    fn test_active_unpriced_vendor_boost() {
        let validator = EconomicValidator::new();
        let mut vendors = verified_vendor(false);
        vendors.get_mut("MICROSOFT").unwrap().price = None;
        let output = validator.validate(
            vec![sample_match(0.90, dec!(1000), d(2024, 1, 10))],
            Some(&snapshot()),
            &vendors,
        );
        assert!((output[0].confidence - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_boost_never_exceeds_one() {
        let validator = EconomicValidator::new();
        let output = validator.validate(
            vec![sample_match(0.99, dec!(1000), d(2024, 1, 10))],
            Some(&snapshot()),
            &verified_vendor(true),
        );
        assert!(output[0].confidence <= 1.0);
        assert!((output[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_volatility_flag() {
        let validator = EconomicValidator::new();
        let mut snap = snapshot();
        snap.vix = Some(35.0);
        let output = validator.validate(
            vec![sample_match(0.90, dec!(1000), d(2024, 1, 10))],
            Some(&snap),
            &HashMap::new(),
        );
        assert!(output[0].economic_flags.contains(&EconomicFlag::HighVolatility));
    }

    #[test]
    fn test_yield_curve_flag() {
        let validator = EconomicValidator::new();
        let mut snap = snapshot();
        snap.yield_curve_spread = Some(-0.25);
        snap.yield_curve_inverted = true;
        let output = validator.validate(
            vec![sample_match(0.90, dec!(1000), d(2024, 1, 10))],
            Some(&snap),
            &HashMap::new(),
        );
        assert!(output[0]
            .economic_flags
            .contains(&EconomicFlag::YieldCurveInverted));
    }

    #[test]
    fn test_weekend_posting_flag_without_penalty() {
        let validator = EconomicValidator::new();
        // 2024-01-13 is a Saturday
        let output = validator.validate(
            vec![sample_match(0.90, dec!(1000), d(2024, 1, 13))],
            Some(&snapshot()),
            &HashMap::new(),
        );
        assert!(output[0].economic_flags.contains(&EconomicFlag::WeekendPosting));
        assert!((output[0].confidence - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_large_payment_in_decline_flagged() {
        let validator = EconomicValidator::new();
        let mut snap = snapshot();
        snap.sp500 = Some(dec!(4300));
        snap.sp500_change_percent = Some(-1.8);
        let output = validator.validate(
            vec![sample_match(0.90, dec!(150000), d(2024, 1, 10))],
            Some(&snap),
            &HashMap::new(),
        );
        assert!(output[0].economic_flags.contains(&EconomicFlag::MarketDecline));
        assert!(!output[0]
            .economic_flags
            .contains(&EconomicFlag::RequiresWireAuthorization));
    }

    #[test]
    fn test_wire_authorization_threshold() {
        let validator = EconomicValidator::new();
        let output = validator.validate(
            vec![sample_match(0.90, dec!(600000), d(2024, 1, 10))],
            Some(&snapshot()),
            &HashMap::new(),
        );
        assert!(output[0]
            .economic_flags
            .contains(&EconomicFlag::RequiresWireAuthorization));
    }
}
