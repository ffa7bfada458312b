use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a pairing was established.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Check/reference number and amount matched exactly.
    Exact,
    /// Accepted by weighted similarity scoring.
    Fuzzy,
    /// One bank transaction against multiple AP records summing to it.
    Batch,
}

/// Informational tags raised by economic validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicFlag {
    /// VIX above the high-volatility threshold at validation time.
    HighVolatility,
    /// Large payment posted while the S&P 500 was declining.
    MarketDecline,
    /// Payment above the wire-authorization threshold.
    RequiresWireAuthorization,
    /// Bank posting date fell on a weekend. Policy signal, not a penalty.
    WeekendPosting,
    /// 10y-2y treasury spread was negative.
    YieldCurveInverted,
}

/// A pairing produced by the matching engine, before economic validation.
///
/// Owned by the engine; consumed read-only downstream. Carries the bank
/// amount/date and vendor so later passes never have to re-resolve
/// transactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub bank_transaction_id: String,
    /// One entry for exact/fuzzy matches, several for batch matches
    pub ap_transaction_ids: Vec<String>,
    pub match_type: MatchType,
    /// Engine score in [0, 1]; 1.0 for exact matches
    pub raw_score: f64,
    /// Ordered list of contributing factors
    pub match_reasons: Vec<String>,
    /// Absolute bank amount
    pub bank_amount: Decimal,
    /// Bank posting date
    pub bank_date: NaiveDate,
    /// Vendor the pairing is attributed to, when either side names one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    /// Absolute difference between bank amount and summed AP amounts
    pub amount_delta: Decimal,
    /// Earliest AP posting date in the pairing
    pub ap_date: NaiveDate,
}

/// A finalized match: candidate plus economically-adjusted confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(flatten)]
    pub candidate: MatchCandidate,
    /// Confidence in [0, 1] after economic adjustment
    pub confidence: f64,
    /// Warning tags attached by economic validation
    pub economic_flags: BTreeSet<EconomicFlag>,
}

impl Match {
    /// Promote an engine candidate; confidence starts at the raw score.
    pub fn from_candidate(candidate: MatchCandidate) -> Self {
        let confidence = candidate.raw_score;
        Self {
            candidate,
            confidence,
            economic_flags: BTreeSet::new(),
        }
    }

    pub fn bank_transaction_id(&self) -> &str {
        &self.candidate.bank_transaction_id
    }

    /// Every transaction id referenced by this match, bank first.
    pub fn transaction_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.candidate.bank_transaction_id.as_str())
            .chain(self.candidate.ap_transaction_ids.iter().map(|s| s.as_str()))
    }
}
