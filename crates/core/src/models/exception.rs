use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How urgently a finding needs human review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Fixed taxonomy of reconciliation findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Bank payment with no AP counterpart
    MissingApRecord,
    /// AP payment with no bank counterpart
    MissingBankRecord,
    /// Two AP payments to the same vendor for the same amount, days apart
    DuplicatePayment,
    /// Matched pair whose amounts differ beyond tolerance
    AmountMismatch,
    /// Check that cleared long after its issue date
    StaleCheck,
    /// Input record rejected at the pipeline boundary
    InvalidRecord,
}

impl ExceptionKind {
    pub fn severity(&self) -> Severity {
        match self {
            ExceptionKind::MissingApRecord => Severity::Medium,
            ExceptionKind::MissingBankRecord => Severity::High,
            ExceptionKind::DuplicatePayment => Severity::High,
            ExceptionKind::AmountMismatch => Severity::Medium,
            ExceptionKind::StaleCheck => Severity::Low,
            ExceptionKind::InvalidRecord => Severity::Medium,
        }
    }

    pub fn suggested_action(&self) -> &'static str {
        match self {
            ExceptionKind::MissingApRecord => {
                "Check for unrecorded AP entry or misclassification"
            }
            ExceptionKind::MissingBankRecord => {
                "Verify payment was sent - may be timing difference"
            }
            ExceptionKind::DuplicatePayment => {
                "Verify if duplicate - request refund if confirmed"
            }
            ExceptionKind::AmountMismatch => {
                "Review source documents and adjust if necessary"
            }
            ExceptionKind::StaleCheck => "Consider voiding and reissuing if needed",
            ExceptionKind::InvalidRecord => "Correct the source record and re-run",
        }
    }
}

/// A classified finding requiring human review.
///
/// Produced exactly once per qualifying condition and never mutated by the
/// core afterwards; resolution workflow lives outside this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exception {
    pub kind: ExceptionKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub description: String,
    pub suggested_action: String,
}

impl Exception {
    pub fn new(
        kind: ExceptionKind,
        transaction_id: Option<String>,
        amount: Decimal,
        description: String,
    ) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            transaction_id,
            amount,
            description,
            suggested_action: kind.suggested_action().to_string(),
        }
    }
}
