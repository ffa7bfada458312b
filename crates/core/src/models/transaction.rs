use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Which ledger a transaction came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSide {
    /// A posted movement on a bank statement or export.
    Bank,
    /// An accounts-payable ledger entry.
    Ap,
}

impl TransactionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSide::Bank => "bank",
            TransactionSide::Ap => "ap",
        }
    }
}

/// Payment instrument classification, when the upstream normalizer knows it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Check,
    Ach,
    Wire,
    Card,
    #[default]
    Other,
}

/// A normalized transaction record.
///
/// Immutable once built. Sign convention is fixed per side so comparisons
/// never need subtraction: bank payments are negative (deposits positive),
/// AP paid amounts are positive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub side: TransactionSide,
    pub date: NaiveDate,
    /// Signed amount at minor-unit precision
    pub amount: Decimal,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_group_id: Option<String>,
    #[serde(default)]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Build a bank-side transaction.
    pub fn bank(id: &str, date: NaiveDate, amount: Decimal, description: &str) -> Self {
        Self {
            id: id.to_string(),
            side: TransactionSide::Bank,
            date,
            amount,
            description: description.to_string(),
            vendor_name: None,
            check_number: None,
            reference: None,
            batch_group_id: None,
            kind: TransactionKind::Other,
        }
    }

    /// Build an AP-side transaction.
    pub fn ap(id: &str, date: NaiveDate, amount: Decimal, vendor_name: &str) -> Self {
        Self {
            id: id.to_string(),
            side: TransactionSide::Ap,
            date,
            amount,
            description: String::new(),
            vendor_name: Some(vendor_name.to_string()),
            check_number: None,
            reference: None,
            batch_group_id: None,
            kind: TransactionKind::Other,
        }
    }

    pub fn with_vendor(mut self, vendor_name: &str) -> Self {
        self.vendor_name = Some(vendor_name.to_string());
        self
    }

    pub fn with_check_number(mut self, check_number: &str) -> Self {
        self.check_number = Some(check_number.to_string());
        self.kind = TransactionKind::Check;
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_batch_group(mut self, batch_group_id: &str) -> Self {
        self.batch_group_id = Some(batch_group_id.to_string());
        self
    }

    /// Check the normalized-record contract. Violations reject this single
    /// record at the pipeline boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.amount.is_zero() {
            return Err(ValidationError::ZeroAmount {
                id: self.id.clone(),
            });
        }
        // AP entries are paid amounts; a negative one is malformed input,
        // not a refund convention this core understands.
        if self.side == TransactionSide::Ap && self.amount < Decimal::ZERO {
            return Err(ValidationError::SignConvention {
                id: self.id.clone(),
                side: self.side.as_str(),
            });
        }
        Ok(())
    }

    /// Magnitude of the amount, used for all cross-side comparisons.
    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }

    /// True for records that participate in matching: outgoing bank
    /// payments and positive AP paid amounts. Bank deposits are exempt by
    /// policy.
    pub fn is_payment(&self) -> bool {
        match self.side {
            TransactionSide::Bank => self.amount < Decimal::ZERO,
            TransactionSide::Ap => self.amount > Decimal::ZERO,
        }
    }

    /// True when the record is (or references) a check.
    pub fn is_check(&self) -> bool {
        self.kind == TransactionKind::Check || self.check_number.is_some()
    }
}
