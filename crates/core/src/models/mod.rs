//! Domain records for the reconciliation pipeline.

mod exception;
mod matching;
mod summary;
mod transaction;

pub use exception::{Exception, ExceptionKind, Severity};
pub use matching::{EconomicFlag, Match, MatchCandidate, MatchType};
pub use summary::ReconciliationSummary;
pub use transaction::{Transaction, TransactionKind, TransactionSide};
