//! Ledgermatch Core - Bank/AP reconciliation pipeline.
//!
//! Matches bank transactions against accounts-payable records, scores the
//! pairings, adjusts confidence with market context, and classifies the
//! residue into actionable exceptions.
//!
//! # Pipeline
//!
//! ```text
//! bank + AP transactions
//!        |
//!        v
//! +------------------+   passes 1-3: exact, weighted fuzzy, batch
//! |  MatchingEngine  |
//! +------------------+
//!        |
//!        v
//! +--------------------+  pass 4: confidence boost + risk flags
//! | EconomicValidator  |  (MarketSnapshot optional - absence is a
//! +--------------------+   valid degraded state, never an error)
//!        |
//!        v
//! +--------------------+  pass 5: typed, severity-ranked findings
//! | ExceptionDetector  |
//! +--------------------+
//!        |
//!        v
//! {matches, exceptions, summary}
//! ```
//!
//! The [`Reconciler`] sequences the passes; each component is usable on its
//! own. Runs are deterministic: identical inputs produce identical matches
//! and exceptions, tie-breaks included.
//!
//! This crate deliberately contains no I/O: file parsing, ledger API
//! clients, persistence and rendering are external collaborators that feed
//! it normalized [`Transaction`] collections.

pub mod cancel;
pub mod config;
pub mod errors;
pub mod exceptions;
pub mod matching;
pub mod models;
pub mod reconciler;
pub mod validation;

// Re-export the pipeline surface
pub use cancel::CancelToken;
pub use config::ReconcileConfig;
pub use errors::{Error, Result, ValidationError};
pub use exceptions::ExceptionDetector;
pub use matching::{MatchOutcome, MatchingEngine};
pub use models::{
    EconomicFlag, Exception, ExceptionKind, Match, MatchCandidate, MatchType,
    ReconciliationSummary, Severity, Transaction, TransactionKind, TransactionSide,
};
pub use reconciler::{ReconciliationResult, Reconciler};
pub use validation::EconomicValidator;
