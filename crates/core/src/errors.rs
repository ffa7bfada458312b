//! Core error types for the reconciliation pipeline.
//!
//! Record-level problems are represented by [`ValidationError`] and recorded
//! as exceptions on the run, never aborting it. Market data failures stay
//! inside the market-data crate; nothing here wraps them.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the reconciliation core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// A single input record violating the normalized-transaction contract.
///
/// One of these rejects exactly one record; the rest of the run proceeds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("transaction has an empty id")]
    EmptyId,

    #[error("transaction {id} has a zero amount")]
    ZeroAmount { id: String },

    #[error("{side} transaction {id} violates the amount sign convention")]
    SignConvention { id: String, side: &'static str },
}
