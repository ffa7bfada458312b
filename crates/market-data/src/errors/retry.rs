//! Retry classification for market data errors.

/// Classification of how the fallback client should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Terminal error - trying another source won't help.
    Never,
    /// Source-specific failure - try the next source in the chain.
    NextSource,
}
