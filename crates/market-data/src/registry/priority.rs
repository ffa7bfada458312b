//! Source priority policy.

use serde::{Deserialize, Serialize};

/// Policy deciding which quote sources are eligible for a request and in
/// what order. The primary source is the premium one (Intrinio), the
/// secondary is the free one (Yahoo).
///
/// Adding a source means extending the client's ordering, not touching call
/// sites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataPriority {
    /// Premium source first, free source as fallback.
    #[default]
    PrimaryFirst,
    /// Free source only.
    SecondaryOnly,
    /// Premium source only, no fallback.
    PrimaryOnly,
    /// Race both sources, first successful answer wins.
    FirstToRespond,
}
