use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::SourceId;

/// A single economic data point (fed funds rate, CPI, unemployment, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EconomicIndicator {
    /// Human-readable series name ("Federal Funds Rate")
    pub name: String,

    /// Most recent observed value
    pub value: f64,

    /// Unit of the value ("%", "index")
    pub unit: String,

    /// Observation date of the value
    pub as_of_date: NaiveDate,

    /// Source that answered (usually "FRED")
    pub source: SourceId,
}
