use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of checking a vendor name against public market data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VendorValidation {
    /// Vendor name as supplied by the caller
    pub vendor_name: String,

    /// Whether the vendor resolved to a publicly traded ticker
    pub is_public: bool,

    /// Resolved ticker, when public
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    /// Whether the resolved ticker answered a live quote
    pub is_active: bool,

    /// Last quoted price, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl VendorValidation {
    /// A validation for a vendor that did not resolve to a public ticker.
    pub fn not_public(vendor_name: &str) -> Self {
        Self {
            vendor_name: vendor_name.to_string(),
            is_public: false,
            ticker: None,
            is_active: false,
            price: None,
        }
    }
}
