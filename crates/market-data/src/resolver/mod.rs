//! Vendor name to ticker resolution.
//!
//! Free-text vendor names from bank feeds and AP ledgers ("Amazon Web Svcs
//! Inc.") are normalized and looked up against a static ticker table. The
//! result feeds the vendor liveness check in the unified client.

mod ticker_map;

use ticker_map::VENDOR_TICKERS;

/// Corporate suffixes stripped from the end of a vendor name, repeatedly,
/// so "Acme Holdings Co LLC" reduces to "ACME HOLDINGS".
const CORPORATE_SUFFIXES: &[&str] = &[
    "INC",
    "LLC",
    "LTD",
    "CORP",
    "CORPORATION",
    "COMPANY",
    "CO",
    "LP",
    "LLP",
    "PC",
    "PLLC",
    "NA",
    "FSB",
    "INTL",
];

/// Keys shorter than this are only matched exactly; containment matching on
/// very short keys ("GE", "HP") produces junk hits.
const MIN_PARTIAL_KEY_LEN: usize = 4;

/// Resolves free-text vendor names to stock tickers.
pub struct VendorTickerResolver;

impl VendorTickerResolver {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a vendor name for lookup: uppercase, punctuation stripped,
    /// whitespace collapsed, trailing corporate suffixes removed.
    pub fn normalize(name: &str) -> String {
        let upper = name.to_uppercase();
        let cleaned: String = upper
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        while let Some(last) = tokens.last() {
            if tokens.len() > 1 && CORPORATE_SUFFIXES.contains(last) {
                tokens.pop();
            } else {
                break;
            }
        }

        tokens.join(" ")
    }

    /// Look up a ticker for a vendor name.
    ///
    /// Returns `None` both for unknown vendors and for vendors known to be
    /// privately held; either way there is no ticker to validate against.
    pub fn lookup(&self, vendor_name: &str) -> Option<&'static str> {
        let normalized = Self::normalize(vendor_name);
        if normalized.is_empty() {
            return None;
        }

        // Exact match first
        if let Some(&(_, ticker)) = VENDOR_TICKERS.iter().find(|&&(key, _)| key == normalized) {
            return ticker;
        }

        // Bounded containment, in table order for determinism
        VENDOR_TICKERS
            .iter()
            .find(|&&(key, _)| {
                key.len() >= MIN_PARTIAL_KEY_LEN
                    && (normalized.contains(key) || key.contains(normalized.as_str()))
            })
            .and_then(|&(_, ticker)| ticker)
    }
}

impl Default for VendorTickerResolver {
    fn default() -> Self {
        Self::new()
    }
}
