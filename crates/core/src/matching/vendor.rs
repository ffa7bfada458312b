//! Vendor name normalization and similarity scoring.
//!
//! Bank feeds and AP ledgers rarely agree on how a payee is spelled
//! ("Amazon Web Svcs" vs "Amazon Web Services, Inc."). Names are reduced to
//! a canonical form and compared with a blend of token overlap and
//! Jaro-Winkler similarity.

use std::collections::BTreeSet;

use strsim::jaro_winkler;

/// Corporate suffixes stripped from the end of a name, repeatedly.
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

/// Canonical form for comparison: uppercase, punctuation replaced by
/// spaces, whitespace collapsed, trailing corporate suffixes removed.
pub fn normalize_vendor(name: &str) -> String {
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

/// Similarity of two vendor names in [0, 1].
///
/// Blend of three signals: shared-token overlap (word order independent),
/// Jaro-Winkler over sorted tokens, and Jaro-Winkler over the raw
/// normalized strings. Weighted toward token overlap, which copes best with
/// abbreviated feed descriptions.
pub fn vendor_similarity(a: &str, b: &str) -> f64 {
    let n1 = normalize_vendor(a);
    let n2 = normalize_vendor(b);

    if n1.is_empty() || n2.is_empty() {
        return 0.0;
    }
    if n1 == n2 {
        return 1.0;
    }

    let t1: BTreeSet<&str> = n1.split_whitespace().collect();
    let t2: BTreeSet<&str> = n2.split_whitespace().collect();
    let common = t1.intersection(&t2).count();
    let overlap = common as f64 / t1.len().min(t2.len()).max(1) as f64;

    let sorted1 = t1.iter().copied().collect::<Vec<_>>().join(" ");
    let sorted2 = t2.iter().copied().collect::<Vec<_>>().join(" ");
    let sorted_jw = jaro_winkler(&sorted1, &sorted2);
    let raw_jw = jaro_winkler(&n1, &n2);

    (0.5 * overlap + 0.3 * sorted_jw + 0.2 * raw_jw).clamp(0.0, 1.0)
}
