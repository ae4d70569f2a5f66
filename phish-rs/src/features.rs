//! Diagnostic feature extraction
//!
//! Pure functions over the raw text. The output is reported back to the caller
//! and never fed into the statistical model.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{FeatureSet, InputKind, UrlFeatures};

/// Keywords commonly seen in credential-harvesting lures, in reporting order
pub const SUSPICIOUS_KEYWORDS: [&str; 9] = [
    "login", "verify", "update", "bank", "secure", "account", "confirm", "free", "lottery",
];

// Syntactic dotted quad; octets are not range-checked.
static IP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid IP pattern")
});

/// Whether the text contains something shaped like an IPv4 address
pub fn has_ip_pattern(text: &str) -> bool {
    IP_PATTERN.is_match(text)
}

/// Extract diagnostic features; total over all inputs, including the empty string
pub fn extract(text: &str, kind: InputKind) -> FeatureSet {
    let lowered = text.to_lowercase();
    let suspicious_keywords: Vec<String> = SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect();

    let url = match kind {
        InputKind::Url => Some(UrlFeatures {
            has_ip: has_ip_pattern(text),
            num_dots: text.matches('.').count(),
            has_https: text.starts_with("https"),
        }),
        InputKind::Email => None,
    };

    FeatureSet {
        length: text.chars().count(),
        keyword_count: suspicious_keywords.len(),
        suspicious_keywords,
        url,
    }
}
