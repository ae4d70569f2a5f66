//! Classification types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PhishError;

/// What kind of text is being classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Url,
    Email,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Url => "url",
            InputKind::Email => "email",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = PhishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(InputKind::Url),
            "email" => Ok(InputKind::Email),
            other => Err(PhishError::MalformedInput(format!(
                "type must be 'url' or 'email', got '{}'",
                other
            ))),
        }
    }
}

/// Class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Legitimate => "legitimate",
            Label::Phishing => "phishing",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = PhishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phishing" => Ok(Label::Phishing),
            "legitimate" => Ok(Label::Legitimate),
            other => Err(PhishError::LabelSchemaMismatch(format!(
                "unknown label '{}'",
                other
            ))),
        }
    }
}

/// A single classification call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
}

impl ClassificationRequest {
    pub fn new(text: impl Into<String>, kind: InputKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn url(text: impl Into<String>) -> Self {
        Self::new(text, InputKind::Url)
    }

    pub fn email(text: impl Into<String>) -> Self {
        Self::new(text, InputKind::Email)
    }
}

/// Diagnostic features derived from the raw text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Character count
    pub length: usize,
    /// Matched vocabulary entries, in vocabulary order
    pub suspicious_keywords: Vec<String>,
    pub keyword_count: usize,
    /// Present only for URLs
    #[serde(flatten)]
    pub url: Option<UrlFeatures>,
}

/// URL-only signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFeatures {
    pub has_ip: bool,
    pub num_dots: usize,
    pub has_https: bool,
}

/// Raw output of a trained classifier for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    pub predicted_label: String,
    /// Label names in the classifier's own order
    pub labels: Vec<String>,
    /// Aligned with `labels`
    pub probabilities: Vec<f64>,
}

/// Fused verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub is_phishing: bool,
    /// Phishing probability after heuristic overrides
    pub confidence: f64,
}

/// Final answer for a classification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_phishing: bool,
    pub confidence: f64,
    pub features: FeatureSet,
}

/// A labeled example for training
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}
