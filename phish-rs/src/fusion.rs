//! Decision fusion
//!
//! Turns a classifier's probabilities into a verdict. The phishing probability is
//! located by label name, never by position, and deterministic heuristics may
//! raise it (never lower it) before the threshold is applied.

use crate::config::DecisionConfig;
use crate::error::{PhishError, Result};
use crate::features::has_ip_pattern;
use crate::types::{ClassifierOutput, Decision, InputKind, Label};

/// Threshold and override levels used when fusing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionPolicy {
    /// Confidence must be strictly greater than this to be phishing
    pub threshold: f64,
    /// Confidence floor for URLs addressed by a raw IP
    pub ip_confidence_floor: f64,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            ip_confidence_floor: 0.85,
        }
    }
}

impl From<&DecisionConfig> for FusionPolicy {
    fn from(config: &DecisionConfig) -> Self {
        Self {
            threshold: config.threshold,
            ip_confidence_floor: config.ip_confidence_floor,
        }
    }
}

/// Index of the phishing probability within a classifier's label ordering.
///
/// The label set must be exactly {phishing, legitimate}, in any order.
pub fn resolve_class_index<S: AsRef<str>>(labels: &[S]) -> Result<usize> {
    if labels.len() != 2 {
        return Err(PhishError::LabelSchemaMismatch(format!(
            "expected labels [phishing, legitimate], got {} labels",
            labels.len()
        )));
    }

    let parsed = labels
        .iter()
        .map(|label| label.as_ref().parse::<Label>())
        .collect::<Result<Vec<_>>>()?;

    let phishing = parsed.iter().position(|label| *label == Label::Phishing);
    let legitimate = parsed.iter().position(|label| *label == Label::Legitimate);

    match (phishing, legitimate) {
        (Some(index), Some(_)) => Ok(index),
        _ => Err(PhishError::LabelSchemaMismatch(format!(
            "expected labels [phishing, legitimate], got {:?}",
            labels.iter().map(|l| l.as_ref()).collect::<Vec<_>>()
        ))),
    }
}

/// Fuse a classifier output with heuristic overrides into a verdict
pub fn fuse(
    text: &str,
    kind: InputKind,
    output: &ClassifierOutput,
    policy: &FusionPolicy,
) -> Result<Decision> {
    let index = resolve_class_index(&output.labels)?;
    let raw = output.probabilities.get(index).copied().ok_or_else(|| {
        PhishError::LabelSchemaMismatch(format!(
            "{} labels but {} probabilities",
            output.labels.len(),
            output.probabilities.len()
        ))
    })?;

    if !(0.0..=1.0).contains(&raw) {
        return Err(PhishError::InvalidModelOutput(format!(
            "phishing probability {} is not in [0, 1]",
            raw
        )));
    }

    let mut confidence = raw;

    if kind == InputKind::Url && has_ip_pattern(text) {
        confidence = confidence.max(policy.ip_confidence_floor);
    }

    Ok(Decision {
        is_phishing: confidence > policy.threshold,
        confidence,
    })
}
