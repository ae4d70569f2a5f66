//! Scorer: the read-only classification handle shared by request handlers

use std::path::Path;
use std::sync::Arc;

use crate::classifier::{TextClassifier, TextPipeline};
use crate::error::{PhishError, Result};
use crate::features;
use crate::fusion::{self, resolve_class_index, FusionPolicy};
use crate::types::{ClassificationRequest, ClassificationResult};

/// Holds the loaded classifier (if any) and the fusion policy.
///
/// Built once at startup and never mutated afterwards, so it can be shared
/// across concurrent requests behind an `Arc` without locking.
#[derive(Clone)]
pub struct Scorer {
    classifier: Option<Arc<dyn TextClassifier>>,
    policy: FusionPolicy,
}

impl Scorer {
    /// Wrap a classifier, checking its label schema up front
    pub fn new(classifier: Arc<dyn TextClassifier>, policy: FusionPolicy) -> Result<Self> {
        resolve_class_index(&classifier.labels())?;
        Ok(Self {
            classifier: Some(classifier),
            policy,
        })
    }

    /// A scorer with no model; every classification fails with `ModelUnavailable`
    pub fn unavailable(policy: FusionPolicy) -> Self {
        Self {
            classifier: None,
            policy,
        }
    }

    /// Load a persisted pipeline from disk
    pub fn load<P: AsRef<Path>>(path: P, policy: FusionPolicy) -> Result<Self> {
        let pipeline = TextPipeline::load(path)?;
        Self::new(Arc::new(pipeline), policy)
    }

    pub fn is_ready(&self) -> bool {
        self.classifier.is_some()
    }

    /// Classify one request: model output, heuristic fusion, diagnostic features
    pub fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationResult> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(PhishError::ModelUnavailable)?;

        let output = classifier.output(&request.text);
        let decision = fusion::fuse(&request.text, request.kind, &output, &self.policy)?;

        Ok(ClassificationResult {
            is_phishing: decision.is_phishing,
            confidence: decision.confidence,
            features: features::extract(&request.text, request.kind),
        })
    }
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("ready", &self.is_ready())
            .field("policy", &self.policy)
            .finish()
    }
}
