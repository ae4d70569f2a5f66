//! Vectorizer + classifier pipeline and its persisted form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use super::logistic::{LogisticParams, LogisticRegression};
use super::vectorizer::TfidfVectorizer;
use super::TextClassifier;
use crate::config::TrainingConfig;
use crate::error::{PhishError, Result};
use crate::types::ClassifierOutput;

/// Settings for fitting a [`TextPipeline`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineParams {
    pub max_features: usize,
    pub logistic: LogisticParams,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            max_features: 5000,
            logistic: LogisticParams::default(),
        }
    }
}

impl From<&TrainingConfig> for PipelineParams {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            max_features: config.max_features,
            logistic: LogisticParams {
                max_iter: config.max_iter,
                learning_rate: config.learning_rate,
                c: config.c,
            },
        }
    }
}

/// TF-IDF vectorizer followed by logistic regression, fitted jointly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPipeline {
    format_version: u32,
    /// Sorted class names; the model's positive class is `classes[1]`
    classes: Vec<String>,
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
    trained_at: DateTime<Utc>,
    #[serde(default)]
    accuracy: Option<f64>,
}

impl TextPipeline {
    pub const FORMAT_VERSION: u32 = 1;

    /// Fit on parallel slices of texts and label names. Exactly two classes are required.
    pub fn fit<T, L>(texts: &[T], labels: &[L], params: &PipelineParams) -> Result<Self>
    where
        T: AsRef<str>,
        L: AsRef<str>,
    {
        if texts.len() != labels.len() {
            return Err(PhishError::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let classes: Vec<String> = labels
            .iter()
            .map(|label| label.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() != 2 {
            return Err(PhishError::Training(format!(
                "binary classifier needs exactly 2 classes, found {:?}",
                classes
            )));
        }

        let mut vectorizer = TfidfVectorizer::new(params.max_features);
        let samples = vectorizer.fit_transform(texts)?;
        let targets: Vec<bool> = labels
            .iter()
            .map(|label| label.as_ref() == classes[1])
            .collect();

        let model = LogisticRegression::fit(
            &samples,
            &targets,
            vectorizer.vocabulary_size(),
            &params.logistic,
        )?;

        Ok(Self {
            format_version: Self::FORMAT_VERSION,
            classes,
            vectorizer,
            model,
            trained_at: Utc::now(),
            accuracy: None,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Held-out accuracy recorded by the trainer
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = Some(accuracy);
    }

    fn positive_probability(&self, text: &str) -> f64 {
        self.model
            .predict_probability(&self.vectorizer.transform(text))
    }

    fn label_for(&self, positive_probability: f64) -> String {
        if positive_probability > 0.5 {
            self.classes[1].clone()
        } else {
            self.classes[0].clone()
        }
    }

    /// Persist as JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string(self)?;
        std::fs::write(path, data)?;

        info!("Model saved to {}", path.display());
        Ok(())
    }

    /// Load a persisted pipeline
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let pipeline: TextPipeline = serde_json::from_str(&data)?;

        pipeline.check_consistency(path)?;

        info!(
            "Loaded model from {} ({} terms, trained {})",
            path.display(),
            pipeline.vectorizer.vocabulary_size(),
            pipeline.trained_at.to_rfc3339()
        );
        Ok(pipeline)
    }

    fn check_consistency(&self, path: &Path) -> Result<()> {
        if self.format_version != Self::FORMAT_VERSION {
            return Err(PhishError::Config(format!(
                "unsupported model format version {} in {}",
                self.format_version,
                path.display()
            )));
        }
        if self.classes.len() != 2 {
            return Err(PhishError::LabelSchemaMismatch(format!(
                "model in {} has {} classes, expected 2",
                path.display(),
                self.classes.len()
            )));
        }
        if !self.vectorizer.is_fitted() {
            return Err(PhishError::Config(format!(
                "model in {} has a corrupt vocabulary or idf table",
                path.display()
            )));
        }
        if !self.model.is_finite() {
            return Err(PhishError::Config(format!(
                "model in {} has non-finite coefficients",
                path.display()
            )));
        }
        if self.model.n_features() != self.vectorizer.vocabulary_size() {
            return Err(PhishError::Config(format!(
                "model in {} is inconsistent: {} coefficients for {} terms",
                path.display(),
                self.model.n_features(),
                self.vectorizer.vocabulary_size()
            )));
        }
        Ok(())
    }
}

impl TextClassifier for TextPipeline {
    fn predict(&self, text: &str) -> String {
        self.label_for(self.positive_probability(text))
    }

    fn predict_proba(&self, text: &str) -> Vec<f64> {
        let p = self.positive_probability(text);
        vec![1.0 - p, p]
    }

    fn labels(&self) -> Vec<String> {
        self.classes.clone()
    }

    fn output(&self, text: &str) -> ClassifierOutput {
        let p = self.positive_probability(text);
        ClassifierOutput {
            predicted_label: self.label_for(p),
            labels: self.classes.clone(),
            probabilities: vec![1.0 - p, p],
        }
    }
}
