//! Trained text classifier
//!
//! The scorer only depends on [`TextClassifier`]; [`TextPipeline`] is the
//! TF-IDF + logistic regression implementation produced by the trainer.

pub mod logistic;
pub mod pipeline;
pub mod vectorizer;

pub use logistic::LogisticRegression;
pub use pipeline::TextPipeline;
pub use vectorizer::TfidfVectorizer;

use crate::types::ClassifierOutput;

/// A fitted text classifier. Inference must not mutate state.
#[cfg_attr(test, mockall::automock)]
pub trait TextClassifier: Send + Sync {
    /// Most likely label
    fn predict(&self, text: &str) -> String;

    /// Class probabilities aligned with [`TextClassifier::labels`]
    fn predict_proba(&self, text: &str) -> Vec<f64>;

    /// Label names in the order used by `predict_proba`
    fn labels(&self) -> Vec<String>;

    /// Run the classifier once and bundle everything the decision fuser needs
    fn output(&self, text: &str) -> ClassifierOutput {
        ClassifierOutput {
            predicted_label: self.predict(text),
            labels: self.labels(),
            probabilities: self.predict_proba(text),
        }
    }
}
