//! Offline trainer: split, fit, evaluate, persist

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::classifier::pipeline::PipelineParams;
use crate::classifier::{TextClassifier, TextPipeline};
use crate::config::TrainingConfig;
use crate::error::{PhishError, Result};
use crate::types::{Label, TrainingExample};

/// Seeded shuffle split into (train, test).
///
/// The test partition holds `ceil(n * test_ratio)` items, and both partitions
/// are non-empty whenever there are at least two items.
pub fn train_test_split<T: Clone>(items: &[T], test_ratio: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let n = items.len();
    if n < 2 {
        return (items.to_vec(), Vec::new());
    }

    let test_size = ((n as f64 * test_ratio).ceil() as usize).clamp(1, n - 1);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices[..test_size].iter().map(|&i| items[i].clone()).collect();
    let train = indices[test_size..].iter().map(|&i| items[i].clone()).collect();
    (train, test)
}

/// Per-class evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation. Informational only; nothing is gated on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub train_size: usize,
    pub test_size: usize,
}

impl EvaluationReport {
    pub fn from_predictions(truth: &[Label], predicted: &[Label], train_size: usize) -> Self {
        let total = truth.len();
        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };

        let classes = [Label::Legitimate, Label::Phishing]
            .into_iter()
            .map(|label| {
                let pairs = || truth.iter().zip(predicted);
                let tp = pairs().filter(|(t, p)| **t == label && **p == label).count();
                let predicted_count = predicted.iter().filter(|p| **p == label).count();
                let support = truth.iter().filter(|t| **t == label).count();

                let precision = ratio(tp, predicted_count);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self {
            accuracy,
            classes,
            train_size,
            test_size: total,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                class.label.as_str(),
                class.precision,
                class.recall,
                class.f1,
                class.support
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.test_size
        )
    }
}

/// A fitted pipeline and how it scored on held-out data
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: TextPipeline,
    pub report: EvaluationReport,
}

/// Fits a [`TextPipeline`] from labeled examples
#[derive(Debug, Clone)]
pub struct Trainer {
    params: PipelineParams,
    test_ratio: f64,
    seed: u64,
}

impl Trainer {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            params: PipelineParams::from(config),
            test_ratio: config.test_ratio,
            seed: config.seed,
        }
    }

    /// Split, fit on the train partition, evaluate on the held-out partition
    pub fn train(&self, examples: &[TrainingExample]) -> Result<TrainingOutcome> {
        if examples.len() < 2 {
            return Err(PhishError::Dataset(format!(
                "need at least 2 examples to train, got {}",
                examples.len()
            )));
        }

        let (train, test) = train_test_split(examples, self.test_ratio, self.seed);
        info!(
            "Training on {} examples, evaluating on {}",
            train.len(),
            test.len()
        );

        let texts: Vec<&str> = train.iter().map(|e| e.text.as_str()).collect();
        let labels: Vec<&str> = train.iter().map(|e| e.label.as_str()).collect();
        let mut pipeline = TextPipeline::fit(&texts, &labels, &self.params)?;

        let truth: Vec<Label> = test.iter().map(|e| e.label).collect();
        let predicted = test
            .iter()
            .map(|e| pipeline.predict(&e.text).parse::<Label>())
            .collect::<Result<Vec<_>>>()?;

        let report = EvaluationReport::from_predictions(&truth, &predicted, train.len());
        pipeline.set_accuracy(report.accuracy);
        info!("Accuracy: {:.4}", report.accuracy);

        Ok(TrainingOutcome { pipeline, report })
    }

    /// Train and persist the fitted pipeline
    pub fn train_and_save<P: AsRef<Path>>(
        &self,
        examples: &[TrainingExample],
        path: P,
    ) -> Result<TrainingOutcome> {
        let outcome = self.train(examples)?;
        outcome.pipeline.save(path)?;
        Ok(outcome)
    }
}
