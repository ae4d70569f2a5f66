//! Binary logistic regression over sparse feature vectors

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::vectorizer::SparseVector;
use crate::error::{PhishError, Result};

const GRADIENT_TOLERANCE: f64 = 1e-6;

/// Gradient descent settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Inverse L2 regularization strength
    pub c: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 1.0,
            c: 1.0,
        }
    }
}

/// Fitted linear model; predicts the probability of the positive class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn from_parts(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Fit with full-batch gradient descent on mean log-loss plus an L2 penalty.
    /// The intercept is not penalised.
    pub fn fit(
        samples: &[SparseVector],
        targets: &[bool],
        n_features: usize,
        params: &LogisticParams,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(PhishError::Training("no training samples".to_string()));
        }
        if samples.len() != targets.len() {
            return Err(PhishError::Training(format!(
                "{} samples but {} targets",
                samples.len(),
                targets.len()
            )));
        }

        let n = samples.len() as f64;
        let lambda = 1.0 / (params.c * n);
        // Step bounded by the inverse smoothness of the objective, intercept column included
        let max_sq_norm = samples
            .iter()
            .map(|x| x.iter().map(|&(_, value)| value * value).sum::<f64>())
            .fold(0.0, f64::max);
        let step = params
            .learning_rate
            .min(1.0 / (0.25 * (max_sq_norm + 1.0) + lambda));
        let mut model = Self::from_parts(vec![0.0; n_features], 0.0);
        let mut grad_w = vec![0.0; n_features];

        for iteration in 0..params.max_iter {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for (x, &y) in samples.iter().zip(targets) {
                let error = model.predict_probability(x) - if y { 1.0 } else { 0.0 };
                for &(index, value) in x {
                    grad_w[index] += error * value;
                }
                grad_b += error;
            }

            let mut max_grad = (grad_b / n).abs();
            for (g, w) in grad_w.iter_mut().zip(&model.coefficients) {
                *g = *g / n + lambda * w;
                max_grad = max_grad.max(g.abs());
            }

            for (w, g) in model.coefficients.iter_mut().zip(&grad_w) {
                *w -= step * g;
            }
            model.intercept -= step * grad_b / n;

            if max_grad < GRADIENT_TOLERANCE {
                debug!("Logistic regression converged after {} iterations", iteration + 1);
                break;
            }
        }

        if !model.is_finite() {
            return Err(PhishError::Training(
                "gradient descent produced non-finite coefficients".to_string(),
            ));
        }
        Ok(model)
    }

    /// True when every coefficient and the intercept are finite
    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|w| w.is_finite())
    }

    fn decision_function(&self, x: &SparseVector) -> f64 {
        x.iter()
            .filter_map(|&(index, value)| self.coefficients.get(index).map(|w| w * value))
            .sum::<f64>()
            + self.intercept
    }

    /// Probability of the positive class
    pub fn predict_probability(&self, x: &SparseVector) -> f64 {
        sigmoid(self.decision_function(x))
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
