use ndarray::{Array1, ArrayView1, ArrayView2};

use super::{LOGREG_MODEL_VERSION, LogRegModel, log1p_exp, sigmoid};
use crate::ml::ModelError;

/// Training options for the logistic regression model.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Gradient descent iteration budget.
    pub max_iter: usize,
    /// Stop once the largest gradient component falls below this.
    pub tolerance: f64,
    /// Initial step size; halved until the loss decreases enough.
    pub learning_rate: f64,
    /// Inverse regularization strength.
    pub c: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-6,
            learning_rate: 0.5,
            c: 1.0,
        }
    }
}

const MIN_STEP: f64 = 1e-12;

/// Fit weights minimizing mean log-loss plus `|w|^2 / (2 c n)`.
///
/// Full-batch gradient descent from zero weights with a backtracking step, so
/// identical inputs always yield identical parameters.
pub fn train_logreg(
    x: ArrayView2<'_, f64>,
    y: &[u8],
    options: &TrainOptions,
) -> Result<LogRegModel, ModelError> {
    let (n, dim) = x.dim();
    if n == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if y.len() != n {
        return Err(ModelError::LabelCountMismatch {
            rows: n,
            labels: y.len(),
        });
    }
    if let Some(&bad) = y.iter().find(|&&label| label > 1) {
        return Err(ModelError::InvalidLabel(bad));
    }
    if !y.contains(&0) || !y.contains(&1) {
        return Err(ModelError::SingleClass);
    }

    let targets: Array1<f64> = y.iter().map(|&label| f64::from(label)).collect();
    let l2 = 1.0 / (options.c * n as f64);
    let objective = Objective {
        x,
        y: targets.view(),
        l2,
    };

    let mut weights = Array1::<f64>::zeros(dim);
    let mut bias = 0.0f64;
    let mut loss = objective.loss(weights.view(), bias);
    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < options.max_iter {
        let (grad_w, grad_b) = objective.gradient(weights.view(), bias);
        let max_grad = grad_w
            .iter()
            .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
        if max_grad < options.tolerance {
            converged = true;
            break;
        }
        let grad_sq = grad_w.dot(&grad_w) + grad_b * grad_b;

        let mut step = options.learning_rate;
        let mut accepted = false;
        while step >= MIN_STEP {
            let candidate_w = &weights - &(&grad_w * step);
            let candidate_b = bias - step * grad_b;
            let candidate_loss = objective.loss(candidate_w.view(), candidate_b);
            if candidate_loss <= loss - 0.5 * step * grad_sq {
                weights = candidate_w;
                bias = candidate_b;
                loss = candidate_loss;
                accepted = true;
                break;
            }
            step *= 0.5;
        }
        iterations += 1;
        if !accepted {
            tracing::warn!(
                "Line search stalled after {iterations} iterations (max |grad| {max_grad:.3e})"
            );
            break;
        }
    }

    if !converged && iterations >= options.max_iter {
        tracing::warn!(
            "Logistic regression did not converge within {} iterations (loss {loss:.6})",
            options.max_iter
        );
    }
    let model = LogRegModel {
        model_version: LOGREG_MODEL_VERSION,
        n_features: dim,
        weights: weights.to_vec(),
        bias,
        iterations,
        converged,
    };
    model.validate()?;
    Ok(model)
}

struct Objective<'x, 'y> {
    x: ArrayView2<'x, f64>,
    y: ArrayView1<'y, f64>,
    l2: f64,
}

impl Objective<'_, '_> {
    fn scores(&self, weights: ArrayView1<'_, f64>, bias: f64) -> Array1<f64> {
        self.x.dot(&weights) + bias
    }

    fn loss(&self, weights: ArrayView1<'_, f64>, bias: f64) -> f64 {
        let n = self.x.nrows() as f64;
        let data: f64 = self
            .scores(weights, bias)
            .iter()
            .zip(self.y.iter())
            .map(|(z, y)| log1p_exp(*z) - y * z)
            .sum();
        data / n + 0.5 * self.l2 * weights.dot(&weights)
    }

    fn gradient(&self, weights: ArrayView1<'_, f64>, bias: f64) -> (Array1<f64>, f64) {
        let n = self.x.nrows() as f64;
        let residual = self.scores(weights, bias).mapv(sigmoid) - &self.y;
        let grad_w = self.x.t().dot(&residual) / n + &weights * self.l2;
        let grad_b = residual.sum() / n;
        (grad_w, grad_b)
    }
}
