use std::path::Path;

use ndarray::{Array1, Array2, Axis};

use crate::error::{ClassifierError, Result};
use crate::models::artifact::ModelArtifact;
use crate::models::classifier_trait::ClassifierModel;

/// Probabilities are clamped to `[COST_EPSILON, 1 - COST_EPSILON]` inside the
/// log terms of the cost so a saturated sigmoid never produces `ln(0)`.
pub const COST_EPSILON: f64 = 1e-15;

/// Default number of iterations between recorded costs.
pub const DEFAULT_COST_INTERVAL: usize = 100;

#[derive(Debug, Clone, PartialEq)]
struct Parameters {
    weights: Array1<f64>,
    bias: f64,
}

/// Single-layer logistic regression fitted with full-batch gradient descent.
///
/// Inputs are `(features, samples)` matrices, labels a `(1, samples)` row of
/// 0/1 values. Parameters are created on the first call to [`fit`] (all
/// zeros) or by [`load`]; until then every prediction returns
/// [`ClassifierError::NotFitted`].
///
/// [`fit`]: LogisticRegression::fit
/// [`load`]: LogisticRegression::load
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    params: Option<Parameters>,
    costs: Vec<f64>,
    cost_interval: usize,
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            params: None,
            costs: Vec::new(),
            cost_interval: DEFAULT_COST_INTERVAL,
        }
    }

    /// Record the cost every `interval` iterations instead of every 100.
    /// An interval of zero is treated as one.
    pub fn with_cost_interval(mut self, interval: usize) -> Self {
        self.cost_interval = interval.max(1);
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.params.as_ref().map(|p| &p.weights)
    }

    pub fn bias(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.bias)
    }

    /// Costs recorded during fitting, one per `cost_interval` iterations.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn cost_interval(&self) -> usize {
        self.cost_interval
    }

    fn fitted(&self) -> Result<&Parameters> {
        self.params.as_ref().ok_or(ClassifierError::NotFitted)
    }

    /// Sigmoid activations for `x` (already converted to `f64`), one per column.
    fn forward(params: &Parameters, x: &Array2<f64>) -> Array1<f64> {
        (params.weights.dot(x) + params.bias).mapv(sigmoid)
    }

    fn cost(a: &Array1<f64>, y: &Array1<f64>) -> f64 {
        let m = y.len() as f64;
        let total: f64 = a
            .iter()
            .zip(y.iter())
            .map(|(&p, &t)| {
                let p = p.clamp(COST_EPSILON, 1.0 - COST_EPSILON);
                t * p.ln() + (1.0 - t) * (1.0 - p).ln()
            })
            .sum();
        -total / m
    }

    /// Run exactly `num_iterations` steps of full-batch gradient descent.
    ///
    /// Each step computes `A = sigmoid(W^T X + b)`, the cross-entropy cost,
    /// `dW = X (A - y)^T / m` and `db = sum(A - y) / m`, then updates
    /// `W -= learning_rate * dW` and `b -= learning_rate * db`.
    pub fn fit(
        &mut self,
        x: &Array2<f32>,
        y: &Array2<u8>,
        learning_rate: f64,
        num_iterations: usize,
    ) -> Result<()> {
        let (n_features, m) = x.dim();
        if y.dim() != (1, m) {
            return Err(ClassifierError::shape_mismatch((1, m), y.dim()));
        }
        if m == 0 {
            return Err(ClassifierError::InvalidInput(
                "cannot fit on zero samples".to_string(),
            ));
        }
        if y.iter().any(|&l| l > 1) {
            return Err(ClassifierError::InvalidInput(
                "labels must be 0 or 1".to_string(),
            ));
        }
        if num_iterations == 0 {
            return Err(ClassifierError::InvalidInput(
                "num_iterations must be positive".to_string(),
            ));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(ClassifierError::InvalidInput(format!(
                "learning_rate must be positive and finite, got {}",
                learning_rate
            )));
        }
        if let Some(params) = &self.params {
            if params.weights.len() != n_features {
                return Err(ClassifierError::shape_mismatch(
                    params.weights.len(),
                    n_features,
                ));
            }
        }

        let params = self.params.get_or_insert_with(|| Parameters {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        });

        let x = x.mapv(f64::from);
        let y = y.index_axis(Axis(0), 0).mapv(f64::from);
        let inv_m = 1.0 / m as f64;

        log::info!(
            "Fitting logistic regression: {} features, {} samples, {} iterations, learning rate {}",
            n_features,
            m,
            num_iterations,
            learning_rate
        );

        for i in 0..num_iterations {
            let a = Self::forward(params, &x);
            let dz = &a - &y;
            let dw = x.dot(&dz) * inv_m;
            let db = dz.sum() * inv_m;

            params.weights.scaled_add(-learning_rate, &dw);
            params.bias -= learning_rate * db;

            if i % self.cost_interval == 0 {
                let cost = Self::cost(&a, &y);
                log::debug!("Cost after iteration {}: {:.6}", i, cost);
                self.costs.push(cost);
            }
        }

        Ok(())
    }

    /// Write the parameters and cost history to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let params = self.fitted()?;
        let artifact = ModelArtifact {
            weights: params.weights.to_vec(),
            bias: params.bias,
            cost_interval: self.cost_interval as u64,
            costs: self.costs.clone(),
        };
        artifact.write_to(path.as_ref())?;
        log::info!("Model saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Restore a model previously written with [`LogisticRegression::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::error!("Model file not found: {}", path.display());
            return Err(ClassifierError::NotFound(path.to_path_buf()));
        }
        let artifact = ModelArtifact::read_from(path)?;
        let model = Self::from_artifact(artifact)?;
        log::info!("Model loaded successfully from {}", path.display());
        Ok(model)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let cost_interval = usize::try_from(artifact.cost_interval)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                ClassifierError::CorruptArtifact(format!(
                    "invalid cost interval {}",
                    artifact.cost_interval
                ))
            })?;
        Ok(Self {
            params: Some(Parameters {
                weights: Array1::from(artifact.weights),
                bias: artifact.bias,
            }),
            costs: artifact.costs,
            cost_interval,
        })
    }
}

impl ClassifierModel for LogisticRegression {
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f64>> {
        let params = self.fitted()?;
        if x.nrows() != params.weights.len() {
            return Err(ClassifierError::shape_mismatch(
                (params.weights.len(), x.ncols()),
                x.dim(),
            ));
        }
        let a = Self::forward(params, &x.mapv(f64::from));
        Ok(a.insert_axis(Axis(0)))
    }

    fn feature_count(&self) -> Option<usize> {
        self.params.as_ref().map(|p| p.weights.len())
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn sigmoid_values() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
    }

    #[test]
    fn unfitted_model_refuses_to_predict() {
        let model = LogisticRegression::new();
        let x = array![[0.0f32, 1.0]];
        assert!(matches!(model.predict(&x), Err(ClassifierError::NotFitted)));
        assert!(matches!(model.predict_proba(&x), Err(ClassifierError::NotFitted)));
        assert!(matches!(model.save("unused.bin"), Err(ClassifierError::NotFitted)));
    }

    #[test]
    fn first_step_matches_hand_computed_gradient() {
        // From zero parameters A = 0.5 everywhere, so dz = [0.5, -0.5].
        let x = array![[0.0f32, 1.0]];
        let y = array![[0u8, 1]];
        let mut model = LogisticRegression::new();
        model.fit(&x, &y, 1.0, 1).unwrap();
        // dw = (0 * 0.5 + 1 * -0.5) / 2 = -0.25, db = 0
        assert_eq!(model.weights().unwrap()[0], 0.25);
        assert_eq!(model.bias().unwrap(), 0.0);
        assert_eq!(model.costs().len(), 1);
        assert!((model.costs()[0] - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn costs_follow_the_recording_interval() {
        let x = array![[0.0f32, 1.0]];
        let y = array![[0u8, 1]];
        let mut model = LogisticRegression::new().with_cost_interval(10);
        model.fit(&x, &y, 0.1, 25).unwrap();
        // iterations 0, 10, 20
        assert_eq!(model.costs().len(), 3);
        assert!(model.costs().windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn fit_validates_inputs() {
        let x = array![[0.0f32, 1.0]];
        let mut model = LogisticRegression::new();
        assert!(matches!(
            model.fit(&x, &array![[0u8, 1, 1]], 0.1, 10),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            model.fit(&x, &array![[0u8], [1]], 0.1, 10),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            model.fit(&x, &array![[0u8, 2]], 0.1, 10),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(matches!(
            model.fit(&x, &array![[0u8, 1]], 0.1, 0),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(matches!(
            model.fit(&x, &array![[0u8, 1]], -0.1, 10),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn refit_requires_same_feature_count() {
        let mut model = LogisticRegression::new();
        model.fit(&array![[0.0f32, 1.0]], &array![[0u8, 1]], 0.1, 5).unwrap();
        let wider = array![[0.0f32, 1.0], [1.0, 0.0]];
        assert!(matches!(
            model.fit(&wider, &array![[0u8, 1]], 0.1, 5),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            model.predict(&wider),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn probability_row_has_one_entry_per_sample() {
        let mut model = LogisticRegression::new();
        let x = array![[0.0f32, 1.0, 0.5], [1.0, 0.0, 0.5]];
        model.fit(&x, &array![[0u8, 1, 1]], 0.5, 50).unwrap();
        let p = model.predict_proba(&x).unwrap();
        assert_eq!(p.dim(), (1, 3));
        assert!(p.iter().all(|&v| v > 0.0 && v < 1.0));
        assert_eq!(model.feature_count(), Some(2));
    }
}
