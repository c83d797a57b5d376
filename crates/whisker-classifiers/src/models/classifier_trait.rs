use ndarray::Array2;

use crate::error::Result;

/// Inference contract shared by fitted or restored models.
///
/// Feature matrices are `(features, samples)`; outputs are `(1, samples)`
/// rows. Implementations hold read-only parameters while predicting, so a
/// model behind this trait can be shared across threads.
pub trait ClassifierModel {
    /// Probability of the positive class for every sample.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f64>>;

    /// Hard 0/1 labels, thresholding `predict_proba` at 0.5.
    fn predict(&self, x: &Array2<f32>) -> Result<Array2<u8>> {
        Ok(self.predict_proba(x)?.mapv(|p| u8::from(p >= 0.5)))
    }

    /// Number of input features, once the model has parameters.
    fn feature_count(&self) -> Option<usize>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
