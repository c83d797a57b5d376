use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data_handling::{DatasetSource, Split};
use crate::error::Result;
use crate::metrics::{all_metrics, MetricsRecord};
use crate::models::{ClassifierModel, LogisticRegression};
use crate::preprocessing::preprocess;

/// Outcome of scoring a model on the test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub test_set_size: usize,
    pub metrics: MetricsRecord,
}

/// Predict on `x` and score the predictions against `y`.
pub fn evaluate_model<M>(model: &M, x: &Array2<f32>, y: &Array2<u8>) -> Result<MetricsRecord>
where
    M: ClassifierModel + ?Sized,
{
    let predictions = model.predict(x)?;
    let metrics = all_metrics(&predictions, y)?;
    log::info!(
        "Model evaluation completed: accuracy {:.4}, F1 {:.4}",
        metrics.accuracy,
        metrics.f1_score
    );
    Ok(metrics)
}

/// Load the test split and the model at `model_path`, then score it.
pub fn run_evaluation<S, P>(source: &S, model_path: P) -> Result<EvaluationReport>
where
    S: DatasetSource + ?Sized,
    P: AsRef<Path>,
{
    let dataset = source.load(Split::Test)?;
    let x = preprocess(&dataset.images)?;
    let model = LogisticRegression::load(model_path)?;
    let metrics = evaluate_model(&model, &x, &dataset.labels)?;

    let report = EvaluationReport {
        test_set_size: x.ncols(),
        metrics,
    };
    log::info!("Evaluation completed on {} samples", report.test_set_size);
    Ok(report)
}
