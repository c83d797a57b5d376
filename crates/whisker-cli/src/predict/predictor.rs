use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use whisker_classifiers::inference::{PredictionStats, Predictor, StatsSnapshot};
use whisker_classifiers::models::{ClassifierModel, LogisticRegression};

use super::input::{infer_square_size, PredictConfig};
use super::output::{print_predictions, write_predictions, PredictionRow};

/// Classify every input; unreadable images are skipped with a warning.
pub fn run_prediction(config: &PredictConfig) -> Result<(Vec<PredictionRow>, StatsSnapshot)> {
    let model_path = Path::new(&config.model_path);
    let model = LogisticRegression::load(model_path)
        .with_context(|| format!("Failed to load model: {}", config.model_path))?;

    let image_size = match config.image_size {
        Some(size) => size,
        None => {
            let features = model.feature_count().unwrap_or_default();
            infer_square_size(features, model_path)?
        }
    };
    log::info!(
        "Classifying {} images at {}x{}",
        config.inputs.len(),
        image_size.0,
        image_size.1
    );

    let stats = Arc::new(PredictionStats::new());
    let predictor = Predictor::new(Box::new(model), image_size, Arc::clone(&stats))?;

    let mut rows = Vec::with_capacity(config.inputs.len());
    for path in &config.inputs {
        match predictor.predict_file(path) {
            Ok(prediction) => rows.push(PredictionRow {
                file: path.display().to_string(),
                prediction: prediction.label,
                probability: prediction.probability,
            }),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    match &config.output_file {
        Some(path) => write_predictions(&rows, path)?,
        None => print_predictions(&rows)?,
    }

    let snapshot = stats.snapshot();
    log::info!(
        "Prediction stats: {}",
        serde_json::to_string(&snapshot).unwrap_or_default()
    );
    Ok((rows, snapshot))
}
