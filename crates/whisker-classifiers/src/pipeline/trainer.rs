use std::path::Path;
use std::time::Instant;

use ndarray::Array2;

use crate::config::ModelConfig;
use crate::data_handling::{DatasetSource, Split};
use crate::error::Result;
use crate::models::LogisticRegression;
use crate::preprocessing::preprocess;

/// Fit a fresh model on an already preprocessed feature matrix.
pub fn train_model(x: &Array2<f32>, y: &Array2<u8>, config: &ModelConfig) -> Result<LogisticRegression> {
    let mut model = LogisticRegression::new().with_cost_interval(config.cost_interval);
    let start_time = Instant::now();
    model.fit(x, y, config.learning_rate, config.num_iterations)?;
    log::info!("Training completed in {:?}", start_time.elapsed());
    Ok(model)
}

/// Load the training split, fit a model and write it to `output_path`.
///
/// The returned model still carries its cost history for plotting.
pub fn run_training<S, P>(source: &S, config: &ModelConfig, output_path: P) -> Result<LogisticRegression>
where
    S: DatasetSource + ?Sized,
    P: AsRef<Path>,
{
    let dataset = source.load(Split::Train)?;
    log::info!("Loaded {} training samples", dataset.len());

    let x = preprocess(&dataset.images)?;
    let model = train_model(&x, &dataset.labels, config)?;
    model.save(output_path)?;
    Ok(model)
}
