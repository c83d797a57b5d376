use anyhow::{Context, Result};
use maud::html;
use std::path::{Path, PathBuf};
use std::time::Instant;

use whisker_classifiers::data_handling::{DatasetSource, ImageFolderDataset, Split};
use whisker_classifiers::metrics::MetricsRecord;
use whisker_classifiers::models::{ClassifierModel, LogisticRegression};
use whisker_classifiers::pipeline::{self, evaluate_model};
use whisker_classifiers::preprocessing::preprocess;
use whisker_classifiers::report::plots::{plot_learning_curve, plot_probability_histogram};

use crate::report::{Report, ReportSection};
use crate::util::{sibling_path, write_bytes_to_file};

use super::input::TrainConfig;

/// Fit a model on the `train/` split of `config.data_dir`, save it, and
/// write the effective config (and optionally an HTML report) beside it.
pub fn run_training(config: &TrainConfig) -> Result<LogisticRegression> {
    let dataset = ImageFolderDataset::new(&config.data_dir, config.image.clone());
    let output_file = PathBuf::from(&config.output_file);

    let start_time = Instant::now();
    let model = pipeline::run_training(&dataset, &config.model, &output_file)
        .context("Training failed: an error occurred while fitting the model")?;
    let elapsed = start_time.elapsed();
    log::info!("Model saved to: {}", config.output_file);

    if config.report {
        // Reloaded for the report only.
        let train = dataset
            .load(Split::Train)
            .with_context(|| format!("Failed to reload training data from {}", config.data_dir))?;
        let x = preprocess(&train.images)?;
        let train_metrics = evaluate_model(&model, &x, &train.labels)?;
        log::info!("Train accuracy: {:.2}%", train_metrics.accuracy * 100.0);

        let probabilities = model.predict_proba(&x)?;
        let report = build_report(
            config,
            &model,
            &train_metrics,
            probabilities.as_slice().unwrap_or_default(),
            train.labels.as_slice().unwrap_or_default(),
            elapsed.as_secs_f64(),
        )?;
        report.save_to_file(sibling_path(&output_file, "_report.html"))?;
    }

    write_config(config, &sibling_path(&output_file, "_config.json"))?;
    Ok(model)
}

fn build_report(
    config: &TrainConfig,
    model: &LogisticRegression,
    metrics: &MetricsRecord,
    probabilities: &[f64],
    labels: &[u8],
    train_seconds: f64,
) -> Result<Report> {
    let mut report = Report::new("Whisker Training Report", &config.version);

    /* Section 1: Overview */
    {
        let mut overview = ReportSection::new("Overview");
        overview.add_content(html! {
            "Training summary for a logistic regression image classifier fitted by full-batch gradient descent. The learning curve shows the cross-entropy cost at each recorded iteration."
        });
        let final_cost = model
            .costs()
            .last()
            .map(|c| format!("{:.6}", c))
            .unwrap_or_else(|| "n/a".to_string());
        let [[tn, fp], [fn_, tp]] = metrics.confusion_matrix;
        overview.add_table(&[
            ("Training samples", labels.len().to_string()),
            ("Features", config.image.feature_count()?.to_string()),
            ("Iterations", config.model.num_iterations.to_string()),
            ("Learning rate", config.model.learning_rate.to_string()),
            ("Final recorded cost", final_cost),
            ("Train accuracy", format!("{:.4}", metrics.accuracy)),
            ("Train F1", format!("{:.4}", metrics.f1_score)),
            ("TN / FP / FN / TP", format!("{} / {} / {} / {}", tn, fp, fn_, tp)),
            ("Training time (s)", format!("{:.2}", train_seconds)),
        ]);
        overview.add_plot(plot_learning_curve(model.costs(), model.cost_interval()));
        overview.add_plot(plot_probability_histogram(
            probabilities,
            labels,
            "Training Set Probabilities",
        )?);
        report.add_section(overview);
    }

    /* Section 2: Configuration */
    {
        let mut config_section = ReportSection::new("Configuration");
        config_section.add_json(config)?;
        report.add_section(config_section);
    }

    Ok(report)
}

fn write_config(config: &TrainConfig, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(config)?;
    write_bytes_to_file(path, &bytes)
        .with_context(|| format!("Failed to write config: {:?}", path))?;
    log::info!("Effective config written to {}", path.display());
    Ok(())
}
