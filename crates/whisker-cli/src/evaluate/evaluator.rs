use anyhow::{Context, Result};
use maud::html;

use whisker_classifiers::data_handling::{DatasetSource, ImageFolderDataset, Split};
use whisker_classifiers::models::{ClassifierModel, LogisticRegression};
use whisker_classifiers::pipeline::{run_evaluation, EvaluationReport};
use whisker_classifiers::preprocessing::preprocess;
use whisker_classifiers::report::plots::plot_probability_histogram;

use crate::report::{Report, ReportSection};
use crate::util::write_bytes_to_file;

use super::input::EvaluateConfig;

/// Score the model on the `test/` split and return the report that the
/// caller prints.
pub fn run_evaluation_command(config: &EvaluateConfig) -> Result<EvaluationReport> {
    let dataset = ImageFolderDataset::new(&config.data_dir, config.image.clone());

    let report = run_evaluation(&dataset, &config.model_path)
        .with_context(|| format!("Failed to evaluate {}", config.model_path))?;

    if let Some(report_file) = &config.report_file {
        let test = dataset
            .load(Split::Test)
            .with_context(|| format!("Failed to load test data from {}", config.data_dir))?;
        let x = preprocess(&test.images)?;
        let model = LogisticRegression::load(&config.model_path)?;
        let probabilities = model.predict_proba(&x)?;

        let mut html_report = Report::new("Whisker Evaluation Report", clap::crate_version!());
        let mut section = ReportSection::new("Test Set");
        section.add_content(html! {
            "Model: " code { (config.model_path) } ", dataset: " code { (config.data_dir) }
        });
        section.add_json(&report)?;
        section.add_plot(plot_probability_histogram(
            probabilities.as_slice().unwrap_or_default(),
            test.labels.as_slice().unwrap_or_default(),
            "Test Set Probabilities",
        )?);
        html_report.add_section(section);
        html_report.save_to_file(report_file)?;
    }

    if let Some(output_file) = &config.output_file {
        let bytes = serde_json::to_vec_pretty(&report)?;
        write_bytes_to_file(output_file, &bytes)
            .with_context(|| format!("Failed to write evaluation report: {:?}", output_file))?;
    }
    Ok(report)
}
