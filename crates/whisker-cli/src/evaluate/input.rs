use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use whisker_classifiers::config::ImageConfig;

use crate::load_or_default;
use crate::util::{read_partial_config, validate_dataset_dir, validate_model_file};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvaluateConfig {
    /// Root of an image-folder dataset with a `test/` split.
    pub data_dir: String,
    pub model_path: String,
    pub image: ImageConfig,
    /// Also write the evaluation report JSON here.
    pub output_file: Option<PathBuf>,
    /// Write an HTML probability histogram here.
    pub report_file: Option<PathBuf>,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        EvaluateConfig {
            data_dir: String::new(),
            model_path: String::from("trained_model.bin"),
            image: ImageConfig::default(),
            output_file: None,
            report_file: None,
        }
    }
}

impl EvaluateConfig {
    /// Training configs are accepted too: `output_file` there names the model.
    pub fn from_arguments(config_path: &Path, matches: &ArgMatches) -> Result<Self> {
        let partial = read_partial_config(config_path)?;
        let mut config = EvaluateConfig::default();

        if partial.get("model_path").is_none() {
            if let Some(trained) = partial.get("output_file").and_then(|v| v.as_str()) {
                log::info!("Using trained model from config output_file: {}", trained);
                config.model_path = trained.to_string();
            }
        } else {
            load_or_default!(partial, config.model_path);
        }
        load_or_default!(partial, config.data_dir);
        load_or_default!(partial, config.image);
        load_or_default!(partial, config.report_file);

        // Apply CLI overrides
        if let Some(data_dir) = matches.get_one::<String>("data_dir") {
            config.data_dir = data_dir.clone();
        }
        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }
        if let Some(output_file) = matches.get_one::<PathBuf>("output_file") {
            config.output_file = Some(output_file.clone());
        }
        if let Some(report_file) = matches.get_one::<PathBuf>("report_file") {
            config.report_file = Some(report_file.clone());
        }

        validate_dataset_dir(&config.data_dir)?;
        validate_model_file(&config.model_path)?;
        Ok(config)
    }
}
