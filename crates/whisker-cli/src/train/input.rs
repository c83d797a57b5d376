use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::Path;

use whisker_classifiers::config::{ImageConfig, ModelConfig};

use crate::load_or_default;
use crate::util::{read_partial_config, validate_dataset_dir};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainConfig {
    pub version: String,
    /// Root of an image-folder dataset with a `train/` split.
    pub data_dir: String,
    pub output_file: String,
    pub model: ModelConfig,
    pub image: ImageConfig,
    /// Write an HTML training report next to the model.
    pub report: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            version: clap::crate_version!().to_string(),
            data_dir: String::new(),
            output_file: String::from("trained_model.bin"),
            model: ModelConfig::default(),
            image: ImageConfig::default(),
            report: true,
        }
    }
}

impl TrainConfig {
    pub fn from_arguments(config_path: &Path, matches: &ArgMatches) -> Result<Self> {
        let mut config = Self::from_file(config_path)?;

        // Apply CLI overrides
        if let Some(data_dir) = matches.get_one::<String>("data_dir") {
            config.data_dir = data_dir.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        if let Some(learning_rate) = matches.get_one::<f64>("learning_rate") {
            config.model.learning_rate = *learning_rate;
        }
        if let Some(iterations) = matches.get_one::<usize>("iterations") {
            config.model.num_iterations = *iterations;
        }
        if matches.get_flag("no_report") {
            config.report = false;
        }

        validate_dataset_dir(&config.data_dir)?;
        Ok(config)
    }

    /// Config file values over defaults, without CLI overrides or validation.
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let partial = read_partial_config(config_path)?;
        let mut config = TrainConfig::default();

        load_or_default!(partial, config.data_dir);
        load_or_default!(partial, config.output_file);
        load_or_default!(partial, config.model);
        load_or_default!(partial, config.image);
        load_or_default!(partial, config.report);

        Ok(config)
    }
}
