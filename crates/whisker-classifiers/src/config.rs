use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preprocessing::{feature_count_for, DEFAULT_IMAGE_SIZE};

/// Hyper-parameters for fitting a logistic regression model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub learning_rate: f64,
    pub num_iterations: usize,
    /// Record the training cost every `cost_interval` iterations.
    pub cost_interval: usize,
}

impl ModelConfig {
    pub fn new(learning_rate: f64, num_iterations: usize) -> Self {
        Self {
            learning_rate,
            num_iterations,
            ..Self::default()
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            num_iterations: 2000,
            cost_interval: 100,
        }
    }
}

/// Resize target and class folder names for image-folder datasets.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub positive_class: String,
    pub negative_class: String,
}

impl ImageConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Length of a flattened RGB feature column for this size.
    pub fn feature_count(&self) -> Result<usize> {
        feature_count_for(self.size())
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_SIZE.0,
            height: DEFAULT_IMAGE_SIZE.1,
            positive_class: "positive".to_string(),
            negative_class: "negative".to_string(),
        }
    }
}
