//! whisker-classifiers: a binary image classifier built on logistic regression.
//!
//! The crate covers the whole path from image files to a class label:
//! deterministic preprocessing (decode, resize, scale, flatten), a
//! logistic regression model fitted with full-batch gradient descent and
//! persisted in a small versioned binary format, binary classification
//! metrics, train/evaluate pipelines over an image-folder dataset, and a
//! `Predictor` that a CLI or service can wrap.
//!
//! Feature matrices are `(features, samples)`: one column per image.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;

pub use error::{ClassifierError, Result};
