//! End-to-end training and evaluation runs.
//!
//! Both are single-pass: load a split, preprocess it with the same
//! transform, then fit or score. The first failing stage aborts the run.
pub mod evaluator;
pub mod trainer;

pub use evaluator::{evaluate_model, run_evaluation, EvaluationReport};
pub use trainer::{run_training, train_model};
