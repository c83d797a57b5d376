pub mod evaluator;
pub mod input;
