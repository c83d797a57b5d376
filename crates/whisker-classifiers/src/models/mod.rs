pub mod artifact;
pub mod classifier_trait;
pub mod logistic_regression;

pub use classifier_trait::ClassifierModel;
pub use logistic_regression::LogisticRegression;
