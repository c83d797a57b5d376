//! Integration tests for fitting, predicting and persisting the model.

use ndarray::{array, Array2};
use whisker_classifiers::metrics::accuracy;
use whisker_classifiers::models::{ClassifierModel, LogisticRegression};
use whisker_classifiers::ClassifierError;

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

#[test]
fn separable_two_point_dataset_converges() {
    let x = array![[0.0f32, 1.0]];
    let y = array![[0u8, 1]];

    let mut model = LogisticRegression::new();
    model.fit(&x, &y, 0.5, 2000).unwrap();

    let pred = model.predict(&x).unwrap();
    assert_eq!(pred, y);
    assert_eq!(accuracy(&pred, &y).unwrap(), 1.0);
    assert_eq!(model.costs().len(), 20);
    assert!(model.costs().last().unwrap() < model.costs().first().unwrap());
}

#[test]
fn predictions_are_thresholded_probabilities() {
    let x = Array2::from_shape_fn((3, 12), |(r, c)| ((r * 7 + c * 5) % 11) as f32 / 10.0);
    let y = Array2::from_shape_fn((1, 12), |(_, c)| u8::from(c % 3 == 0));

    let mut model = LogisticRegression::new();
    model.fit(&x, &y, 0.3, 200).unwrap();

    let proba = model.predict_proba(&x).unwrap();
    let pred = model.predict(&x).unwrap();
    assert_eq!(pred.dim(), (1, 12));
    for (&p, &label) in proba.iter().zip(pred.iter()) {
        assert!(label == 0 || label == 1);
        assert_eq!(label, u8::from(p >= 0.5));
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_restores_parameters_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");

    let x = array![[0.1f32, 0.9, 0.4], [0.7, 0.2, 0.5]];
    let y = array![[0u8, 1, 1]];
    let mut model = LogisticRegression::new().with_cost_interval(7);
    model.fit(&x, &y, 0.05, 30).unwrap();
    model.save(&path).unwrap();

    let restored = LogisticRegression::load(&path).unwrap();
    assert_eq!(restored.weights(), model.weights());
    assert_eq!(restored.bias(), model.bias());
    assert_eq!(restored.costs(), model.costs());
    assert_eq!(restored.cost_interval(), 7);
    assert_eq!(restored.predict_proba(&x).unwrap(), model.predict_proba(&x).unwrap());
}

#[test]
fn load_missing_artifact_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = LogisticRegression::load(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, ClassifierError::NotFound(_)), "got {:?}", err);
}

#[test]
fn load_garbage_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    std::fs::write(&path, b"this is not a model").unwrap();
    let err = LogisticRegression::load(&path).unwrap_err();
    assert!(matches!(err, ClassifierError::CorruptArtifact(_)), "got {:?}", err);
}
