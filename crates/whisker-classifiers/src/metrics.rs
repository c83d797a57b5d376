//! Binary classification metrics over parallel prediction/label arrays.
//!
//! All functions take 0/1 integer arrays of any dimensionality; the two
//! arrays must have exactly the same shape.

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

/// Added to denominators so a class missing from predictions yields 0, not NaN.
pub const F1_EPSILON: f64 = 1e-10;

/// Accuracy, F1 and the `[[TN, FP], [FN, TP]]` confusion matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub f1_score: f64,
    pub confusion_matrix: [[u64; 2]; 2],
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    tp: u64,
    tn: u64,
    fp: u64,
    fn_: u64,
}

fn check_inputs<S1, S2, D1, D2>(pred: &ArrayBase<S1, D1>, labels: &ArrayBase<S2, D2>) -> Result<()>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D1: Dimension,
    D2: Dimension,
{
    if pred.shape() != labels.shape() {
        return Err(ClassifierError::shape_mismatch(labels.shape(), pred.shape()));
    }
    if let Some(bad) = pred.iter().chain(labels.iter()).find(|&&v| v > 1) {
        return Err(ClassifierError::InvalidInput(format!(
            "predictions and labels must be 0 or 1, got {}",
            bad
        )));
    }
    Ok(())
}

fn count<S1, S2, D1, D2>(pred: &ArrayBase<S1, D1>, labels: &ArrayBase<S2, D2>) -> Result<Counts>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D1: Dimension,
    D2: Dimension,
{
    check_inputs(pred, labels)?;
    let mut counts = Counts::default();
    for (&p, &l) in pred.iter().zip(labels.iter()) {
        match (p, l) {
            (1, 1) => counts.tp += 1,
            (0, 0) => counts.tn += 1,
            (1, 0) => counts.fp += 1,
            _ => counts.fn_ += 1,
        }
    }
    Ok(counts)
}

/// Fraction of positions where prediction equals label.
pub fn accuracy<S1, S2, D1, D2>(pred: &ArrayBase<S1, D1>, labels: &ArrayBase<S2, D2>) -> Result<f64>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D1: Dimension,
    D2: Dimension,
{
    check_inputs(pred, labels)?;
    if pred.is_empty() {
        return Err(ClassifierError::InvalidInput(
            "accuracy of an empty prediction set is undefined".to_string(),
        ));
    }
    let correct = pred
        .iter()
        .zip(labels.iter())
        .filter(|(p, l)| p == l)
        .count();
    let acc = correct as f64 / pred.len() as f64;
    log::debug!("Accuracy calculated: {:.4}", acc);
    Ok(acc)
}

/// Harmonic mean of precision and recall for the positive class.
pub fn f1_score<S1, S2, D1, D2>(pred: &ArrayBase<S1, D1>, labels: &ArrayBase<S2, D2>) -> Result<f64>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D1: Dimension,
    D2: Dimension,
{
    let c = count(pred, labels)?;
    let tp = c.tp as f64;
    let precision = tp / (tp + c.fp as f64 + F1_EPSILON);
    let recall = tp / (tp + c.fn_ as f64 + F1_EPSILON);
    let f1 = 2.0 * precision * recall / (precision + recall + F1_EPSILON);
    log::debug!("F1 score calculated: {:.4}", f1);
    Ok(f1)
}

/// `[[TN, FP], [FN, TP]]`
pub fn confusion_matrix<S1, S2, D1, D2>(
    pred: &ArrayBase<S1, D1>,
    labels: &ArrayBase<S2, D2>,
) -> Result<[[u64; 2]; 2]>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D1: Dimension,
    D2: Dimension,
{
    let c = count(pred, labels)?;
    Ok([[c.tn, c.fp], [c.fn_, c.tp]])
}

pub fn all_metrics<S1, S2, D1, D2>(
    pred: &ArrayBase<S1, D1>,
    labels: &ArrayBase<S2, D2>,
) -> Result<MetricsRecord>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    D1: Dimension,
    D2: Dimension,
{
    let record = MetricsRecord {
        accuracy: accuracy(pred, labels)?,
        f1_score: f1_score(pred, labels)?,
        confusion_matrix: confusion_matrix(pred, labels)?,
    };
    log::debug!("All metrics calculated: {:?}", record);
    Ok(record)
}
