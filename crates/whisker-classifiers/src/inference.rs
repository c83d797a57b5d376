//! Single-image prediction boundary.
//!
//! A [`Predictor`] owns a restored model and the resize target it was
//! trained with, and feeds raw inputs (a file, an encoded buffer or a flat
//! pixel array) through the same preprocessing as training. Every
//! prediction is recorded in a [`PredictionStats`] instance that the caller
//! constructs and can share with whatever exposes it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::models::{ClassifierModel, LogisticRegression};
use crate::preprocessing::{
    feature_count_for, normalize_pixels, resize_and_normalize, resize_and_normalize_bytes,
};

/// Thread-safe prediction counters and latencies.
#[derive(Debug, Default)]
pub struct PredictionStats {
    inner: Mutex<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    by_class: BTreeMap<u8, u64>,
    total_latency: Duration,
    count: u64,
}

/// Point-in-time copy of [`PredictionStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_predictions: u64,
    pub predictions_by_class: BTreeMap<u8, u64>,
    pub average_latency_secs: f64,
}

impl PredictionStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, label: u8, latency: Duration) {
        let mut inner = self.lock();
        *inner.by_class.entry(label).or_insert(0) += 1;
        inner.total_latency += latency;
        inner.count += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.lock();
        let average_latency_secs = if inner.count == 0 {
            0.0
        } else {
            inner.total_latency.as_secs_f64() / inner.count as f64
        };
        StatsSnapshot {
            total_predictions: inner.count,
            predictions_by_class: inner.by_class.clone(),
            average_latency_secs,
        }
    }
}

/// Label and positive-class probability for one input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: u8,
    pub probability: f64,
}

pub struct Predictor {
    model: Box<dyn ClassifierModel + Send + Sync>,
    image_size: (u32, u32),
    stats: Arc<PredictionStats>,
}

impl Predictor {
    /// Wrap an already fitted or restored model.
    ///
    /// The model must expect `width * height * 3` features.
    pub fn new(
        model: Box<dyn ClassifierModel + Send + Sync>,
        image_size: (u32, u32),
        stats: Arc<PredictionStats>,
    ) -> Result<Self> {
        let expected = feature_count_for(image_size)?;
        match model.feature_count() {
            None => Err(ClassifierError::NotFitted),
            Some(n) if n != expected => Err(ClassifierError::shape_mismatch(expected, n)),
            Some(_) => Ok(Self {
                model,
                image_size,
                stats,
            }),
        }
    }

    /// Restore a logistic regression artifact from `path`.
    pub fn from_artifact<P: AsRef<Path>>(
        path: P,
        image_size: (u32, u32),
        stats: Arc<PredictionStats>,
    ) -> Result<Self> {
        let model = LogisticRegression::load(path)?;
        Self::new(Box::new(model), image_size, stats)
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    pub fn stats(&self) -> &Arc<PredictionStats> {
        &self.stats
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    fn classify(&self, x: Array2<f32>, start: Instant) -> Result<Prediction> {
        let probability = self.model.predict_proba(&x)?[[0, 0]];
        let label = u8::from(probability >= 0.5);
        let latency = start.elapsed();
        self.stats.record(label, latency);
        log::debug!(
            "Predicted class {} (p = {:.4}) in {:?}",
            label,
            probability,
            latency
        );
        Ok(Prediction { label, probability })
    }

    fn column(img: Array3<f32>) -> Result<Array2<f32>> {
        let features = img.len();
        img.into_shape((features, 1))
            .map_err(|e| ClassifierError::InvalidInput(e.to_string()))
    }

    pub fn predict_file(&self, path: &Path) -> Result<Prediction> {
        let start = Instant::now();
        let img = resize_and_normalize(path, self.image_size)?;
        self.classify(Self::column(img)?, start)
    }

    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<Prediction> {
        let start = Instant::now();
        let img = resize_and_normalize_bytes(bytes, self.image_size)?;
        self.classify(Self::column(img)?, start)
    }

    /// Classify a flat array of raw `[0, 255]` intensities (row-major H, W, C).
    pub fn predict_pixels(&self, values: &[f32]) -> Result<Prediction> {
        let start = Instant::now();
        let x = normalize_pixels(values, self.image_size)?;
        self.classify(x, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness_model() -> LogisticRegression {
        // 1x1 RGB images: bright -> 1, dark -> 0
        let x = Array2::from_shape_vec((3, 2), vec![0.0f32, 1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
        let y = Array2::from_shape_vec((1, 2), vec![0u8, 1]).unwrap();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y, 0.5, 500).unwrap();
        model
    }

    #[test]
    fn stats_count_by_class() {
        let stats = PredictionStats::new();
        stats.record(1, Duration::from_millis(10));
        stats.record(1, Duration::from_millis(20));
        stats.record(0, Duration::from_millis(30));
        let snap = stats.snapshot();
        assert_eq!(snap.total_predictions, 3);
        assert_eq!(snap.predictions_by_class.get(&1), Some(&2));
        assert_eq!(snap.predictions_by_class.get(&0), Some(&1));
        assert!((snap.average_latency_secs - 0.02).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_have_zero_latency() {
        let snap = PredictionStats::new().snapshot();
        assert_eq!(snap.total_predictions, 0);
        assert_eq!(snap.average_latency_secs, 0.0);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let stats = Arc::new(PredictionStats::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record((t % 2) as u8, Duration::from_micros(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = stats.snapshot();
        assert_eq!(snap.total_predictions, 2000);
        assert_eq!(snap.predictions_by_class.get(&0), Some(&1000));
    }

    #[test]
    fn predictor_rejects_unfitted_or_wrong_sized_models() {
        let stats = Arc::new(PredictionStats::new());
        assert!(matches!(
            Predictor::new(Box::new(LogisticRegression::new()), (1, 1), stats.clone()),
            Err(ClassifierError::NotFitted)
        ));
        assert!(matches!(
            Predictor::new(Box::new(brightness_model()), (2, 2), stats),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn predictor_rejects_sizes_that_overflow() {
        assert!(matches!(
            Predictor::new(
                Box::new(brightness_model()),
                (u32::MAX, u32::MAX),
                Arc::new(PredictionStats::new())
            ),
            Err(ClassifierError::InvalidInput(_))
        ));
    }

    #[test]
    fn predict_pixels_classifies_and_records() {
        let stats = Arc::new(PredictionStats::new());
        let predictor = Predictor::new(Box::new(brightness_model()), (1, 1), stats.clone()).unwrap();
        assert_eq!(predictor.predict_pixels(&[255.0, 255.0, 255.0]).unwrap().label, 1);
        assert_eq!(predictor.predict_pixels(&[0.0, 0.0, 0.0]).unwrap().label, 0);
        assert!(matches!(
            predictor.predict_pixels(&[0.0, 0.0]),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert_eq!(stats.snapshot().total_predictions, 2);
    }

    #[test]
    fn predict_bytes_rejects_garbage() {
        let predictor =
            Predictor::new(Box::new(brightness_model()), (1, 1), Arc::new(PredictionStats::new()))
                .unwrap();
        assert!(matches!(
            predictor.predict_bytes(b"not an image"),
            Err(ClassifierError::InvalidInput(_))
        ));
    }
}
