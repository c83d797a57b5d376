//! Dataset loading.
//!
//! A [`DatasetSource`] hands out raw image batches and their labels for a
//! train or test split. The only on-disk layout shipped here is
//! [`ImageFolderDataset`]:
//!
//! ```text
//! <root>/train/<positive_class>/*.png
//! <root>/train/<negative_class>/*.png
//! <root>/test/<positive_class>/*.png
//! <root>/test/<negative_class>/*.png
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::{Array2, Array4, Axis};
use serde::{Deserialize, Serialize};

use crate::config::ImageConfig;
use crate::error::{ClassifierError, Result};
use crate::preprocessing::{load_image_batch, stack_classes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Raw images `(N, H, W, C)` with a parallel `(1, N)` label row.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub images: Array4<u8>,
    pub labels: Array2<u8>,
}

impl RawDataset {
    pub fn new(images: Array4<u8>, labels: Array2<u8>) -> Result<Self> {
        let n = images.len_of(Axis(0));
        if labels.dim() != (1, n) {
            return Err(ClassifierError::shape_mismatch((1, n), labels.dim()));
        }
        if labels.iter().any(|&l| l > 1) {
            return Err(ClassifierError::InvalidInput(
                "labels must be 0 or 1".to_string(),
            ));
        }
        Ok(Self { images, labels })
    }

    pub fn len(&self) -> usize {
        self.images.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that can produce a raw split of the dataset.
pub trait DatasetSource {
    fn load(&self, split: Split) -> Result<RawDataset>;
}

/// Dataset stored as class sub-folders of images per split.
#[derive(Debug, Clone)]
pub struct ImageFolderDataset {
    root: PathBuf,
    config: ImageConfig,
}

impl ImageFolderDataset {
    pub fn new<P: AsRef<Path>>(root: P, config: ImageConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    pub fn split_dir(&self, split: Split) -> PathBuf {
        self.root.join(split.dir_name())
    }
}

impl DatasetSource for ImageFolderDataset {
    fn load(&self, split: Split) -> Result<RawDataset> {
        let split_dir = self.split_dir(split);
        if !split_dir.is_dir() {
            log::error!("Dataset split folder not found: {}", split_dir.display());
            return Err(ClassifierError::NotFound(split_dir));
        }

        let size = self.config.size();
        let positive = load_image_batch(&split_dir.join(&self.config.positive_class), size)?;
        let negative = load_image_batch(&split_dir.join(&self.config.negative_class), size)?;
        let (images, labels) = stack_classes(&positive, &negative)?;

        log::info!(
            "{} dataset loaded: {} samples ({} {}, {} {})",
            split,
            images.len_of(Axis(0)),
            positive.len_of(Axis(0)),
            self.config.positive_class,
            negative.len_of(Axis(0)),
            self.config.negative_class
        );
        RawDataset::new(images, labels)
    }
}
