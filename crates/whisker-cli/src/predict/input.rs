use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::{Path, PathBuf};

use whisker_classifiers::preprocessing::list_image_files;

use crate::util::{validate_model_file, validate_tsv_or_csv_file};

#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub model_path: String,
    /// Image files to classify, folders already expanded.
    pub inputs: Vec<PathBuf>,
    /// `None` writes rows to stdout.
    pub output_file: Option<PathBuf>,
    /// `(width, height)`; inferred from the model when `None`.
    pub image_size: Option<(u32, u32)>,
}

impl PredictConfig {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let model_path = matches
            .get_one::<String>("model_path")
            .cloned()
            .unwrap_or_default();
        validate_model_file(&model_path)?;

        let raw_inputs: Vec<PathBuf> = matches
            .get_many::<PathBuf>("inputs")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let inputs = expand_inputs(&raw_inputs)?;
        if inputs.is_empty() {
            anyhow::bail!("No image files found in the given inputs");
        }

        let output_file = matches.get_one::<PathBuf>("output_file").cloned();
        if let Some(path) = &output_file {
            validate_tsv_or_csv_file(path)?;
        }

        let image_size = match (
            matches.get_one::<u32>("width"),
            matches.get_one::<u32>("height"),
        ) {
            (Some(&w), Some(&h)) => Some((w, h)),
            (Some(&side), None) | (None, Some(&side)) => Some((side, side)),
            (None, None) => None,
        };

        Ok(Self {
            model_path,
            inputs,
            output_file,
            image_size,
        })
    }
}

/// Replace every folder in `inputs` by the image files it contains.
///
/// Plain files are kept as given so that a mistyped extension still shows
/// up as a per-file failure rather than being silently dropped.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let listed = list_image_files(input)
                .with_context(|| format!("Failed to list images in {:?}", input))?;
            log::debug!("{} images found in {}", listed.len(), input.display());
            files.extend(listed);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input does not exist: {}", input.display());
        }
    }
    Ok(files)
}

/// Side length of a square RGB image with `feature_count` values.
pub fn infer_square_size(feature_count: usize, model_path: &Path) -> Result<(u32, u32)> {
    let pixels = feature_count / 3;
    let side = (pixels as f64).sqrt().round() as usize;
    if feature_count % 3 != 0 || side * side != pixels {
        anyhow::bail!(
            "Cannot infer a square image size from {} features in {}; pass --width and --height",
            feature_count,
            model_path.display()
        );
    }
    let side = u32::try_from(side).context("Image side does not fit in u32")?;
    Ok((side, side))
}
