//! Deterministic image preprocessing shared by training and inference.
//!
//! Every path into the model goes through the same steps: decode, force RGB,
//! resize to a fixed target with a fixed filter, scale intensities to
//! `[0, 1]`, then flatten each sample into one column of a
//! `(features, samples)` matrix. Training and serving must agree on all of
//! them, so the helpers here are the only place those steps live.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use ndarray::{concatenate, Array, Array2, Array3, Array4, ArrayBase, Axis, Data, Dimension};
use rayon::prelude::*;

use crate::error::{ClassifierError, Result};

/// Resize target (width, height) used when none is configured.
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (64, 64);

/// File name suffixes picked up when scanning an image folder.
pub const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

const CHANNELS: usize = 3;
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Scale raw `[0, 255]` intensities to `f32` in `[0, 1]`.
///
/// Works on a single `(H, W, C)` image or a `(N, H, W, C)` batch alike.
pub fn normalize<S, D>(raw: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = u8>,
    D: Dimension,
{
    raw.mapv(|v| v as f32 / 255.0)
}

/// Flatten every sample of a `(N, H, W, C)` batch into one column, giving a
/// `(H * W * C, N)` matrix. Pixels are laid out row-major (H, then W, then C).
pub fn flatten_samples<A: Clone>(x: &Array4<A>) -> Result<Array2<A>> {
    let (n, h, w, c) = x.dim();
    let features = h * w * c;
    let rows = x
        .as_standard_layout()
        .into_owned()
        .into_shape((n, features))
        .map_err(|e| ClassifierError::InvalidInput(format!("cannot flatten batch: {}", e)))?;
    Ok(rows.reversed_axes().as_standard_layout().into_owned())
}

/// Normalize then flatten a raw batch into a feature matrix.
pub fn preprocess(raw: &Array4<u8>) -> Result<Array2<f32>> {
    let x = flatten_samples(&normalize(raw))?;
    log::debug!(
        "Preprocessed {} samples into {} features",
        x.ncols(),
        x.nrows()
    );
    Ok(x)
}

/// Preprocess one `(H, W, C)` image into a `(H * W * C, 1)` column.
pub fn preprocess_single(raw: &Array3<u8>) -> Result<Array2<f32>> {
    let batch = raw.view().insert_axis(Axis(0));
    flatten_samples(&normalize(&batch))
}

fn check_target_size(size: (u32, u32)) -> Result<()> {
    if size.0 == 0 || size.1 == 0 {
        return Err(ClassifierError::InvalidInput(format!(
            "target size must be non-zero, got {}x{}",
            size.0, size.1
        )));
    }
    Ok(())
}

/// Length of the flattened RGB feature column for a `size` image.
pub fn feature_count_for(size: (u32, u32)) -> Result<usize> {
    (size.0 as usize)
        .checked_mul(size.1 as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or_else(|| {
            ClassifierError::InvalidInput(format!(
                "image size {}x{} is too large",
                size.0, size.1
            ))
        })
}

fn resize_rgb(img: DynamicImage, size: (u32, u32)) -> RgbImage {
    img.resize_exact(size.0, size.1, RESIZE_FILTER).to_rgb8()
}

/// Decode the image at `path` and resize it to exactly `size` (width, height).
pub fn resize_image(path: &Path, size: (u32, u32)) -> Result<RgbImage> {
    check_target_size(size)?;
    if !path.exists() {
        log::error!("Image file not found: {}", path.display());
        return Err(ClassifierError::NotFound(path.to_path_buf()));
    }
    // Format comes from the file content, not its extension.
    let img = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| ClassifierError::from_io(e, path))?
        .decode()
        .map_err(|e| {
            ClassifierError::InvalidInput(format!("failed to decode {}: {}", path.display(), e))
        })?;
    log::trace!("Image {} resized to {}x{}", path.display(), size.0, size.1);
    Ok(resize_rgb(img, size))
}

/// Copy an RGB image into an `(H, W, 3)` array.
pub fn image_to_array(img: &RgbImage) -> Array3<u8> {
    let (width, height) = img.dimensions();
    Array3::from_shape_fn(
        (height as usize, width as usize, CHANNELS),
        |(y, x, c)| img.get_pixel(x as u32, y as u32)[c],
    )
}

/// Decode, resize and normalize a single image file.
pub fn resize_and_normalize(path: &Path, size: (u32, u32)) -> Result<Array3<f32>> {
    let img = resize_image(path, size)?;
    Ok(normalize(&image_to_array(&img)))
}

/// Same as [`resize_and_normalize`] for an encoded image held in memory.
pub fn resize_and_normalize_bytes(bytes: &[u8], size: (u32, u32)) -> Result<Array3<f32>> {
    check_target_size(size)?;
    let img = image::load_from_memory(bytes)
        .map_err(|e| ClassifierError::InvalidInput(format!("failed to decode image bytes: {}", e)))?;
    Ok(normalize(&image_to_array(&resize_rgb(img, size))))
}

/// Turn a flat slice of raw intensities (row-major H, W, C) into a
/// `(H * W * 3, 1)` feature column.
pub fn normalize_pixels(values: &[f32], size: (u32, u32)) -> Result<Array2<f32>> {
    check_target_size(size)?;
    let expected = feature_count_for(size)?;
    if values.len() != expected {
        return Err(ClassifierError::InvalidInput(format!(
            "expected {} pixel values for a {}x{} RGB image, got {}",
            expected,
            size.0,
            size.1,
            values.len()
        )));
    }
    if let Some(bad) = values
        .iter()
        .find(|v| !v.is_finite() || **v < 0.0 || **v > 255.0)
    {
        return Err(ClassifierError::InvalidInput(format!(
            "pixel value {} outside [0, 255]",
            bad
        )));
    }
    let column = values.iter().map(|v| v / 255.0).collect();
    Array2::from_shape_vec((expected, 1), column)
        .map_err(|e| ClassifierError::InvalidInput(e.to_string()))
}

fn has_image_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .unwrap_or(false)
}

/// List the image files of `dir` in file-name order.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        log::error!("Image folder not found: {}", dir.display());
        return Err(ClassifierError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ClassifierError::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ClassifierError::from_io(e, dir))? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            paths.push(path);
        } else {
            log::trace!("Skipping {}", path.display());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Decode and resize every image in `dir` into a raw `(N, H, W, 3)` batch.
///
/// Files are read in file-name order. Files without an image extension are
/// skipped; a matching file that fails to decode aborts the whole batch.
pub fn load_image_batch(dir: &Path, size: (u32, u32)) -> Result<Array4<u8>> {
    check_target_size(size)?;
    let paths = list_image_files(dir)?;

    let images = paths
        .par_iter()
        .map(|path| resize_image(path, size).map(|img| image_to_array(&img)))
        .collect::<Result<Vec<Array3<u8>>>>()?;

    let (width, height) = size;
    let mut batch = Array4::<u8>::zeros((images.len(), height as usize, width as usize, CHANNELS));
    for (i, img) in images.iter().enumerate() {
        batch.index_axis_mut(Axis(0), i).assign(img);
    }
    log::info!("Processed {} images from {}", images.len(), dir.display());
    Ok(batch)
}

/// Decode, resize and normalize every image in `dir`.
pub fn process_images(dir: &Path, size: (u32, u32)) -> Result<Array4<f32>> {
    Ok(normalize(&load_image_batch(dir, size)?))
}

/// Concatenate a positive and a negative batch, positives first, and build
/// the matching `(1, N)` label row (1 for positive, 0 for negative).
pub fn stack_classes(positive: &Array4<u8>, negative: &Array4<u8>) -> Result<(Array4<u8>, Array2<u8>)> {
    let n_pos = positive.len_of(Axis(0));
    let n_neg = negative.len_of(Axis(0));
    if n_pos + n_neg == 0 {
        return Err(ClassifierError::InvalidInput(
            "dataset contains no images".to_string(),
        ));
    }
    let images = concatenate(Axis(0), &[positive.view(), negative.view()])
        .map_err(|_| ClassifierError::shape_mismatch(positive.shape(), negative.shape()))?;
    let labels = Array2::from_shape_fn((1, n_pos + n_neg), |(_, j)| u8::from(j < n_pos));
    Ok((images, labels))
}

/// Build a feature matrix and label row from a folder of positive-class
/// images and a folder of negative-class images.
pub fn prepare_custom_dataset(
    positive_dir: &Path,
    negative_dir: &Path,
    size: (u32, u32),
) -> Result<(Array2<f32>, Array2<u8>)> {
    let positive = load_image_batch(positive_dir, size)?;
    let negative = load_image_batch(negative_dir, size)?;
    let (images, labels) = stack_classes(&positive, &negative)?;
    let x = preprocess(&images)?;
    log::info!(
        "Custom dataset prepared: {} positive, {} negative samples",
        positive.len_of(Axis(0)),
        negative.len_of(Axis(0))
    );
    Ok((x, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn normalize_maps_into_unit_interval() {
        let raw = array![[0u8, 51, 255]];
        let x = normalize(&raw);
        assert_eq!(x, array![[0.0f32, 0.2, 1.0]]);
    }

    #[test]
    fn flatten_puts_one_sample_per_column() {
        // two 1x2 RGB images
        let raw = Array4::from_shape_vec(
            (2, 1, 2, 3),
            vec![1u8, 2, 3, 4, 5, 6, 10, 20, 30, 40, 50, 60],
        )
        .unwrap();
        let flat = flatten_samples(&raw).unwrap();
        assert_eq!(flat.dim(), (6, 2));
        assert_eq!(flat.column(0).to_vec(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(flat.column(1).to_vec(), vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn preprocess_single_matches_batch_path() {
        let img = Array3::from_shape_fn((2, 2, 3), |(y, x, c)| (y * 60 + x * 20 + c) as u8);
        let single = preprocess_single(&img).unwrap();
        let batch = preprocess(&img.clone().insert_axis(Axis(0))).unwrap();
        assert_eq!(single, batch);
        assert_eq!(single.dim(), (12, 1));
    }

    #[test]
    fn normalize_pixels_checks_length_and_range() {
        let ok = normalize_pixels(&[0.0, 127.5, 255.0], (1, 1)).unwrap();
        assert_eq!(ok.column(0).to_owned(), Array1::from(vec![0.0f32, 0.5, 1.0]));

        assert!(matches!(
            normalize_pixels(&[0.0, 1.0], (1, 1)),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(matches!(
            normalize_pixels(&[0.0, 1.0, 256.0], (1, 1)),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(matches!(
            normalize_pixels(&[0.0, f32::NAN, 1.0], (1, 1)),
            Err(ClassifierError::InvalidInput(_))
        ));
    }

    #[test]
    fn oversized_target_does_not_overflow() {
        assert_eq!(feature_count_for((64, 64)).unwrap(), 64 * 64 * 3);
        assert!(matches!(
            feature_count_for((u32::MAX, u32::MAX)),
            Err(ClassifierError::InvalidInput(_))
        ));
        assert!(matches!(
            normalize_pixels(&[0.0; 3], (u32::MAX, u32::MAX)),
            Err(ClassifierError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_target_size_is_rejected() {
        assert!(matches!(
            resize_and_normalize_bytes(&[], (0, 64)),
            Err(ClassifierError::InvalidInput(_))
        ));
    }

    #[test]
    fn extension_filter_is_suffix_based() {
        assert!(has_image_extension(Path::new("cat.jpg")));
        assert!(has_image_extension(Path::new("dir/cat.jpeg")));
        assert!(has_image_extension(Path::new("cat.png")));
        assert!(!has_image_extension(Path::new("cat.gif")));
        assert!(!has_image_extension(Path::new("notes.txt")));
    }

    #[test]
    fn stack_classes_labels_positives_first() {
        let pos = Array4::<u8>::zeros((3, 1, 1, 3));
        let neg = Array4::<u8>::ones((2, 1, 1, 3));
        let (images, labels) = stack_classes(&pos, &neg).unwrap();
        assert_eq!(images.len_of(Axis(0)), 5);
        assert_eq!(labels, array![[1u8, 1, 1, 0, 0]]);
        assert_eq!(images[[4, 0, 0, 0]], 1);
    }

    #[test]
    fn stack_classes_rejects_empty_dataset() {
        let empty = Array4::<u8>::zeros((0, 1, 1, 3));
        assert!(matches!(
            stack_classes(&empty, &empty),
            Err(ClassifierError::InvalidInput(_))
        ));
    }
}
