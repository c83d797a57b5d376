#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

/// Write a solid-colour RGB image; the format follows the file extension.
pub fn write_solid_image(path: &Path, size: (u32, u32), rgb: [u8; 3]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(size.0, size.1, Rgb(rgb)).save(path).unwrap();
    path.to_path_buf()
}

/// Write a horizontal gradient so resizing actually mixes neighbouring pixels.
pub fn write_gradient_image(path: &Path, size: (u32, u32)) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(size.0, size.1, |x, y| {
        Rgb([(x * 255 / size.0.max(1)) as u8, (y * 255 / size.1.max(1)) as u8, 128])
    });
    img.save(path).unwrap();
    path.to_path_buf()
}

/// Build `<root>/<split>/{positive,negative}` folders of bright and dark images.
pub fn write_split(root: &Path, split: &str, n_pos: usize, n_neg: usize) {
    for i in 0..n_pos {
        let shade = 220 + (i as u8 % 3) * 10;
        write_solid_image(
            &root.join(split).join("positive").join(format!("pos_{}.png", i)),
            (8, 8),
            [shade, shade, shade],
        );
    }
    for i in 0..n_neg {
        let shade = 10 + (i as u8 % 3) * 10;
        write_solid_image(
            &root.join(split).join("negative").join(format!("neg_{}.png", i)),
            (8, 8),
            [shade, shade, shade],
        );
    }
}
