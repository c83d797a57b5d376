#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

/// Build `<root>/<split>/{positive,negative}` folders of bright and dark PNGs.
pub fn write_split(root: &Path, split: &str, n_pos: usize, n_neg: usize) {
    for (class, count, base) in [("positive", n_pos, 220u8), ("negative", n_neg, 15u8)] {
        let dir = root.join(split).join(class);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..count {
            let shade = base + (i as u8 % 3) * 8;
            RgbImage::from_pixel(8, 8, Rgb([shade, shade, shade]))
                .save(dir.join(format!("{}_{}.png", class, i)))
                .unwrap();
        }
    }
}

pub fn write_dataset(root: &Path) {
    write_split(root, "train", 6, 6);
    write_split(root, "test", 3, 3);
}
