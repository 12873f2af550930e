#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use minikyu::codec;
use minikyu::{ImageArtifact, OutputFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// A small gradient, so encoders have something non-trivial to chew on.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    }))
}

pub fn encoded(width: u32, height: u32, format: OutputFormat) -> Vec<u8> {
    codec::encode(&gradient(width, height), format, Some(90)).unwrap()
}

pub fn artifact(name: &str, width: u32, height: u32, format: OutputFormat) -> ImageArtifact {
    ImageArtifact::new(encoded(width, height, format), format, name)
}

pub fn broken_artifact(name: &str) -> ImageArtifact {
    ImageArtifact::new(b"definitely not an image".to_vec(), OutputFormat::Png, name)
}

/// Write a real encoded image to `dir/name`.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: OutputFormat) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, encoded(width, height, format)).unwrap();
    path
}
