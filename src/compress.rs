use crate::artifact::ImageArtifact;
use crate::codec;
use crate::constants::{
    HIGH_SAVINGS_PERCENT, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_QUALITY,
    MEDIUM_SAVINGS_PERCENT, MIN_QUALITY, OXIPNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::{MinikyuError, Result};
use crate::formats::OutputFormat;
use oxipng::{Deflaters, Options};
use std::num::NonZeroU8;

/// Outcome of a compression pass.
///
/// A result whose `compressed_size` is not smaller than `original_size` is
/// still a success: "no savings" is distinct from a failed compression.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub artifact: ImageArtifact,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl CompressionResult {
    pub fn savings_percent(&self) -> i64 {
        savings_percent(self.original_size, self.compressed_size)
    }

    pub fn savings_tier(&self) -> SavingsTier {
        SavingsTier::from_percent(self.savings_percent())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsTier {
    High,
    Medium,
    Low,
}

impl SavingsTier {
    pub fn from_percent(percent: i64) -> Self {
        if percent >= HIGH_SAVINGS_PERCENT {
            SavingsTier::High
        } else if percent >= MEDIUM_SAVINGS_PERCENT {
            SavingsTier::Medium
        } else {
            SavingsTier::Low
        }
    }
}

/// Rounded percentage saved going from `original` to `compressed` bytes.
/// Negative when the output grew, 0 for an empty original.
pub fn savings_percent(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let ratio = (original as f64 - compressed as f64) / original as f64;
    (ratio * 100.0).round() as i64
}

/// Re-encode `image` in its own format at `quality` (1..=100).
///
/// Pixel dimensions and format are preserved. The input artifact is left
/// untouched. An undecodable source is a `Decode` error, never a silent
/// pass-through of the original bytes.
pub fn compress(image: &ImageArtifact, quality: u8) -> Result<CompressionResult> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(MinikyuError::invalid_quality(quality));
    }

    let decoded = codec::decode(image.bytes())?;

    let bytes = match image.format() {
        OutputFormat::Png => optimize_png(image.bytes(), quality)?,
        format => codec::encode(&decoded, format, Some(quality))?,
    };

    let artifact = ImageArtifact::new(bytes, image.format(), image.name());
    Ok(CompressionResult {
        original_size: image.size(),
        compressed_size: artifact.size(),
        artifact,
    })
}

/// Lossless PNG recompression; quality picks how hard the deflater works.
fn optimize_png(png: &[u8], quality: u8) -> Result<Vec<u8>> {
    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.force = true;
    options.deflate = png_deflater(quality);

    let optimized = oxipng::optimize_from_memory(png, &options)
        .map_err(|e| MinikyuError::PngOptimization(e.to_string()))?;

    if optimized.is_empty() {
        return Err(MinikyuError::Encode(
            "PNG optimizer produced no data".to_string(),
        ));
    }
    Ok(optimized)
}

fn png_deflater(quality: u8) -> Deflaters {
    if quality >= 90 {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= 70 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    }
}
