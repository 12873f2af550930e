//! Decode/encode backend shared by the compressor, transformer and converter.

use crate::constants::{AVIF_ENCODER_SPEED, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use crate::error::{MinikyuError, Result};
use crate::formats::{detect_format, OutputFormat};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Decode encoded bytes into a pixel buffer.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(MinikyuError::Decode("empty input".to_string()));
    }
    let decoded = match detect_format(bytes) {
        Some(format) => image::load_from_memory_with_format(bytes, format.to_image_format()),
        None => image::load_from_memory(bytes),
    };
    decoded.map_err(|e| MinikyuError::Decode(e.to_string()))
}

/// Read width and height from the encoded header without a full decode
/// where the format allows it. `declared` is used when the bytes carry no
/// recognizable signature.
pub fn read_dimensions(bytes: &[u8], declared: OutputFormat) -> Result<(u32, u32)> {
    if bytes.is_empty() {
        return Err(MinikyuError::Decode("empty input".to_string()));
    }
    let format = detect_format(bytes).unwrap_or(declared);
    ImageReader::with_format(Cursor::new(bytes), format.to_image_format())
        .into_dimensions()
        .map_err(|e| MinikyuError::Decode(e.to_string()))
}

/// Encode `img` as `format`.
///
/// `quality` is 1..=100 and is ignored for PNG. `None` uses the default
/// quality for lossy formats. A zero-length result is reported as an error.
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: Option<u8>) -> Result<Vec<u8>> {
    let quality = quality
        .unwrap_or(DEFAULT_QUALITY)
        .clamp(MIN_QUALITY, MAX_QUALITY);
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
            encoder
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| MinikyuError::Encode(format!("JPEG: {}", e)))?;
        }
        OutputFormat::Png => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let encoder = PngEncoder::new_with_quality(
                Cursor::new(&mut buffer),
                CompressionType::Default,
                FilterType::Adaptive,
            );
            encoder
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| MinikyuError::Encode(format!("PNG: {}", e)))?;
        }
        OutputFormat::WebP => {
            // The pure-Rust WebP encoder only writes lossless bitstreams, so
            // lossy quality is applied by quantizing the colour channels first.
            let mut rgba = img.to_rgba8();
            if quality < MAX_QUALITY {
                quantize_rgb(&mut rgba, quality);
            }
            let (width, height) = rgba.dimensions();
            let encoder = WebPEncoder::new_lossless(Cursor::new(&mut buffer));
            encoder
                .encode(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| MinikyuError::Encode(format!("WebP: {}", e)))?;
        }
        OutputFormat::Avif => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let encoder = AvifEncoder::new_with_speed_quality(
                Cursor::new(&mut buffer),
                AVIF_ENCODER_SPEED,
                quality,
            );
            encoder
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| MinikyuError::Encode(format!("AVIF: {}", e)))?;
        }
    }

    if buffer.is_empty() {
        return Err(MinikyuError::Encode(format!(
            "{} encoder produced no data",
            format
        )));
    }

    Ok(buffer)
}

/// Posterize RGB channels; lower quality means fewer levels per channel.
/// Alpha is left untouched.
fn quantize_rgb(pixels: &mut [u8], quality: u8) {
    // quality 1 keeps 2 levels per channel, quality 99 keeps 128
    let levels = 2u32 + (u32::from(quality.saturating_sub(1)) * 126) / 98;
    let step = (256 / levels).max(1);
    if step <= 1 {
        return;
    }

    for pixel in pixels.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            let bucket = u32::from(*channel) / step;
            let centre = bucket * step + step / 2;
            *channel = centre.min(255) as u8;
        }
    }
}
