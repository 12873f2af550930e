use crate::artifact::ImageArtifact;
use crate::codec;
use crate::constants::MAX_PIXELS;
use crate::dimensions::Dimensions;
use crate::error::{MinikyuError, Result};
use crate::formats::OutputFormat;
use image::imageops::FilterType;

/// Stretch `image` to exactly `target` and re-encode it losslessly as PNG.
///
/// No cropping or letterboxing: aspect distortion is decided upstream by the
/// dimension resolver. The re-encode happens even when `target` already
/// matches the source size, so every output passes through the same
/// normalized pixel data before format conversion.
///
/// Targets above `MAX_PIXELS` are refused with `Encode` before any pixel
/// buffer is allocated.
pub fn resize(image: &ImageArtifact, target: Dimensions) -> Result<ImageArtifact> {
    if target.pixel_count() > MAX_PIXELS {
        return Err(MinikyuError::Encode(format!(
            "target {} exceeds the {} pixel limit",
            target, MAX_PIXELS
        )));
    }

    let decoded = codec::decode(image.bytes())?;

    let resized = decoded.resize_exact(target.width(), target.height(), FilterType::Lanczos3);
    if resized.width() != target.width() || resized.height() != target.height() {
        return Err(MinikyuError::Encode(format!(
            "resize produced {}x{}, expected {}",
            resized.width(),
            resized.height(),
            target
        )));
    }

    let bytes = codec::encode(&resized, OutputFormat::Png, None)?;
    Ok(ImageArtifact::new(bytes, OutputFormat::Png, image.name()))
}
