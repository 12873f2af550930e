use crate::artifact::{rename_for_format, ImageArtifact};
use crate::codec;
use crate::error::{MinikyuError, Result};
use crate::formats::OutputFormat;

/// Re-encode `image` as `target`, producing the final artifact.
///
/// Quality (1..=100) applies to lossy targets only. Conversion always
/// re-encodes, even when `target` equals the source format. If the encoder
/// refuses or yields no bytes the call fails with `ConversionUnsupported`.
/// The output name is the source name with `target`'s extension.
pub fn convert(image: &ImageArtifact, target: OutputFormat, quality: u8) -> Result<ImageArtifact> {
    let decoded = codec::decode(image.bytes())?;

    let quality = if target.is_lossy() { Some(quality) } else { None };
    let bytes = match codec::encode(&decoded, target, quality) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => return Err(MinikyuError::ConversionUnsupported(target)),
        Err(e) => {
            crate::verbose!("{} encoder rejected {}: {}", target, image.name(), e);
            return Err(MinikyuError::ConversionUnsupported(target));
        }
    };

    Ok(ImageArtifact::new(
        bytes,
        target,
        rename_for_format(image.name(), target),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::detect_format;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    fn png_source(name: &str) -> ImageArtifact {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(24, 16, |x, y| {
            Rgb([(x * 10) as u8, (y * 15) as u8, 128])
        }));
        let bytes = codec::encode(&img, OutputFormat::Png, None).unwrap();
        ImageArtifact::new(bytes, OutputFormat::Png, name)
    }

    #[test]
    fn test_convert_png_to_jpeg() {
        let out = convert(&png_source("shot.png"), OutputFormat::Jpeg, 80).unwrap();

        assert_eq!(out.format(), OutputFormat::Jpeg);
        assert_eq!(out.mime_type(), "image/jpeg");
        assert_eq!(out.name(), "shot.jpg");
        assert_eq!(detect_format(out.bytes()), Some(OutputFormat::Jpeg));
        assert_eq!(codec::decode(out.bytes()).unwrap().dimensions(), (24, 16));
    }

    #[test]
    fn test_convert_to_png_ignores_quality() {
        let source = png_source("shot.jpeg");
        let low = convert(&source, OutputFormat::Png, 1).unwrap();
        let high = convert(&source, OutputFormat::Png, 100).unwrap();

        assert_eq!(low.name(), "shot.png");
        assert_eq!(low.bytes(), high.bytes());
    }

    #[test]
    fn test_convert_same_format_still_decodable() {
        let source = png_source("same.png");
        let out = convert(&source, OutputFormat::Png, 80).unwrap();

        assert_eq!(out.name(), "same.png");
        assert_eq!(detect_format(out.bytes()), Some(OutputFormat::Png));
        assert_eq!(codec::decode(out.bytes()).unwrap().dimensions(), (24, 16));
    }

    #[test]
    fn test_convert_same_format_roundtrip_for_lossy_formats() {
        for format in [OutputFormat::Jpeg, OutputFormat::WebP, OutputFormat::Avif] {
            let source = convert(&png_source("same.png"), format, 90).unwrap();
            let out = convert(&source, format, 70).unwrap();

            assert_eq!(out.format(), format);
            assert_eq!(out.name(), format!("same.{}", format.extension()));
            assert_eq!(detect_format(out.bytes()), Some(format));
            assert_eq!(
                codec::decode(out.bytes()).unwrap().dimensions(),
                (24, 16),
                "{} did not survive a same-format conversion",
                format
            );
        }
    }

    #[test]
    fn test_convert_avif_source_to_jpeg() {
        let avif = convert(&png_source("night.png"), OutputFormat::Avif, 80).unwrap();
        let out = convert(&avif, OutputFormat::Jpeg, 80).unwrap();

        assert_eq!(out.name(), "night.jpg");
        assert_eq!(codec::decode(out.bytes()).unwrap().dimensions(), (24, 16));
    }

    #[test]
    fn test_convert_to_webp_and_avif() {
        let source = png_source("multi.png");

        let webp = convert(&source, OutputFormat::WebP, 70).unwrap();
        assert_eq!(webp.name(), "multi.webp");
        assert_eq!(detect_format(webp.bytes()), Some(OutputFormat::WebP));

        let avif = convert(&source, OutputFormat::Avif, 70).unwrap();
        assert_eq!(avif.name(), "multi.avif");
        assert_eq!(avif.mime_type(), "image/avif");
        assert_eq!(detect_format(avif.bytes()), Some(OutputFormat::Avif));
    }

    #[test]
    fn test_convert_undecodable_source() {
        let garbage = ImageArtifact::new(b"xx".to_vec(), OutputFormat::Png, "bad.png");
        assert!(matches!(
            convert(&garbage, OutputFormat::Jpeg, 80),
            Err(MinikyuError::Decode(_))
        ));
    }
}
