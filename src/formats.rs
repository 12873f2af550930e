/// Image format handling for pipeline inputs and outputs
///
/// Every artifact carries one of the four formats below. The MIME type and
/// canonical extension are fixed per format.
use crate::codec;
use crate::error::{MinikyuError, Result};
use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Baseline JPEG, lossy
    Jpeg,
    /// PNG, lossless
    Png,
    /// WebP
    WebP,
    /// AVIF (AV1 still image), lossy
    Avif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::WebP,
        OutputFormat::Avif,
    ];

    /// Canonical extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Avif => "image/avif",
        }
    }

    /// Whether the quality setting means anything for this format.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, OutputFormat::Png)
    }

    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Avif => ImageFormat::Avif,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::WebP => Some(OutputFormat::WebP),
            ImageFormat::Avif => Some(OutputFormat::Avif),
            _ => None,
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.mime_type().eq_ignore_ascii_case(mime.trim()))
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            "avif" => Some(OutputFormat::Avif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension)
    }

    /// Names accepted on the command line, one per format.
    pub fn format_names() -> Vec<&'static str> {
        vec!["jpeg", "png", "webp", "avif"]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Avif => "AVIF",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = MinikyuError;

    fn from_str(s: &str) -> Result<Self> {
        OutputFormat::from_extension(s.trim())
            .ok_or_else(|| {
                MinikyuError::UnsupportedFormat(format!(
                    "{} (expected one of: {})",
                    s,
                    OutputFormat::format_names().join(", ")
                ))
            })
    }
}

/// Sniff the encoded format from magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<OutputFormat> {
    // ISO-BMFF: "ftyp" box at offset 4 followed by the major brand
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && matches!(&bytes[8..12], b"avif" | b"avis")
    {
        return Some(OutputFormat::Avif);
    }

    image::guess_format(bytes)
        .ok()
        .and_then(OutputFormat::from_image_format)
}

/// Probe whether this build can produce `format`.
///
/// Encodes a 1x1 image; an encoder error or an empty result means the format
/// is unsupported. JPEG and PNG are always available.
pub fn check_format_support(format: OutputFormat) -> bool {
    if matches!(format, OutputFormat::Jpeg | OutputFormat::Png) {
        return true;
    }

    let probe = DynamicImage::new_rgba8(1, 1);
    codec::encode(&probe, format, Some(crate::constants::DEFAULT_QUALITY))
        .map(|bytes| !bytes.is_empty())
        .unwrap_or(false)
}

pub fn supported_formats() -> Vec<OutputFormat> {
    OutputFormat::ALL
        .into_iter()
        .filter(|format| check_format_support(*format))
        .collect()
}
