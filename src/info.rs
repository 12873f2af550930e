use crate::artifact::ImageArtifact;
use crate::dimensions::Dimensions;
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::ingest::load_artifact;
use crate::utils::format_file_size;
use std::path::Path;

/// What `info` reports about one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub name: String,
    pub format: OutputFormat,
    pub size: u64,
    pub dimensions: Dimensions,
}

impl ImageReport {
    pub fn from_artifact(artifact: &ImageArtifact) -> Result<Self> {
        Ok(Self {
            name: artifact.name().to_string(),
            format: artifact.format(),
            size: artifact.size(),
            dimensions: artifact.dimensions()?,
        })
    }

    pub fn megapixels(&self) -> f64 {
        self.dimensions.pixel_count() as f64 / 1_000_000.0
    }

    /// Quality range worth trying, based on file size.
    pub fn suggested_quality(&self) -> (u8, u8) {
        if self.size > 5 * 1024 * 1024 {
            (60, 80)
        } else if self.size > 1024 * 1024 {
            (70, 85)
        } else {
            (85, 95)
        }
    }

    /// Width for a `--width` suggestion, if the image is larger than HD.
    pub fn suggested_width(&self) -> Option<u32> {
        let (w, h) = (self.dimensions.width(), self.dimensions.height());
        if w > 1920 || h > 1080 {
            Some(1920)
        } else if w > 1280 || h > 720 {
            Some(1280)
        } else {
            None
        }
    }

    pub fn format_hint(&self) -> &'static str {
        match self.format {
            OutputFormat::Png => "PNG is lossless; compressing runs oxipng, converting to WebP or AVIF usually shrinks photos",
            OutputFormat::Jpeg => "JPEG: lower the quality setting to trade detail for size",
            OutputFormat::WebP => "WebP: already compact, adjust quality if needed",
            OutputFormat::Avif => "AVIF: already compact, further passes rarely help",
        }
    }

    pub fn print(&self) {
        println!("📋 Basic Information:");
        println!("  📁 File: {}", self.name);
        println!("  🎭 Format: {} ({})", self.format, self.format.mime_type());
        println!("  📏 Dimensions: {} pixels", self.dimensions);
        println!("  📦 File size: {} ({} bytes)", format_file_size(self.size), self.size);
        println!("  🔢 Megapixels: {:.2} MP", self.megapixels());
        println!("  📐 Aspect ratio: {:.2}:1", self.dimensions.aspect_ratio());

        let (low, high) = self.suggested_quality();
        println!("\n💡 Suggestions:");
        println!("  🎯 Try quality {}-{}", low, high);
        if let Some(width) = self.suggested_width() {
            println!("  📏 Consider --width {} for web use", width);
        }
        println!("  🎭 {}", self.format_hint());
    }
}

pub fn show_image_info(path: &Path) -> Result<ImageReport> {
    crate::verbose!("Analyzing image: {}", path.display());
    let artifact = load_artifact(path)?;
    let report = ImageReport::from_artifact(&artifact)?;
    report.print();
    Ok(report)
}
