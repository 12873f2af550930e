/// The per-image processing pipeline
///
/// compress -> resolve dimensions -> resize -> convert, expressed as an
/// ordered list of stages sharing one signature. Stages run strictly in
/// order; the first failure aborts the rest and no partial output escapes.
use crate::artifact::{strip_extension, ImageArtifact};
use crate::compress::compress;
use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY, OUTPUT_NAME_SUFFIX};
use crate::convert::convert;
use crate::dimensions::{resolve, Dimensions, ResizeSpec};
use crate::error::{MinikyuError, Result};
use crate::formats::OutputFormat;
use crate::transform::resize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingRequest {
    pub quality: u8,
    pub target_format: OutputFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lock_aspect: bool,
    pub scale: Option<f64>,
}

impl Default for ProcessingRequest {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            target_format: OutputFormat::Jpeg,
            width: None,
            height: None,
            lock_aspect: true,
            scale: None,
        }
    }
}

impl ProcessingRequest {
    pub fn new(quality: Option<u8>, target_format: OutputFormat) -> Result<Self> {
        let request = Self {
            quality: quality.unwrap_or(DEFAULT_QUALITY),
            target_format,
            ..Self::default()
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_width(mut self, width: Option<u32>) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: Option<u32>) -> Self {
        self.height = height;
        self
    }

    pub fn with_lock_aspect(mut self, lock_aspect: bool) -> Self {
        self.lock_aspect = lock_aspect;
        self
    }

    pub fn with_scale(mut self, scale: Option<f64>) -> Result<Self> {
        self.scale = scale;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(MinikyuError::invalid_quality(self.quality));
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(MinikyuError::Validation(format!(
                    "scale must be a positive percentage, got {}",
                    scale
                )));
            }
        }
        Ok(())
    }

    pub fn resize_spec(&self) -> ResizeSpec {
        ResizeSpec {
            width: self.width,
            height: self.height,
            lock_aspect: self.lock_aspect,
            scale: self.scale,
        }
    }
}

/// What every stage gets to see besides the artifact itself.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub request: &'a ProcessingRequest,
    /// Size of the source image before any stage ran.
    pub original: Dimensions,
}

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, artifact: ImageArtifact, ctx: &StageContext<'_>) -> Result<ImageArtifact>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompressStage;

impl Stage for CompressStage {
    fn name(&self) -> &'static str {
        "compress"
    }

    fn apply(&self, artifact: ImageArtifact, ctx: &StageContext<'_>) -> Result<ImageArtifact> {
        let result = compress(&artifact, ctx.request.quality)?;
        crate::verbose!(
            "{}: compressed {} -> {} bytes ({}%)",
            artifact.name(),
            result.original_size,
            result.compressed_size,
            result.savings_percent()
        );
        Ok(result.artifact)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResizeStage;

impl Stage for ResizeStage {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn apply(&self, artifact: ImageArtifact, ctx: &StageContext<'_>) -> Result<ImageArtifact> {
        let target = resolve(ctx.original, &ctx.request.resize_spec());
        crate::verbose!("{}: resizing {} -> {}", artifact.name(), ctx.original, target);
        resize(&artifact, target)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertStage;

impl Stage for ConvertStage {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn apply(&self, artifact: ImageArtifact, ctx: &StageContext<'_>) -> Result<ImageArtifact> {
        convert(&artifact, ctx.request.target_format, ctx.request.quality)
    }
}

/// Final artifact of one pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub artifact: ImageArtifact,
    pub original_size: u64,
    pub original_dimensions: Dimensions,
    /// Size of the final artifact as encoded.
    pub dimensions: Dimensions,
}

impl ProcessedImage {
    pub fn output_size(&self) -> u64 {
        self.artifact.size()
    }

    pub fn savings_percent(&self) -> i64 {
        crate::compress::savings_percent(self.original_size, self.output_size())
    }
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            cancel: None,
        }
    }

    /// compress -> resize -> convert
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(CompressStage),
            Box::new(ResizeStage),
            Box::new(ConvertStage),
        ])
    }

    /// Check `flag` between stages; once set, runs abort with `Cancelled`.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Run every stage over `source`. The result is renamed to
    /// `<base>-minikyu.<ext>`.
    pub fn process(
        &self,
        source: &ImageArtifact,
        request: &ProcessingRequest,
    ) -> Result<ProcessedImage> {
        request.validate()?;

        let original = source.dimensions()?;
        let ctx = StageContext { request, original };

        let mut current = source.clone();
        for stage in &self.stages {
            if self.is_cancelled() {
                return Err(MinikyuError::Cancelled);
            }
            current = stage.apply(current, &ctx)?;
        }

        let dimensions = current.dimensions()?;
        let name = output_name(source.name(), current.format());
        Ok(ProcessedImage {
            artifact: current.with_name(name),
            original_size: source.size(),
            original_dimensions: original,
            dimensions,
        })
    }
}

/// `<originalBaseName>-minikyu.<ext>`
pub fn output_name(source_name: &str, format: OutputFormat) -> String {
    format!(
        "{}{}.{}",
        strip_extension(source_name),
        OUTPUT_NAME_SUFFIX,
        format.extension()
    )
}
