/// Target size resolution
///
/// Reconciles user supplied width/height/scale against the source's native
/// size. All rounding is half away from zero (`f64::round`), and a resolved
/// axis is never smaller than one pixel.
use crate::error::{MinikyuError, Result};
use std::fmt;

/// Pixel size of an image. Both axes are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MinikyuError::Validation(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Both axes multiplied by `percent / 100`.
    pub fn scaled(&self, percent: f64) -> Self {
        let factor = percent / 100.0;
        Self {
            width: round_to_pixels(f64::from(self.width) * factor),
            height: round_to_pixels(f64::from(self.height) * factor),
        }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Partial size request. A `None` or zero axis means "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResizeSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lock_aspect: bool,
    /// Percentage of the original size; ignored unless > 0.
    pub scale: Option<f64>,
}

impl ResizeSpec {
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn height(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn scale(percent: f64) -> Self {
        Self {
            scale: Some(percent),
            ..Self::default()
        }
    }

    pub fn locked(mut self) -> Self {
        self.lock_aspect = true;
        self
    }
}

/// Compute the target size for `original` under `spec`.
///
/// Precedence: a positive `scale` wins outright; otherwise with the aspect
/// locked the given width (or, failing that, height) drives the other axis;
/// otherwise each axis falls back to the original independently.
pub fn resolve(original: Dimensions, spec: &ResizeSpec) -> Dimensions {
    if let Some(scale) = spec.scale.filter(|s| s.is_finite() && *s > 0.0) {
        return original.scaled(scale);
    }

    let width = spec.width.filter(|&w| w > 0);
    let height = spec.height.filter(|&h| h > 0);

    if spec.lock_aspect {
        let aspect = original.aspect_ratio();
        match (width, height) {
            // width wins when both are given; height is advisory under lock
            (Some(w), _) => {
                return Dimensions {
                    width: w,
                    height: round_to_pixels(f64::from(w) / aspect),
                };
            }
            (None, Some(h)) => {
                return Dimensions {
                    width: round_to_pixels(f64::from(h) * aspect),
                    height: h,
                };
            }
            (None, None) => {}
        }
    }

    Dimensions {
        width: width.unwrap_or(original.width),
        height: height.unwrap_or(original.height),
    }
}

fn round_to_pixels(value: f64) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() || rounded < 1.0 {
        1
    } else if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
