pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Upper bound enforced at ingestion, before anything reaches the pipeline (20 MiB).
pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Largest resize target accepted, in pixels (at 4 bytes each, 400 MB).
pub const MAX_PIXELS: u64 = 100_000_000;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

/// rav1e speed preset, 1 (slowest) to 10 (fastest).
pub const AVIF_ENCODER_SPEED: u8 = 6;

/// Appended to the base name of every pipeline output.
pub const OUTPUT_NAME_SUFFIX: &str = "-minikyu";
pub const DEFAULT_EXPORT_DIR: &str = "minikyu-images";

pub const HIGH_SAVINGS_PERCENT: i64 = 50;
pub const MEDIUM_SAVINGS_PERCENT: i64 = 20;

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif"];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
