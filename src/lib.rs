pub mod artifact;
pub mod batch;
pub mod cli;
pub mod codec;
pub mod compress;
pub mod constants;
pub mod convert;
pub mod dimensions;
pub mod error;
pub mod export;
pub mod formats;
pub mod info;
pub mod ingest;
pub mod logger;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use artifact::ImageArtifact;
pub use batch::{Batch, BatchItem, BatchSummary, ItemId, ItemStatus};
pub use compress::{compress, CompressionResult, SavingsTier};
pub use convert::convert;
pub use dimensions::{resolve, Dimensions, ResizeSpec};
pub use error::{MinikyuError, Result};
pub use export::{ArchiveEntry, ArchiveWriter, DirectoryArchive};
pub use formats::{check_format_support, detect_format, OutputFormat};
pub use ingest::{collect_image_files, load_artifact};
pub use pipeline::{Pipeline, ProcessedImage, ProcessingRequest, Stage, StageContext};
pub use transform::resize;
