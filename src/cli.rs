use crate::constants::DEFAULT_EXPORT_DIR;
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::pipeline::ProcessingRequest;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "minikyu",
    about = "Compress, resize and convert images in one pass",
    long_about = "minikyu runs every image through the same pipeline: compress in the source format, \
                  resize to the requested dimensions, then convert to the target format \
                  (JPEG, PNG, WebP or AVIF). Batches isolate failures per image.",
    version,
    after_help = "EXAMPLES:\n  \
    minikyu process photo.png -f webp -q 75 -w 1200\n  \
    minikyu batch ./photos ./out -r --scale 50 -j 4\n  \
    minikyu info photo.jpg\n  \
    minikyu formats"
)]
pub struct Args {
    #[arg(long, global = true, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Print per-stage details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by `process` and `batch`.
#[derive(ClapArgs, Debug, Clone)]
pub struct PipelineOptions {
    #[arg(
        short = 'q',
        long,
        help = "Quality (1-100, default: 80)",
        long_help = "Quality from 1 (smallest) to 100 (best). Ignored when the target is PNG. \
                     For PNG sources it also picks the oxipng deflater: >=90 Zopfli, >=70 strong libdeflate."
    )]
    pub quality: Option<u8>,

    #[arg(
        short = 'f',
        long,
        default_value = "jpeg",
        help = "Output format (jpeg, png, webp, avif)"
    )]
    pub format: String,

    #[arg(short = 'w', long, help = "Target width in pixels")]
    pub width: Option<u32>,

    #[arg(short = 'H', long, help = "Target height in pixels")]
    pub height: Option<u32>,

    #[arg(
        long,
        help = "Scale to a percentage of the original size",
        long_help = "Scale both axes to this percentage of the original. Overrides --width and --height."
    )]
    pub scale: Option<f64>,

    #[arg(
        long = "no-lock-aspect",
        action = ArgAction::SetFalse,
        help = "Resize width and height independently"
    )]
    pub lock_aspect: bool,
}

impl PipelineOptions {
    pub fn to_request(&self) -> Result<ProcessingRequest> {
        let format: OutputFormat = self.format.parse()?;
        ProcessingRequest::new(self.quality, format)?
            .with_width(self.width)
            .with_height(self.height)
            .with_lock_aspect(self.lock_aspect)
            .with_scale(self.scale)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Process a single image",
        long_about = "Compress, resize and convert one image. The result is written as \
                      <name>-minikyu.<ext> next to the input unless --output is given."
    )]
    Process {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(short = 'o', long, help = "Output file path")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: PipelineOptions,
    },

    #[command(
        about = "Process many images and export the results",
        long_about = "Process every image found in a directory, glob or file. Failed images are \
                      reported and skipped; the rest are written to the output directory."
    )]
    Batch {
        #[arg(
            help = "Input directory, file pattern, or glob",
            long_help = "Input can be a directory path, file pattern, or glob expression. \
                         Examples: './images', '*.jpg', '/path/to/images/*.png'"
        )]
        input: String,

        #[arg(default_value = DEFAULT_EXPORT_DIR, help = "Output directory path")]
        output: PathBuf,

        #[command(flatten)]
        options: PipelineOptions,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel workers (0 = one per CPU)",
            long_help = "Process this many images at once. Without this flag images run one at a time; \
                         0 uses one worker per CPU core."
        )]
        threads: Option<usize>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },

    #[command(about = "Display image information and suggestions")]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },

    #[command(about = "List output formats and whether this build can encode them")]
    Formats,
}

/// Worker count for `-j`: 0 means one per CPU.
pub fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        num_cpus::get()
    } else {
        threads
    }
}
