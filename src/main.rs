use anyhow::Context;
use clap::Parser;
use minikyu::batch::{batch_progress_bar, Batch};
use minikyu::cli::{resolve_threads, Args, Commands, PipelineOptions};
use minikyu::export::{ArchiveWriter, DirectoryArchive};
use minikyu::formats::{check_format_support, OutputFormat};
use minikyu::info::show_image_info;
use minikyu::ingest::{collect_image_files, load_artifact};
use minikyu::logger::{self, Verbosity};
use minikyu::pipeline::Pipeline;
use minikyu::utils::{create_progress_spinner, print_processing_result};
use minikyu::{error, info, success, warn};
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(Verbosity::from_flags(args.quiet, args.verbose));

    match args.command {
        Commands::Process {
            input,
            output,
            options,
        } => process_single(&input, output, &options)?,
        Commands::Batch {
            input,
            output,
            options,
            threads,
            recursive,
        } => process_batch(&input, &output, &options, threads, recursive)?,
        Commands::Info { input } => {
            show_image_info(&input)
                .with_context(|| format!("cannot analyze {}", input.display()))?;
        }
        Commands::Formats => list_formats(),
    }

    Ok(())
}

fn process_single(input: &Path, output: Option<PathBuf>, options: &PipelineOptions) -> anyhow::Result<()> {
    let request = options.to_request()?;
    let source = load_artifact(input)?;

    info!("🖼️  Processing: {}", input.display());
    let spinner = create_progress_spinner("Running pipeline...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let result = Pipeline::standard().process(&source, &request);
    spinner.finish_and_clear();

    let processed = result.with_context(|| format!("failed to process {}", input.display()))?;

    let output = output.unwrap_or_else(|| {
        input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(processed.artifact.name())
    });
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, processed.artifact.bytes())
        .with_context(|| format!("cannot write {}", output.display()))?;

    print_processing_result(&processed);
    success!("Saved to {}", output.display());
    Ok(())
}

fn process_batch(
    input: &str,
    output: &Path,
    options: &PipelineOptions,
    threads: Option<usize>,
    recursive: bool,
) -> anyhow::Result<()> {
    let request = options.to_request()?;

    let files = collect_image_files(input, recursive)?;
    if files.is_empty() {
        warn!("No image files found in input path: {}", input);
        return Ok(());
    }
    info!("🔍 Found {} images to process", files.len());

    let mut batch = Batch::new();
    for path in &files {
        match load_artifact(path) {
            Ok(artifact) => {
                batch.add(artifact);
            }
            Err(e) => error!("Skipping {}: {}", path.display(), e),
        }
    }

    let pipeline = Pipeline::standard();
    let progress = batch_progress_bar(batch.len() as u64);
    let summary = match threads {
        Some(threads) => {
            batch.process_all_parallel(&pipeline, &request, resolve_threads(threads), &progress)?
        }
        None => batch.process_all_with_progress(&pipeline, &request, &progress)?,
    };

    let entries = batch.export_entries();
    let written = DirectoryArchive::new(output)
        .write_archive(&entries)
        .with_context(|| format!("cannot export to {}", output.display()))?;

    summary.print();
    success!("Wrote {} files to {}", written.len(), output.display());
    Ok(())
}

fn list_formats() {
    println!("🎭 Output formats:");
    for format in OutputFormat::ALL {
        let status = if check_format_support(format) {
            "supported"
        } else {
            "not available in this build"
        };
        println!(
            "  {:<5} {:<11} .{:<5} {}",
            format.to_string(),
            format.mime_type(),
            format.extension(),
            status
        );
    }
}
