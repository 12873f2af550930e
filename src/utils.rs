/// Console helpers shared by the CLI commands.
use crate::compress::SavingsTier;
use crate::constants::PROGRESS_SPINNER_TEMPLATE;
use crate::pipeline::ProcessedImage;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner with the crate's usual styling; hidden in quiet mode.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Format file size in human-readable format (e.g. "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Marker shown next to a savings figure.
pub fn savings_badge(percent: i64) -> &'static str {
    match SavingsTier::from_percent(percent) {
        SavingsTier::High => "🟢",
        SavingsTier::Medium => "🟡",
        SavingsTier::Low => "⚪",
    }
}

pub fn describe_savings(percent: i64) -> String {
    if percent > 0 {
        format!("{} Saved {}%", savings_badge(percent), percent)
    } else if percent == 0 {
        format!("{} No size change", savings_badge(percent))
    } else {
        format!("{} Output grew by {}%", savings_badge(percent), percent.abs())
    }
}

pub fn print_processing_result(processed: &ProcessedImage) {
    crate::info!(
        "📏 Dimensions: {} → {}",
        processed.original_dimensions,
        processed.dimensions
    );
    crate::info!(
        "📦 Size: {} → {}",
        format_file_size(processed.original_size),
        format_file_size(processed.output_size())
    );
    crate::info!("🎭 Format: {}", processed.artifact.format());
    crate::info!("{}", describe_savings(processed.savings_percent()));
}
