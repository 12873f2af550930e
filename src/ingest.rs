//! Getting files off disk and into artifacts.
//!
//! The size bound lives here, ahead of the pipeline.

use crate::artifact::ImageArtifact;
use crate::constants::{MAX_FILE_SIZE, SUPPORTED_IMAGE_EXTENSIONS};
use crate::error::{MinikyuError, Result};
use crate::formats::{detect_format, OutputFormat};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check if a file path has one of the accepted image extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(MinikyuError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Expand `input` (a file, a directory or a glob pattern) into image paths.
///
/// Directory walks skip hidden entries and only descend when `recursive`
/// is set. Results are sorted so batch order is stable across runs.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        if is_image_file(input_path) {
            image_files.push(input_path.to_path_buf());
        }
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else {
        let pattern =
            glob(input).map_err(|_| MinikyuError::NoImageFilesFound(input.to_string()))?;
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
        image_files.sort();
    }

    Ok(image_files)
}

/// Read one file into an artifact.
///
/// Files above 20 MiB are refused. The format comes from the file's magic
/// bytes, falling back to its extension; the name is the file name.
pub fn load_artifact(path: &Path) -> Result<ImageArtifact> {
    validate_file_exists(path)?;

    let size = fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(MinikyuError::FileTooLarge(size, MAX_FILE_SIZE));
    }

    let bytes = fs::read(path)?;
    let format = detect_format(&bytes)
        .or_else(|| OutputFormat::from_path(path))
        .ok_or_else(|| MinikyuError::UnsupportedFormat(path.display().to_string()))?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("image.{}", format.extension()));

    Ok(ImageArtifact::new(bytes, format, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.JPEG")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.webp")));
        assert!(is_image_file(Path::new("test.AvIf")));

        assert!(!is_image_file(Path::new("test.gif")));
        assert!(!is_image_file(Path::new("test.bmp")));
        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_collect_image_files_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.jpg");
        File::create(&test_file).unwrap().write_all(b"data").unwrap();

        let files = collect_image_files(&test_file.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![test_file]);
    }

    #[test]
    fn test_collect_image_files_directory_sorted() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.png")).unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join(".hidden.png")).unwrap();

        let files = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_collect_image_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();
        File::create(subdir.join("nested.webp")).unwrap();

        let flat = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_image_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_image_files_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("one.jpg")).unwrap();
        File::create(temp_dir.path().join("two.png")).unwrap();

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_image_files_nothing_matches() {
        let files = collect_image_files("/definitely/not/here/*.png", false).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_load_artifact_detects_format_from_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mislabelled.jpg");
        let png = crate::codec::encode(
            &image::DynamicImage::new_rgb8(3, 3),
            OutputFormat::Png,
            None,
        )
        .unwrap();
        fs::write(&path, &png).unwrap();

        let artifact = load_artifact(&path).unwrap();
        assert_eq!(artifact.format(), OutputFormat::Png);
        assert_eq!(artifact.name(), "mislabelled.jpg");
        assert_eq!(artifact.size(), png.len() as u64);
    }

    #[test]
    fn test_load_artifact_falls_back_to_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.webp");
        fs::write(&path, b"fake image data").unwrap();

        let artifact = load_artifact(&path).unwrap();
        assert_eq!(artifact.format(), OutputFormat::WebP);
    }

    #[test]
    fn test_load_artifact_too_large() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge.png");
        let file = File::create(&path).unwrap();
        file.set_len(MAX_FILE_SIZE + 1).unwrap();

        assert!(matches!(
            load_artifact(&path),
            Err(MinikyuError::FileTooLarge(_, _))
        ));
    }

    #[test]
    fn test_load_artifact_missing() {
        assert!(matches!(
            load_artifact(Path::new("/nonexistent/file.jpg")),
            Err(MinikyuError::FileNotFound(_))
        ));
    }
}
