use crate::error::{MinikyuError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One named file handed to an archive writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Packages a list of named outputs into one container.
pub trait ArchiveWriter {
    type Output;

    fn write_archive(&mut self, entries: &[ArchiveEntry]) -> Result<Self::Output>;
}

/// Writes every entry as a plain file inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArchiveWriter for DirectoryArchive {
    type Output = Vec<PathBuf>;

    fn write_archive(&mut self, entries: &[ArchiveEntry]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.root)?;

        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            let file_name = Path::new(&entry.name)
                .file_name()
                .filter(|name| *name == entry.name.as_str())
                .ok_or_else(|| {
                    MinikyuError::Validation(format!("invalid archive entry name: {}", entry.name))
                })?;
            let path = self.root.join(file_name);
            fs::write(&path, &entry.bytes)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Reserve `name` in `taken`, adding `-1`, `-2`, ... before the extension
/// until it no longer collides.
pub fn dedupe_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (base, ext) = match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => (base, Some(ext)),
        _ => (name, None),
    };

    let mut counter = 1u32;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}-{}.{}", base, counter, ext),
            None => format!("{}-{}", base, counter),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
