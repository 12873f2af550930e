use crate::codec;
use crate::dimensions::Dimensions;
use crate::error::Result;
use crate::formats::OutputFormat;
use std::sync::Arc;

/// An encoded image: immutable bytes, the declared format and a display name.
///
/// Every pipeline stage consumes one artifact and produces a new one. The
/// byte buffer is shared, so clones are cheap and never observe mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    bytes: Arc<[u8]>,
    format: OutputFormat,
    name: String,
}

impl ImageArtifact {
    pub fn new(bytes: impl Into<Arc<[u8]>>, format: OutputFormat, name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            format,
            name: name.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the encoded bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            bytes: Arc::clone(&self.bytes),
            format: self.format,
            name: name.into(),
        }
    }

    /// Pixel dimensions, read from the encoded header.
    pub fn dimensions(&self) -> Result<Dimensions> {
        let (width, height) = codec::read_dimensions(&self.bytes, self.format)?;
        Dimensions::new(width, height)
    }
}

/// Remove the final `.ext` from a file name. `"a.b.png"` -> `"a.b"`,
/// `"noext"` -> `"noext"`.
pub fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => base,
        _ => name,
    }
}

/// Name with the extension swapped for `format`'s canonical one.
pub fn rename_for_format(name: &str, format: OutputFormat) -> String {
    format!("{}.{}", strip_extension(name), format.extension())
}
