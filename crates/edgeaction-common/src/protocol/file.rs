//! Binary payloads: blobs and named files.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use hyper::body::Bytes;
use serde::{Deserialize, Serialize};

use super::error::Result;

/// Content type used when nothing more specific is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw bytes with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: String,
    pub bytes: Bytes,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A named file: blob content plus a name and a last-modified timestamp.
///
/// The timestamp is in milliseconds since the Unix epoch, the unit browsers
/// use for `File.lastModified`.
///
/// # Example
///
/// ```
/// use edgeaction_common::ActionFile;
///
/// let file = ActionFile::new("notes.txt", "hello")
///     .with_content_type("text/plain")
///     .with_last_modified(1_700_000_000_000);
///
/// assert_eq!(file.metadata().name, "notes.txt");
/// assert_eq!(file.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFile {
    pub name: String,
    pub content_type: String,
    pub last_modified: i64,
    pub bytes: Bytes,
}

/// Side-channel description of a file result, sent as JSON in the
/// `filedata` response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub last_modified: i64,
}

impl ActionFile {
    /// Creates a file stamped with the current time.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            last_modified: now_millis(),
            bytes: bytes.into(),
        }
    }

    /// Rebuilds a file from its metadata header and body.
    pub fn from_metadata(
        metadata: FileMetadata,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: metadata.name,
            content_type: content_type.into(),
            last_modified: metadata.last_modified,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk.
    ///
    /// The content type is guessed from the extension and the timestamp
    /// comes from the file system, falling back to now when unavailable.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let last_modified = tokio::fs::metadata(path)
            .await?
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or_else(now_millis);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        Ok(Self {
            name,
            content_type: content_type.to_string(),
            last_modified,
            bytes: Bytes::from(bytes),
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            name: self.name.clone(),
            last_modified: self.last_modified,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<ActionFile> for Blob {
    fn from(file: ActionFile) -> Self {
        Blob {
            content_type: file.content_type,
            bytes: file.bytes,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
