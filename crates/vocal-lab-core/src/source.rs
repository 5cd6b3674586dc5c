//! The user's selected audio file
//!
//! A `SelectedFile` is an opaque, cheaply cloned handle. The session owns one
//! while processing or showing results; the result lanes and the decode task
//! hold clones. The underlying bytes are released once every clone is gone.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::error::{AudioError, Result};

/// Where the file's bytes come from
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on disk, read lazily when decoded
    Path(PathBuf),
    /// Bytes already in memory
    Memory(Arc<[u8]>),
}

#[derive(Debug)]
struct FileInner {
    name: String,
    size: u64,
    source: FileSource,
}

/// Shared handle to the file chosen by the user
#[derive(Debug, Clone)]
pub struct SelectedFile {
    inner: Arc<FileInner>,
}

impl SelectedFile {
    /// Create a handle for a file on disk
    ///
    /// Only filesystem metadata is read here; the audio encoding is never
    /// inspected or validated.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| AudioError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        if !metadata.is_file() {
            return Err(AudioError::NotAFile(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            inner: Arc::new(FileInner {
                name,
                size: metadata.len(),
                source: FileSource::Path(path.to_path_buf()),
            }),
        })
    }

    /// Create a handle for bytes already in memory
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            inner: Arc::new(FileInner {
                name: name.into(),
                size: bytes.len() as u64,
                source: FileSource::Memory(bytes),
            }),
        }
    }

    /// File name (without directories)
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// File name without its extension, used to name exported stems
    pub fn stem_name(&self) -> &str {
        Path::new(&self.inner.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.inner.name)
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.inner.size
    }

    /// Byte source for decoding
    pub fn source(&self) -> &FileSource {
        &self.inner.source
    }

    /// Extension hint for the decoder probe
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.inner.name).extension().and_then(|e| e.to_str())
    }

    /// Whether two handles refer to the same selection
    pub fn same_as(&self, other: &SelectedFile) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Observe the handle without keeping it alive
    pub fn downgrade(&self) -> WeakFile {
        WeakFile {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning observer of a `SelectedFile`
#[derive(Debug, Clone)]
pub struct WeakFile {
    inner: Weak<FileInner>,
}

impl WeakFile {
    /// True once every `SelectedFile` clone has been dropped
    pub fn is_released(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_reports_size_and_name() {
        let file = SelectedFile::from_bytes("song.mp3", vec![0u8; 3 * 1024 * 1024]);
        assert_eq!(file.name(), "song.mp3");
        assert_eq!(file.size(), 3 * 1024 * 1024);
        assert_eq!(file.stem_name(), "song");
        assert_eq!(file.extension(), Some("mp3"));
    }

    #[test]
    fn test_from_path_reads_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        std::fs::write(&path, b"not really audio").unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "take.wav");
        assert_eq!(file.size(), 16);
        assert!(matches!(file.source(), FileSource::Path(p) if p == &path));
    }

    #[test]
    fn test_from_path_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, AudioError::NotAFile(_)));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SelectedFile::from_path("/nonexistent/vocal-lab/missing.wav").unwrap_err();
        assert!(matches!(err, AudioError::Read { .. }));
    }

    #[test]
    fn test_weak_file_released_after_last_clone() {
        let file = SelectedFile::from_bytes("a.wav", vec![1u8, 2, 3]);
        let clone = file.clone();
        let weak = file.downgrade();

        assert!(file.same_as(&clone));
        drop(file);
        assert!(!weak.is_released());
        drop(clone);
        assert!(weak.is_released());
    }
}
