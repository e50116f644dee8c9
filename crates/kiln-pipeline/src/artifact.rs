//! Deterministic naming and writing of generated artifacts

use kiln_core::{ContentHash, Result, RunToken};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// The kinds of artifact a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Model,
}

impl ArtifactKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Image => "output",
            ArtifactKind::Model => "model",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Image => "png",
            ArtifactKind::Model => "obj",
        }
    }

    /// `{prefix}_{token}.{ext}`
    pub fn filename(self, token: &RunToken) -> String {
        format!("{}_{}.{}", self.prefix(), token, self.extension())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Image => write!(f, "image"),
            ArtifactKind::Model => write!(f, "3D model"),
        }
    }
}

/// An artifact that has been written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub kind: ArtifactKind,
    /// Bare filename, as recorded in memory
    pub filename: String,
    /// Full path the bytes were written to
    pub path: PathBuf,
    pub content_hash: ContentHash,
    pub size: usize,
}

/// Writes artifacts into a single directory.
///
/// Two runs sharing a token write to the same filenames; the later write
/// replaces the earlier file.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the complete payload under its deterministic filename
    pub fn save(&self, kind: ArtifactKind, bytes: &[u8], token: &RunToken) -> Result<SavedArtifact> {
        std::fs::create_dir_all(&self.root)?;
        let filename = kind.filename(token);
        let path = self.root.join(&filename);

        std::fs::write(&path, bytes)?;

        let content_hash = ContentHash::from_bytes(bytes);
        info!(
            kind = %kind,
            file = %path.display(),
            bytes = bytes.len(),
            hash = %content_hash,
            "Saved generated {}", kind
        );

        Ok(SavedArtifact {
            kind,
            filename,
            path,
            content_hash,
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kiln_artifact_test_{}", uuid::Uuid::new_v4()))
    }

    fn token() -> RunToken {
        let time = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        RunToken::from_naive(time, false)
    }

    #[test]
    fn test_filenames() {
        let token = token();
        assert_eq!(ArtifactKind::Image.filename(&token), "output_20261018_120000.png");
        assert_eq!(ArtifactKind::Model.filename(&token), "model_20261018_120000.obj");
    }

    #[test]
    fn test_save_creates_root_and_writes_bytes() {
        let dir = temp_dir();
        let store = ArtifactStore::new(&dir);

        let saved = store
            .save(ArtifactKind::Image, b"\x89PNG\r\n\x1a\n", &token())
            .unwrap();
        assert_eq!(saved.filename, "output_20261018_120000.png");
        assert_eq!(saved.path, dir.join("output_20261018_120000.png"));
        assert_eq!(saved.size, 8);
        assert_eq!(saved.content_hash, ContentHash::from_bytes(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"\x89PNG\r\n\x1a\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_same_token_overwrites() {
        let dir = temp_dir();
        let store = ArtifactStore::new(&dir);
        let token = token();

        store.save(ArtifactKind::Model, b"first", &token).unwrap();
        let second = store.save(ArtifactKind::Model, b"second", &token).unwrap();

        assert_eq!(std::fs::read(&second.path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_failure_propagates() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        // A file where the root directory should be
        let blocker = dir.join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let store = ArtifactStore::new(&blocker);
        let result = store.save(ArtifactKind::Image, b"data", &token());
        assert!(matches!(result, Err(kiln_core::KilnError::IoError(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
