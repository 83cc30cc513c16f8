use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Server-side cap, matching the inference API's payload limit.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,
    #[error("Only image files are supported")]
    NotAnImage,
    #[error("File too large. Please upload an image under 10MB.")]
    TooLarge,
    #[error("Malformed multipart payload: {0}")]
    Multipart(String),
    #[error("Upload storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// True for rejections the client caused, as opposed to storage faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            UploadError::NoFile
                | UploadError::NotAnImage
                | UploadError::TooLarge
                | UploadError::Multipart(_)
        )
    }
}

/// Scratch directory for per-request upload files.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write the payload under a fresh name. The returned guard removes the
    /// file when dropped, so every exit path of a request cleans up.
    pub fn stash(&self, data: &[u8]) -> Result<StoredUpload, UploadError> {
        let path = self.dir.join(Uuid::new_v4().to_string());
        fs::write(&path, data)?;
        Ok(StoredUpload { path })
    }
}

pub struct StoredUpload {
    path: PathBuf,
}

impl StoredUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            log::warn!("Failed to remove upload {}: {}", self.path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> UploadStore {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        UploadStore::new(dir).unwrap()
    }

    #[test]
    fn stash_writes_and_drop_removes() {
        let store = test_store();
        let upload = store.stash(b"not really a jpeg").unwrap();
        let path = upload.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(upload.read().unwrap(), b"not really a jpeg");

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn stashed_uploads_get_distinct_names() {
        let store = test_store();
        let a = store.stash(b"a").unwrap();
        let b = store.stash(b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
