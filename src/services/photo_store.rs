use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PhotoStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Image bytes on disk, one file per photo named by its id.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: Arc<PathBuf>,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(self.dir.as_path()).await
    }

    fn path_for(&self, photo_id: Uuid) -> PathBuf {
        self.dir.join(photo_id.to_string())
    }

    /// Uploads land in a scratch file first so a half-written image is never
    /// served under a real id.
    pub async fn begin_upload(&self, limit: usize) -> Result<PendingUpload, PhotoStoreError> {
        let path = self.dir.join(format!(".upload-{}", Uuid::new_v4()));
        let file = File::create(&path).await?;
        Ok(PendingUpload {
            path,
            file,
            written: 0,
            limit,
        })
    }

    pub async fn open(&self, photo_id: Uuid) -> io::Result<File> {
        File::open(self.path_for(photo_id)).await
    }

    /// Removing something that is already gone is not an error.
    pub async fn remove(&self, photo_id: Uuid) -> io::Result<()> {
        match fs::remove_file(self.path_for(photo_id)).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

pub struct PendingUpload {
    path: PathBuf,
    file: File,
    written: usize,
    limit: usize,
}

impl PendingUpload {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PhotoStoreError> {
        if self.written + chunk.len() > self.limit {
            return Err(PhotoStoreError::TooLarge { limit: self.limit });
        }
        self.file.write_all(chunk).await?;
        self.written += chunk.len();
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Moves the scratch file to its final name.
    pub async fn commit(mut self, store: &PhotoStore, photo_id: Uuid) -> Result<(), PhotoStoreError> {
        self.file.flush().await?;
        drop(self.file);
        fs::rename(&self.path, store.path_for(photo_id)).await?;
        Ok(())
    }

    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.path).await {
            log::warn!("Could not remove scratch upload {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn scratch_store() -> PhotoStore {
        PhotoStore::new(std::env::temp_dir().join(format!("gdn-photos-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_commit_then_open() {
        let store = scratch_store();
        store.ensure_dir().await.unwrap();
        let photo_id = Uuid::new_v4();

        let mut upload = store.begin_upload(16).await.unwrap();
        upload.write_chunk(b"\x89PNG").await.unwrap();
        upload.write_chunk(b"data").await.unwrap();
        assert_eq!(upload.written(), 8);
        upload.commit(&store, photo_id).await.unwrap();

        let mut contents = Vec::new();
        store.open(photo_id).await.unwrap().read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"\x89PNGdata");

        store.remove(photo_id).await.unwrap();
        assert!(store.open(photo_id).await.is_err());
        fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_limit_is_enforced() {
        let store = scratch_store();
        store.ensure_dir().await.unwrap();

        let mut upload = store.begin_upload(4).await.unwrap();
        upload.write_chunk(b"abc").await.unwrap();
        let err = upload.write_chunk(b"de").await.unwrap_err();
        assert!(matches!(err, PhotoStoreError::TooLarge { limit: 4 }));

        upload.abort().await;
        let mut entries = fs::read_dir(store.dir()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
        fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let store = scratch_store();
        store.ensure_dir().await.unwrap();
        store.remove(Uuid::new_v4()).await.unwrap();
        fs::remove_dir_all(store.dir()).await.unwrap();
    }
}
