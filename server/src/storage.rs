use std::path::PathBuf;

use async_trait::async_trait;
use maskpaint_shared::MaskError;

/// Where confirmed masks end up. Returns the path the mask was written to.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_mask(&self, file_name: &str, bytes: &[u8]) -> Result<String, MaskError>;
}

pub struct FileStorage {
    output_dir: PathBuf,
}

impl FileStorage {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn save_mask(&self, file_name: &str, bytes: &[u8]) -> Result<String, MaskError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                MaskError::StorageUnavailable(format!(
                    "cannot create {}: {e}",
                    self.output_dir.display()
                ))
            })?;
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            MaskError::StorageUnavailable(format!("cannot write {}: {e}", path.display()))
        })?;
        Ok(path.display().to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("maskpaint-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn file_storage_creates_missing_directory() {
        let dir = scratch_dir().join("nested");
        let storage = FileStorage::new(dir.clone());
        let path = storage.save_mask("a_mask_1.png", b"png").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png");
        assert!(path.ends_with("a_mask_1.png"));
        let _ = tokio::fs::remove_dir_all(dir.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn unwritable_target_is_storage_unavailable() {
        let dir = scratch_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        // A file where the output directory should be.
        let blocker = dir.join("blocker");
        tokio::fs::write(&blocker, b"x").await.unwrap();
        let storage = FileStorage::new(blocker);
        let error = storage.save_mask("m.png", b"png").await.unwrap_err();
        assert_eq!(error.code(), "StorageUnavailable");
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
