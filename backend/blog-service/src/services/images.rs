/// Local image storage for uploaded post images
///
/// Files are written under the configured upload directory with a generated
/// name and served statically under the configured public prefix. Only
/// common web image formats are accepted, capped at 10 MiB.
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Upload size cap
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Reference stored on posts created without an uploaded image
pub const PLACEHOLDER_IMAGE: &str = "/api/placeholder/800/400";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Lowercased extension of a filename, if it has one
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Whether a filename carries an accepted image extension
pub fn is_allowed_image(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Create the upload directory if it does not exist
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))
    }

    /// Persist uploaded image bytes and return the public URL path.
    ///
    /// The original filename is only consulted for its extension; the stored
    /// name is generated.
    pub async fn save(&self, original_filename: &str, bytes: &[u8]) -> Result<String> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::InvalidInput(
                "Image exceeds the 10MB upload limit".to_string(),
            ));
        }
        if !is_allowed_image(original_filename) {
            return Err(AppError::InvalidInput(
                "Only image files are allowed (jpeg, jpg, png, gif, webp)".to_string(),
            ));
        }

        let ext = file_extension(original_filename).unwrap();
        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&stored_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store image: {}", e)))?;

        tracing::info!(file = %stored_name, size = bytes.len(), "image stored");
        Ok(format!("{}/{}", self.public_prefix.trim_end_matches('/'), stored_name))
    }

    /// Directory files are written to (for the static file service)
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_image("photo.jpg"));
        assert!(is_allowed_image("photo.JPEG"));
        assert!(is_allowed_image("a.b.webp"));
        assert!(!is_allowed_image("archive.zip"));
        assert!(!is_allowed_image("noextension"));
        assert!(!is_allowed_image("script.jpg.exe"));
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_payload() {
        let store = ImageStore::new(std::env::temp_dir(), "/uploads");
        let too_big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(store.save("big.png", &too_big).await.is_err());
    }

    #[tokio::test]
    async fn test_save_writes_and_returns_public_path() {
        let dir = std::env::temp_dir().join(format!("blog-uploads-{}", Uuid::new_v4()));
        let store = ImageStore::new(&dir, "/uploads/");
        store.ensure_dir().await.unwrap();

        let url = store.save("cover.png", b"not-really-a-png").await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let stored = dir.join(url.rsplit('/').next().unwrap());
        assert!(stored.exists());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
