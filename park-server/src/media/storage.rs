//! Validated file storage for uploaded gallery media
//!
//! Uploads are validated before any byte reaches disk: the MIME type
//! resolved from the file name must be `image/*` or `video/*`, size
//! ceilings apply per kind, and images must actually decode. Stored files
//! are content-addressed (`{sha256}.{ext}`), so re-uploading identical
//! bytes returns the existing URL instead of writing a second copy.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};
use url::Url;

use shared::models::MediaKind;

use crate::store::{StoreError, StoreResult};
use crate::utils::validation::MAX_URL_LEN;

use super::{MAX_IMAGE_BYTES, MAX_VIDEO_BYTES, PUBLIC_PREFIX};

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// File storage for uploaded gallery media
#[derive(Debug, Clone)]
pub struct MediaStorage {
    media_dir: PathBuf,
}

impl MediaStorage {
    /// `work_dir` is the server working directory; files land under
    /// `{work_dir}/uploads/media/`
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self {
            media_dir: work_dir.as_ref().join("uploads/media"),
        }
    }

    /// Validate an upload without touching storage.
    ///
    /// Returns the media kind derived from the file name's MIME type.
    pub fn validate(&self, file_name: &str, size: usize) -> StoreResult<MediaKind> {
        if size == 0 {
            return Err(StoreError::Validation("Empty file provided".to_string()));
        }

        let mime = mime_guess::from_path(file_name).first().ok_or_else(|| {
            StoreError::Validation(format!("Unknown file type for '{}'", file_name))
        })?;

        let (kind, ceiling) = match mime.type_().as_str() {
            "image" => (MediaKind::Image, MAX_IMAGE_BYTES),
            "video" => (MediaKind::Video, MAX_VIDEO_BYTES),
            other => {
                return Err(StoreError::Validation(format!(
                    "Unsupported file type '{}/{}'; only image/* and video/* are accepted",
                    other,
                    mime.subtype()
                )));
            }
        };

        if size > ceiling {
            return Err(StoreError::Validation(format!(
                "{} too large ({} bytes, max {}MB)",
                kind,
                size,
                ceiling / 1024 / 1024
            )));
        }

        Ok(kind)
    }

    /// Validate and persist an upload, returning its public URL.
    pub async fn store(&self, file_name: &str, data: &[u8]) -> StoreResult<String> {
        let kind = self.validate(file_name, data.len())?;

        // Images must actually decode; videos are accepted on type + size
        if kind == MediaKind::Image
            && let Err(e) = image::load_from_memory(data)
        {
            return Err(StoreError::Validation(format!("Invalid image file: {}", e)));
        }

        let ext = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .ok_or_else(|| {
                StoreError::Validation(format!("Missing file extension for '{}'", file_name))
            })?;

        let hash = calculate_hash(data);
        let stored_name = format!("{hash}.{ext}");
        let file_path = self.media_dir.join(&stored_name);

        if file_path.exists() {
            tracing::info!(
                original_name = %file_name,
                stored_name = %stored_name,
                "Duplicate upload, returning existing file"
            );
        } else {
            tokio::fs::create_dir_all(&self.media_dir).await?;
            tokio::fs::write(&file_path, data).await?;
            tracing::info!(
                original_name = %file_name,
                size = data.len(),
                stored_name = %stored_name,
                "Media file stored"
            );
        }

        Ok(format!("{PUBLIC_PREFIX}/{stored_name}"))
    }

    /// Whether a URL points into managed storage
    pub fn is_managed(&self, url: &str) -> bool {
        url.strip_prefix(PUBLIC_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Best-effort deletion of a managed file.
    ///
    /// Failures are logged and swallowed; unmanaged URLs are ignored.
    pub async fn delete(&self, url: &str) {
        let Some(name) = url.strip_prefix(PUBLIC_PREFIX).and_then(|r| r.strip_prefix('/'))
        else {
            return;
        };
        // Stored names are hash.ext; anything with a path separator is not ours
        if name.contains('/') || name.contains("..") {
            tracing::warn!(url = %url, "Refusing to delete suspicious media path");
            return;
        }

        let file_path = self.media_dir.join(name);
        if let Err(e) = tokio::fs::remove_file(&file_path).await {
            tracing::warn!(url = %url, error = %e, "Failed to delete media file");
        }
    }

    /// Resolve a managed URL to its on-disk path (static file serving)
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        if name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.media_dir.join(name))
    }
}

/// Validate a gallery media source URL before any store call.
///
/// Accepted shapes: `http(s)` URLs, site-relative paths (`/1.jpeg`), and
/// base64-encoded `data:` URIs.
pub fn validate_media_url(raw: &str) -> StoreResult<()> {
    if raw.trim().is_empty() {
        return Err(StoreError::Validation("Media URL must not be empty".to_string()));
    }

    if let Some(rest) = raw.strip_prefix("data:") {
        let payload = rest
            .split_once("base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| {
                StoreError::Validation("Data URI must carry a base64 payload".to_string())
            })?;
        BASE64
            .decode(payload)
            .map_err(|e| StoreError::Validation(format!("Invalid data URI payload: {}", e)))?;
        return Ok(());
    }

    if raw.len() > MAX_URL_LEN {
        return Err(StoreError::Validation(format!(
            "Media URL is too long ({} chars, max {MAX_URL_LEN})",
            raw.len()
        )));
    }

    if raw.starts_with('/') {
        // Site-relative asset path
        return Ok(());
    }

    let parsed = Url::parse(raw)
        .map_err(|e| StoreError::Validation(format!("Invalid media URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(StoreError::Validation(format!(
            "Unsupported URL scheme '{}'",
            scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> (tempfile::TempDir, MediaStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());
        (dir, storage)
    }

    #[test]
    fn test_oversized_video_rejected_before_io() {
        let (_dir, storage) = create_test_storage();
        let err = storage.validate("tour.mp4", 60 * 1024 * 1024).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_image_within_ceiling_passes_validation() {
        let (_dir, storage) = create_test_storage();
        let kind = storage.validate("pool.jpg", 5 * 1024 * 1024).unwrap();
        assert_eq!(kind, MediaKind::Image);
    }

    #[test]
    fn test_image_over_its_own_ceiling_rejected() {
        let (_dir, storage) = create_test_storage();
        // 20MB would pass the video ceiling but not the image one
        let err = storage.validate("pool.jpg", 20 * 1024 * 1024).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_non_media_type_rejected() {
        let (_dir, storage) = create_test_storage();
        assert!(storage.validate("malware.exe", 100).is_err());
        assert!(storage.validate("notes.pdf", 100).is_err());
        assert!(storage.validate("", 100).is_err());
    }

    fn encode_test_png() -> Vec<u8> {
        let img = image::RgbImage::new(4, 4);
        let mut buffer = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .unwrap();
        buffer
    }

    #[tokio::test]
    async fn test_store_is_content_addressed() {
        let (_dir, storage) = create_test_storage();
        let png = encode_test_png();

        let first = storage.store("photo.png", &png).await.unwrap();
        let second = storage.store("renamed.png", &png).await.unwrap();
        assert_eq!(first, second);
        assert!(storage.is_managed(&first));
        assert!(storage.resolve(&first).unwrap().exists());
    }

    #[tokio::test]
    async fn test_invalid_image_bytes_rejected() {
        let (_dir, storage) = create_test_storage();
        let err = storage.store("photo.png", b"not a png").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_is_best_effort() {
        let (_dir, storage) = create_test_storage();
        // Unknown file and unmanaged URL both complete silently
        storage.delete("/media/0000.jpg").await;
        storage.delete("https://elsewhere.example.com/a.jpg").await;
    }

    #[test]
    fn test_media_url_validation() {
        assert!(validate_media_url("https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_media_url("/1.jpeg").is_ok());
        assert!(validate_media_url("data:image/png;base64,AAAA").is_ok());

        assert!(validate_media_url("").is_err());
        assert!(validate_media_url("ftp://example.com/a.jpg").is_err());
        assert!(validate_media_url("not a url").is_err());
        assert!(validate_media_url("data:image/png;base64,!!!").is_err());
        assert!(validate_media_url(&format!("https://e.com/{}", "x".repeat(3000))).is_err());
    }
}
