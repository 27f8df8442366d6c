//! Media storage and source validation for gallery uploads

pub mod storage;

pub use storage::{MediaStorage, validate_media_url};

/// Maximum accepted image upload (10MB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum accepted video upload (50MB)
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

/// Public URL prefix for files managed by [`MediaStorage`]
pub const PUBLIC_PREFIX: &str = "/media";
