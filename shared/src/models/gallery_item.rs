//! Gallery Item Model

use serde::{Deserialize, Serialize};

/// Media kind of a gallery entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One media entry shown in the public gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    /// Data URI, external URL, or a URL produced by media storage
    pub file_url: String,
    pub file_name: String,
    pub file_type: MediaKind,
    /// Presentation sequence; assigned as max + 1 on insert
    pub display_order: i64,
    pub created_at: i64,
}

/// Create gallery item payload (id, order and timestamp are store-assigned)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItemCreate {
    pub file_url: String,
    pub file_name: String,
    pub file_type: MediaKind,
}

/// Update gallery item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_wire_format() {
        assert_eq!(serde_json::to_string(&MediaKind::Image).unwrap(), "\"image\"");
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");

        let kind: MediaKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, MediaKind::Video);
    }
}
