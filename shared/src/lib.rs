//! Shared domain types for the park content server
//!
//! Kept free of storage and web-framework dependencies so both the server
//! and any future client crate can consume the same model definitions.

pub mod message;
pub mod models;
pub mod util;

// Re-export common types
pub use message::{ChangeAction, SettingsChange};
pub use models::{
    Facilities, GalleryItem, GalleryItemCreate, GalleryItemPatch, MediaKind, ParkSettings,
    ParkSettingsUpdate, Prices, Timings,
};
