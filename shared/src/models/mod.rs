//! Domain Models

pub mod gallery_item;
pub mod park_settings;

pub use gallery_item::{GalleryItem, GalleryItemCreate, GalleryItemPatch, MediaKind};
pub use park_settings::{Facilities, ParkSettings, ParkSettingsUpdate, Prices, Timings};
