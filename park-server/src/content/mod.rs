//! Content state management
//!
//! The heart of the server:
//!
//! - [`service`] - single source of truth for settings and gallery state,
//!   reconciling confirmed writes and push notifications
//! - [`session`] - per-section draft-vs-committed edit state machine
//! - [`controller`] - glues sessions to the sync service for the admin
//!   edit flow

pub mod controller;
pub mod service;
pub mod session;


pub use controller::EditController;
pub use service::{ContentService, ContentSnapshot, GalleryItemSource};
pub use session::{EditSession, Section, SectionDraft, SectionSessions};
