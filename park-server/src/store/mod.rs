//! Content Store
//!
//! Persistence layer for the two content entities (park settings, gallery
//! items), abstracted behind the [`ContentStore`] trait so the rest of the
//! server is agnostic to which backend is configured:
//!
//! - [`LocalStore`]: embedded key-value database (redb), JSON blobs,
//!   no change notifications.
//! - [`SurrealStore`]: embedded document database (SurrealDB) with a
//!   broadcast change feed for the settings record.

pub mod local;
pub mod surreal;

pub use local::LocalStore;
pub use surreal::SurrealStore;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::broadcast;

use shared::message::{ChangeAction, SettingsChange};
use shared::models::{
    GalleryItem, GalleryItemCreate, GalleryItemPatch, ParkSettings, ParkSettingsUpdate,
};
use shared::util::now_millis;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A write was attempted before any settings were loaded
    #[error("Settings not loaded")]
    NotLoaded,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(err: redb::DatabaseError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// 资源版本计数器
///
/// 每种资源维护独立的单调递增版本号，变更通道发布时自动递增，
/// 订阅方据此判断数据新旧。
#[derive(Debug, Default)]
pub struct ChangeVersions {
    versions: DashMap<String, u64>,
}

impl ChangeVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值（资源不存在时从 0 递增，返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号（资源不存在时返回 0）
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// Settings resource name used by the change feed
pub const SETTINGS_RESOURCE: &str = "park_settings";

/// Broadcast channel carrying confirmed settings writes.
///
/// Backends that support realtime notifications publish every successful
/// settings write here; the sync service treats the feed as the sole
/// authority for confirmed state.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<SettingsChange>,
    versions: Arc<ChangeVersions>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            versions: Arc::new(ChangeVersions::new()),
        }
    }

    /// Publish a confirmed settings write. Lack of subscribers is not an error.
    pub fn publish(&self, action: ChangeAction, settings: ParkSettings) {
        let version = self.versions.increment(SETTINGS_RESOURCE);
        let _ = self.tx.send(SettingsChange {
            version,
            action,
            settings,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.tx.subscribe()
    }

    pub fn current_version(&self) -> u64 {
        self.versions.get(SETTINGS_RESOURCE)
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Persistence contract for the two content entities.
///
/// All methods are request/response; ordering across callers is whatever the
/// backend provides (single-writer assumption, see the admin gate).
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the singleton settings record, if one exists
    async fn get_settings(&self) -> StoreResult<Option<ParkSettings>>;

    /// Create the singleton settings record
    async fn create_settings(&self, settings: ParkSettings) -> StoreResult<ParkSettings>;

    /// Merge a partial update into the singleton, creating defaults first if
    /// absent; refreshes `updated_at`
    async fn update_settings(&self, update: ParkSettingsUpdate) -> StoreResult<ParkSettings>;

    /// List gallery items ordered by `display_order` ascending
    async fn list_gallery(&self) -> StoreResult<Vec<GalleryItem>>;

    /// Insert a gallery item, assigning id, timestamp and the next
    /// `display_order` (max + 1, or 1 when the collection is empty)
    async fn insert_gallery_item(&self, create: GalleryItemCreate) -> StoreResult<GalleryItem>;

    /// Patch an existing gallery item
    async fn update_gallery_item(
        &self,
        id: &str,
        patch: GalleryItemPatch,
    ) -> StoreResult<GalleryItem>;

    /// Delete a gallery item; `NotFound` when the id is unknown
    async fn delete_gallery_item(&self, id: &str) -> StoreResult<()>;

    /// Subscribe to settings change notifications, when the backend has a
    /// realtime channel
    fn subscribe(&self) -> Option<broadcast::Receiver<SettingsChange>> {
        None
    }

    /// Fetch the singleton settings record, lazily creating the hardcoded
    /// defaults when none exists yet
    async fn get_or_create_settings(&self) -> StoreResult<ParkSettings> {
        if let Some(settings) = self.get_settings().await? {
            return Ok(settings);
        }
        self.create_settings(ParkSettings::with_defaults(now_millis()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_versions_increment_per_resource() {
        let versions = ChangeVersions::new();
        assert_eq!(versions.get("a"), 0);
        assert_eq!(versions.increment("a"), 1);
        assert_eq!(versions.increment("a"), 2);
        assert_eq!(versions.increment("b"), 1);
        assert_eq!(versions.get("a"), 2);
    }

    #[tokio::test]
    async fn test_change_feed_versions_are_monotonic() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.subscribe();

        let settings = ParkSettings::with_defaults(0);
        feed.publish(ChangeAction::Created, settings.clone());
        feed.publish(ChangeAction::Updated, settings);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(second.action, ChangeAction::Updated);
    }
}
