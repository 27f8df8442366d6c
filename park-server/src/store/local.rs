//! redb-backed content store
//!
//! The local-storage variant: entities are JSON blobs in an embedded
//! key-value database. No realtime channel; writers get the confirmed
//! record back in the call result and nothing else.
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `park_settings` | `"main"` | `ParkSettings` | Singleton settings record |
//! | `gallery_items` | item id | `GalleryItem` | Gallery collection |
//! | `meta` | flag name | `()` | One-time initialization flags |

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tokio::sync::broadcast;

use shared::message::SettingsChange;
use shared::models::{
    GalleryItem, GalleryItemCreate, GalleryItemPatch, MediaKind, ParkSettings, ParkSettingsUpdate,
};
use shared::util::{now_millis, snowflake_id};

use super::{ContentStore, StoreError, StoreResult};

const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("park_settings");
const GALLERY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("gallery_items");
const META_TABLE: TableDefinition<&str, ()> = TableDefinition::new("meta");

const SETTINGS_KEY: &str = "main";
const GALLERY_SEEDED_FLAG: &str = "gallery_seeded";

/// Content store backed by redb
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory database (tests, ephemeral demos)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.initialize()?;
        Ok(store)
    }

    /// Create tables and seed the default gallery exactly once.
    ///
    /// The seeded flag distinguishes "never initialized" from "admin removed
    /// every item" so deletions survive a restart.
    fn initialize(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(SETTINGS_TABLE)?;
            let mut gallery = write_txn.open_table(GALLERY_TABLE)?;
            let mut meta = write_txn.open_table(META_TABLE)?;

            if meta.get(GALLERY_SEEDED_FLAG)?.is_none() {
                let now = now_millis();
                for (order, file_url) in ["/1.jpeg", "/2.jpeg", "/3.jpeg"].iter().enumerate() {
                    let item = GalleryItem {
                        id: snowflake_id().to_string(),
                        file_url: file_url.to_string(),
                        file_name: format!("Water Park Experience {}", order + 1),
                        file_type: MediaKind::Image,
                        display_order: order as i64 + 1,
                        created_at: now,
                    };
                    let blob = serde_json::to_vec(&item)?;
                    gallery.insert(item.id.as_str(), blob.as_slice())?;
                }
                meta.insert(GALLERY_SEEDED_FLAG, ())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_settings(&self) -> StoreResult<Option<ParkSettings>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;
        match table.get(SETTINGS_KEY)? {
            Some(blob) => Ok(Some(serde_json::from_slice(blob.value())?)),
            None => Ok(None),
        }
    }

    fn write_settings(&self, settings: &ParkSettings) -> StoreResult<()> {
        let blob = serde_json::to_vec(settings)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SETTINGS_TABLE)?;
            table.insert(SETTINGS_KEY, blob.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_gallery(&self) -> StoreResult<Vec<GalleryItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GALLERY_TABLE)?;
        let mut items = Vec::new();
        for entry in table.iter()? {
            let (_key, blob) = entry?;
            items.push(serde_json::from_slice::<GalleryItem>(blob.value())?);
        }
        // created_at breaks display_order ties in insertion order
        items.sort_by_key(|item| (item.display_order, item.created_at));
        Ok(items)
    }

    fn read_gallery_item(&self, id: &str) -> StoreResult<Option<GalleryItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GALLERY_TABLE)?;
        match table.get(id)? {
            Some(blob) => Ok(Some(serde_json::from_slice(blob.value())?)),
            None => Ok(None),
        }
    }

    fn write_gallery_item(&self, item: &GalleryItem) -> StoreResult<()> {
        let blob = serde_json::to_vec(item)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(GALLERY_TABLE)?;
            table.insert(item.id.as_str(), blob.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    async fn get_settings(&self) -> StoreResult<Option<ParkSettings>> {
        self.read_settings()
    }

    async fn create_settings(&self, settings: ParkSettings) -> StoreResult<ParkSettings> {
        self.write_settings(&settings)?;
        Ok(settings)
    }

    async fn update_settings(&self, update: ParkSettingsUpdate) -> StoreResult<ParkSettings> {
        let mut settings = self.get_or_create_settings().await?;
        settings.merge(update);
        settings.updated_at = now_millis();
        self.write_settings(&settings)?;
        Ok(settings)
    }

    async fn list_gallery(&self) -> StoreResult<Vec<GalleryItem>> {
        self.read_gallery()
    }

    async fn insert_gallery_item(&self, create: GalleryItemCreate) -> StoreResult<GalleryItem> {
        let next_order = self
            .read_gallery()?
            .iter()
            .map(|item| item.display_order)
            .max()
            .unwrap_or(0)
            + 1;

        let item = GalleryItem {
            id: snowflake_id().to_string(),
            file_url: create.file_url,
            file_name: create.file_name,
            file_type: create.file_type,
            display_order: next_order,
            created_at: now_millis(),
        };
        self.write_gallery_item(&item)?;
        Ok(item)
    }

    async fn update_gallery_item(
        &self,
        id: &str,
        patch: GalleryItemPatch,
    ) -> StoreResult<GalleryItem> {
        let mut item = self
            .read_gallery_item(id)?
            .ok_or_else(|| StoreError::NotFound(format!("Gallery item {} not found", id)))?;

        if let Some(file_name) = patch.file_name {
            item.file_name = file_name;
        }
        if let Some(display_order) = patch.display_order {
            item.display_order = display_order;
        }
        self.write_gallery_item(&item)?;
        Ok(item)
    }

    async fn delete_gallery_item(&self, id: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(GALLERY_TABLE)?;
            table.remove(id)?.is_some()
        };
        write_txn.commit()?;

        if removed {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!(
                "Gallery item {} not found",
                id
            )))
        }
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<SettingsChange>> {
        // Key-value backend has no realtime channel
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Prices;

    fn create_test_store() -> LocalStore {
        LocalStore::open_in_memory().unwrap()
    }

    fn image_create(name: &str) -> GalleryItemCreate {
        GalleryItemCreate {
            file_url: format!("https://cdn.example.com/{name}.jpg"),
            file_name: name.to_string(),
            file_type: MediaKind::Image,
        }
    }

    #[tokio::test]
    async fn test_settings_created_lazily_with_defaults() {
        let store = create_test_store();
        assert!(store.get_settings().await.unwrap().is_none());

        let settings = store.get_or_create_settings().await.unwrap();
        assert_eq!(settings.prices.weekday, 400);
        assert_eq!(settings.prices.weekend, 500);
        assert_eq!(settings.facilities.locker_room, 50);

        // Second call reads the stored record instead of re-creating
        let again = store.get_or_create_settings().await.unwrap();
        assert_eq!(again.created_at, settings.created_at);
    }

    #[tokio::test]
    async fn test_update_settings_merges_and_bumps_timestamp() {
        let store = create_test_store();
        let before = store.get_or_create_settings().await.unwrap();

        let updated = store
            .update_settings(ParkSettingsUpdate {
                prices: Some(Prices {
                    weekday: 350,
                    weekend: 500,
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.prices.weekday, 350);
        assert_eq!(updated.timings, before.timings);
        assert!(updated.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_gallery_seeded_once() {
        let store = create_test_store();
        let items = store.list_gallery().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items.iter().map(|i| i.display_order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_display_order_is_max_plus_one() {
        let store = create_test_store();

        let a = store.insert_gallery_item(image_create("slide")).await.unwrap();
        let b = store.insert_gallery_item(image_create("pool")).await.unwrap();
        assert_eq!(a.display_order, 4); // after the three seeded items
        assert_eq!(b.display_order, 5);

        // Orders restart from max + 1 even after deleting the tail
        store.delete_gallery_item(&b.id).await.unwrap();
        let c = store.insert_gallery_item(image_create("wave")).await.unwrap();
        assert_eq!(c.display_order, 5);
    }

    #[tokio::test]
    async fn test_insert_into_empty_collection_starts_at_one() {
        let store = create_test_store();
        for item in store.list_gallery().await.unwrap() {
            store.delete_gallery_item(&item.id).await.unwrap();
        }

        let first = store.insert_gallery_item(image_create("first")).await.unwrap();
        assert_eq!(first.display_order, 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let store = create_test_store();
        let before = store.list_gallery().await.unwrap();

        let err = store.delete_gallery_item("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let after = store.list_gallery().await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_patch_updates_name_and_resorts_order() {
        let store = create_test_store();
        let item = store.insert_gallery_item(image_create("slide")).await.unwrap();

        let patched = store
            .update_gallery_item(
                &item.id,
                GalleryItemPatch {
                    file_name: Some("Big Slide".to_string()),
                    display_order: Some(0),
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.file_name, "Big Slide");

        let items = store.list_gallery().await.unwrap();
        assert_eq!(items.first().unwrap().id, item.id);
    }

    #[tokio::test]
    async fn test_deleted_gallery_stays_empty_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.redb");

        {
            let store = LocalStore::open(&path).unwrap();
            for item in store.list_gallery().await.unwrap() {
                store.delete_gallery_item(&item.id).await.unwrap();
            }
        }

        let reopened = LocalStore::open(&path).unwrap();
        assert!(reopened.list_gallery().await.unwrap().is_empty());
    }
}
