//! SurrealDB-backed content store
//!
//! The hosted-backend variant: entities live in an embedded document
//! database and every confirmed settings write is also published on a
//! broadcast change feed, which the sync service treats as the authority
//! for settings state (last writer wins).

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::{RecordId, Surreal};
use tokio::sync::broadcast;

use shared::message::{ChangeAction, SettingsChange};
use shared::models::{
    Facilities, GalleryItem, GalleryItemCreate, GalleryItemPatch, MediaKind, ParkSettings,
    ParkSettingsUpdate, Prices, Timings,
};
use shared::util::{now_millis, snowflake_id};

use super::{ChangeFeed, ContentStore, StoreError, StoreResult};

const NAMESPACE: &str = "park";
const DATABASE: &str = "content";

const SETTINGS_TABLE: &str = "park_settings";
const SETTINGS_KEY: &str = "main";
const GALLERY_TABLE: &str = "gallery_item";

/// Settings record as stored; the record id is managed by the database,
/// the application-facing `id` is fixed to the singleton key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsRecord {
    timings: Timings,
    prices: Prices,
    #[serde(default)]
    facilities: Facilities,
    created_at: i64,
    updated_at: i64,
}

impl SettingsRecord {
    fn from_settings(settings: &ParkSettings) -> Self {
        Self {
            timings: settings.timings.clone(),
            prices: settings.prices,
            facilities: settings.facilities,
            created_at: settings.created_at,
            updated_at: settings.updated_at,
        }
    }

    fn into_settings(self) -> ParkSettings {
        ParkSettings {
            id: SETTINGS_KEY.to_string(),
            timings: self.timings,
            prices: self.prices,
            facilities: self.facilities,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Gallery record content (id managed by the database)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GalleryRecord {
    file_url: String,
    file_name: String,
    file_type: MediaKind,
    display_order: i64,
    created_at: i64,
}

/// Gallery row as returned by list queries.
///
/// `item_id` is projected with `record::id(id)` so the raw string key comes
/// back as a plain value (numeric-looking keys would otherwise render
/// escaped).
#[derive(Debug, Deserialize)]
struct GalleryRow {
    item_id: String,
    file_url: String,
    file_name: String,
    file_type: MediaKind,
    display_order: i64,
    created_at: i64,
}

impl GalleryRow {
    fn into_item(self) -> GalleryItem {
        GalleryItem {
            id: self.item_id,
            file_url: self.file_url,
            file_name: self.file_name,
            file_type: self.file_type,
            display_order: self.display_order,
            created_at: self.created_at,
        }
    }
}

/// Content store backed by embedded SurrealDB
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Db>,
    feed: ChangeFeed,
}

impl SurrealStore {
    /// Open or create the database at the given path (RocksDB engine)
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Surreal::new::<RocksDb>(path.as_ref().to_path_buf()).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self {
            db,
            feed: ChangeFeed::default(),
        })
    }

    /// Open an in-memory database (tests)
    pub async fn open_in_memory() -> StoreResult<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self {
            db,
            feed: ChangeFeed::default(),
        })
    }

    fn gallery_not_found(id: &str) -> StoreError {
        StoreError::NotFound(format!("Gallery item {} not found", id))
    }
}

#[async_trait]
impl ContentStore for SurrealStore {
    async fn get_settings(&self) -> StoreResult<Option<ParkSettings>> {
        let record: Option<SettingsRecord> =
            self.db.select((SETTINGS_TABLE, SETTINGS_KEY)).await?;
        Ok(record.map(SettingsRecord::into_settings))
    }

    async fn create_settings(&self, settings: ParkSettings) -> StoreResult<ParkSettings> {
        let created: Option<SettingsRecord> = self
            .db
            .create((SETTINGS_TABLE, SETTINGS_KEY))
            .content(SettingsRecord::from_settings(&settings))
            .await?;
        let created = created
            .ok_or_else(|| StoreError::Storage("Failed to create park settings".to_string()))?
            .into_settings();

        self.feed.publish(ChangeAction::Created, created.clone());
        Ok(created)
    }

    async fn update_settings(&self, update: ParkSettingsUpdate) -> StoreResult<ParkSettings> {
        // Ensure the singleton exists
        self.get_or_create_settings().await?;

        // Refresh timestamp first, then merge the partial payload
        let record_id = RecordId::from_table_key(SETTINGS_TABLE, SETTINGS_KEY);
        self.db
            .query("UPDATE $id SET updated_at = $now")
            .bind(("id", record_id.clone()))
            .bind(("now", now_millis()))
            .await?;

        let updated: Option<SettingsRecord> = self.db.update(record_id).merge(update).await?;
        let updated = updated
            .ok_or_else(|| StoreError::Storage("Failed to update park settings".to_string()))?
            .into_settings();

        self.feed.publish(ChangeAction::Updated, updated.clone());
        Ok(updated)
    }

    async fn list_gallery(&self) -> StoreResult<Vec<GalleryItem>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT *, record::id(id) AS item_id FROM {GALLERY_TABLE} \
                 ORDER BY display_order ASC, created_at ASC"
            ))
            .await?;
        let rows: Vec<GalleryRow> = result.take(0)?;
        Ok(rows.into_iter().map(GalleryRow::into_item).collect())
    }

    async fn insert_gallery_item(&self, create: GalleryItemCreate) -> StoreResult<GalleryItem> {
        let next_order = self
            .list_gallery()
            .await?
            .iter()
            .map(|item| item.display_order)
            .max()
            .unwrap_or(0)
            + 1;

        let id = snowflake_id().to_string();
        let record = GalleryRecord {
            file_url: create.file_url,
            file_name: create.file_name,
            file_type: create.file_type,
            display_order: next_order,
            created_at: now_millis(),
        };

        let created: Option<GalleryRecord> = self
            .db
            .create((GALLERY_TABLE, id.as_str()))
            .content(record)
            .await?;
        let created =
            created.ok_or_else(|| StoreError::Storage("Failed to create gallery item".to_string()))?;

        Ok(GalleryItem {
            id,
            file_url: created.file_url,
            file_name: created.file_name,
            file_type: created.file_type,
            display_order: created.display_order,
            created_at: created.created_at,
        })
    }

    async fn update_gallery_item(
        &self,
        id: &str,
        patch: GalleryItemPatch,
    ) -> StoreResult<GalleryItem> {
        let existing: Option<GalleryRecord> = self.db.select((GALLERY_TABLE, id)).await?;
        if existing.is_none() {
            return Err(Self::gallery_not_found(id));
        }

        let updated: Option<GalleryRecord> = self
            .db
            .update((GALLERY_TABLE, id))
            .merge(patch)
            .await?;
        let updated = updated.ok_or_else(|| Self::gallery_not_found(id))?;

        Ok(GalleryItem {
            id: id.to_string(),
            file_url: updated.file_url,
            file_name: updated.file_name,
            file_type: updated.file_type,
            display_order: updated.display_order,
            created_at: updated.created_at,
        })
    }

    async fn delete_gallery_item(&self, id: &str) -> StoreResult<()> {
        let deleted: Option<GalleryRecord> = self.db.delete((GALLERY_TABLE, id)).await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Self::gallery_not_found(id)),
        }
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<SettingsChange>> {
        Some(self.feed.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_store() -> SurrealStore {
        SurrealStore::open_in_memory().await.unwrap()
    }

    fn video_create(name: &str) -> GalleryItemCreate {
        GalleryItemCreate {
            file_url: format!("https://cdn.example.com/{name}.mp4"),
            file_name: name.to_string(),
            file_type: MediaKind::Video,
        }
    }

    #[tokio::test]
    async fn test_settings_singleton_lifecycle() {
        let store = create_test_store().await;
        assert!(store.get_settings().await.unwrap().is_none());

        let created = store.get_or_create_settings().await.unwrap();
        assert_eq!(created.id, "main");
        assert_eq!(created.prices.weekday, 400);

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
        assert_eq!(updated.timings, created.timings);
    }

    #[tokio::test]
    async fn test_settings_writes_are_published_on_the_feed() {
        let store = create_test_store().await;
        let mut rx = store.subscribe().unwrap();

        store.get_or_create_settings().await.unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.version, 1);
        assert_eq!(change.action, ChangeAction::Created);

        store
            .update_settings(ParkSettingsUpdate {
                prices: Some(Prices {
                    weekday: 380,
                    weekend: 520,
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.version, 2);
        assert_eq!(change.action, ChangeAction::Updated);
        assert_eq!(change.settings.prices.weekday, 380);
    }

    #[tokio::test]
    async fn test_display_order_assignment_and_listing() {
        let store = create_test_store().await;

        let a = store.insert_gallery_item(video_create("tour")).await.unwrap();
        let b = store.insert_gallery_item(video_create("slides")).await.unwrap();
        assert_eq!(a.display_order, 1);
        assert_eq!(b.display_order, 2);

        let items = store.list_gallery().await.unwrap();
        assert_eq!(
            items.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec![a.id.as_str(), b.id.as_str()]
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_gallery_id() {
        let store = create_test_store().await;
        let err = store.delete_gallery_item("12345").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
