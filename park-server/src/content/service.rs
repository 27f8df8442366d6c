//! 内容同步服务
//!
//! 设置与图库状态的唯一权威副本。所有展示层读取、所有管理端写入都经由
//! 本服务，保证乐观更新、写入确认与推送通知之间的一致性。
//!
//! # 同步模型
//!
//! | 模式 | 判定 | 确认状态的写入方 |
//! |------|------|------------------|
//! | direct | 后端无变更通道 | 写入调用自身 (store 返回的确认记录) |
//! | realtime | 后端有变更通道 | 推送监听任务 (last writer wins) |
//!
//! 两条路径都汇入唯一入口 [`ContentService::apply_settings`]，避免
//! 乐观替换与推送通知重复应用同一变更。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use shared::message::SettingsChange;
use shared::models::{
    GalleryItem, GalleryItemCreate, GalleryItemPatch, MediaKind, ParkSettings, ParkSettingsUpdate,
};

use crate::media::{MediaStorage, validate_media_url};
use crate::store::{ContentStore, StoreError, StoreResult};

/// Where a new gallery item comes from
#[derive(Debug, Clone)]
pub enum GalleryItemSource {
    /// An external or site-relative URL (including data URIs)
    Url {
        url: String,
        file_name: String,
        file_type: MediaKind,
    },
    /// Raw bytes uploaded by the admin; stored via [`MediaStorage`]
    Upload { file_name: String, data: Vec<u8> },
}

/// Point-in-time view of the content state
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContentSnapshot {
    pub settings: Option<ParkSettings>,
    pub gallery: Vec<GalleryItem>,
    pub loading: bool,
    pub error: Option<String>,
}

struct ServiceInner {
    store: Arc<dyn ContentStore>,
    media: MediaStorage,
    settings: RwLock<Option<ParkSettings>>,
    gallery: RwLock<Vec<GalleryItem>>,
    loading: AtomicBool,
    error: RwLock<Option<String>>,
    /// true when the store carries a change feed; confirmed settings state
    /// is then only ever written by the push listener
    realtime: bool,
    last_applied_version: AtomicU64,
    shutdown: CancellationToken,
}

/// Content synchronization service
#[derive(Clone)]
pub struct ContentService {
    inner: Arc<ServiceInner>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, media: MediaStorage) -> Self {
        let realtime = store.subscribe().is_some();
        Self {
            inner: Arc::new(ServiceInner {
                store,
                media,
                settings: RwLock::new(None),
                gallery: RwLock::new(Vec::new()),
                loading: AtomicBool::new(false),
                error: RwLock::new(None),
                realtime,
                last_applied_version: AtomicU64::new(0),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Whether confirmed settings state is driven by push notifications
    pub fn is_realtime(&self) -> bool {
        self.inner.realtime
    }

    /// Spawn the push listener task, if the store has a change feed.
    ///
    /// Inbound notifications are applied unconditionally; the feed is the
    /// last-writer-wins authority for the settings record.
    pub fn start_listener(&self) {
        let Some(mut rx) = self.inner.store.subscribe() else {
            return;
        };

        let service = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = service.inner.shutdown.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(change) => service.apply_push(change).await,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            // Missed intermediate versions; the next change
                            // still carries the full record
                            tracing::warn!(skipped, "Settings change feed lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("Settings change listener stopped");
        });
    }

    /// Stop the push listener
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Load settings (creating defaults if absent) and gallery concurrently.
    ///
    /// On any failure the previous state is left untouched and the error is
    /// both recorded and returned.
    pub async fn load(&self) -> StoreResult<()> {
        self.inner.loading.store(true, Ordering::SeqCst);
        let result = self.load_inner().await;
        self.inner.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                self.clear_error().await;
                Ok(())
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    async fn load_inner(&self) -> StoreResult<()> {
        let (settings, gallery) = tokio::join!(
            self.inner.store.get_or_create_settings(),
            self.inner.store.list_gallery(),
        );
        let settings = settings?;
        let gallery = gallery?;

        // Commit both or neither
        *self.inner.settings.write().await = Some(settings);
        *self.inner.gallery.write().await = gallery;
        Ok(())
    }

    /// Merge a partial update into the committed settings.
    ///
    /// Fails fast (no store I/O) when nothing is loaded yet. In realtime
    /// mode local state is left alone; the authoritative copy arrives via
    /// the push listener.
    pub async fn update_settings(
        &self,
        update: ParkSettingsUpdate,
    ) -> StoreResult<ParkSettings> {
        if self.inner.settings.read().await.is_none() {
            let e = StoreError::NotLoaded;
            self.record_error(&e).await;
            return Err(e);
        }

        match self.inner.store.update_settings(update).await {
            Ok(confirmed) => {
                if !self.inner.realtime {
                    self.apply_settings(confirmed.clone()).await;
                }
                self.clear_error().await;
                Ok(confirmed)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Add a gallery item from an upload or a URL.
    ///
    /// Validation runs before any I/O. If the record insert fails after an
    /// upload already landed, the orphaned file is deleted best-effort.
    pub async fn add_item(&self, source: GalleryItemSource) -> StoreResult<GalleryItem> {
        let result = self.add_item_inner(source).await;
        match result {
            Ok(item) => {
                self.clear_error().await;
                Ok(item)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    async fn add_item_inner(&self, source: GalleryItemSource) -> StoreResult<GalleryItem> {
        let (create, uploaded_url) = match source {
            GalleryItemSource::Url {
                url,
                file_name,
                file_type,
            } => {
                validate_media_url(&url)?;
                (
                    GalleryItemCreate {
                        file_url: url,
                        file_name,
                        file_type,
                    },
                    None,
                )
            }
            GalleryItemSource::Upload { file_name, data } => {
                let file_type = self.inner.media.validate(&file_name, data.len())?;
                let url = self.inner.media.store(&file_name, &data).await?;
                (
                    GalleryItemCreate {
                        file_url: url.clone(),
                        file_name,
                        file_type,
                    },
                    Some(url),
                )
            }
        };

        match self.inner.store.insert_gallery_item(create).await {
            Ok(item) => {
                let mut gallery = self.inner.gallery.write().await;
                gallery.push(item.clone());
                gallery.sort_by_key(|i| (i.display_order, i.created_at));
                Ok(item)
            }
            Err(e) => {
                // Clean up the file the failed insert orphaned
                if let Some(url) = uploaded_url {
                    self.inner.media.delete(&url).await;
                }
                Err(e)
            }
        }
    }

    /// Patch an existing gallery item (rename, reorder), re-sorting the
    /// collection when the order changed.
    pub async fn update_item(
        &self,
        id: &str,
        patch: GalleryItemPatch,
    ) -> StoreResult<GalleryItem> {
        match self.inner.store.update_gallery_item(id, patch).await {
            Ok(updated) => {
                let mut gallery = self.inner.gallery.write().await;
                if let Some(slot) = gallery.iter_mut().find(|item| item.id == id) {
                    *slot = updated.clone();
                }
                gallery.sort_by_key(|i| (i.display_order, i.created_at));
                self.clear_error().await;
                Ok(updated)
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Remove a gallery item by id.
    ///
    /// The backing file of an uploaded item is deleted best-effort first;
    /// an unknown id surfaces `NotFound` and leaves state unchanged.
    pub async fn remove_item(&self, id: &str) -> StoreResult<()> {
        let backing_url = self
            .inner
            .gallery
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.file_url.clone());

        if let Some(url) = backing_url
            && self.inner.media.is_managed(&url)
        {
            self.inner.media.delete(&url).await;
        }

        match self.inner.store.delete_gallery_item(id).await {
            Ok(()) => {
                self.inner.gallery.write().await.retain(|item| item.id != id);
                self.clear_error().await;
                Ok(())
            }
            Err(e) => {
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// 确认状态的唯一写入口，写入确认路径与推送路径都经此落地
    pub async fn apply_settings(&self, confirmed: ParkSettings) {
        *self.inner.settings.write().await = Some(confirmed);
    }

    async fn apply_push(&self, change: SettingsChange) {
        self.inner
            .last_applied_version
            .fetch_max(change.version, Ordering::SeqCst);
        tracing::debug!(version = change.version, action = ?change.action, "Applying settings push");
        self.apply_settings(change.settings).await;
    }

    /// Version of the most recent push applied (0 before the first one)
    pub fn last_applied_version(&self) -> u64 {
        self.inner.last_applied_version.load(Ordering::SeqCst)
    }

    /// Committed settings, or None before the first successful load
    pub async fn settings(&self) -> Option<ParkSettings> {
        self.inner.settings.read().await.clone()
    }

    /// Current gallery items, display order ascending
    pub async fn gallery(&self) -> Vec<GalleryItem> {
        self.inner.gallery.read().await.clone()
    }

    pub async fn snapshot(&self) -> ContentSnapshot {
        ContentSnapshot {
            settings: self.settings().await,
            gallery: self.gallery().await,
            loading: self.inner.loading.load(Ordering::SeqCst),
            error: self.inner.error.read().await.clone(),
        }
    }

    async fn record_error(&self, e: &StoreError) {
        *self.inner.error.write().await = Some(e.to_string());
    }

    async fn clear_error(&self) {
        *self.inner.error.write().await = None;
    }
}
