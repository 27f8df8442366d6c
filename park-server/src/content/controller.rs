//! Edit flow controller
//!
//! Glues the per-section sessions to the sync service. Handlers never talk
//! to [`SectionSessions`] directly; every transition goes through here so
//! the draft-restore-on-failure rule holds everywhere.

use tokio::sync::Mutex;

use shared::models::ParkSettings;

use crate::store::{StoreError, StoreResult};

use super::service::ContentService;
use super::session::{Section, SectionDraft, SectionSessions};

/// Controller for the admin edit flow
pub struct EditController {
    service: ContentService,
    sessions: Mutex<SectionSessions>,
}

impl EditController {
    pub fn new(service: ContentService) -> Self {
        Self {
            service,
            sessions: Mutex::new(SectionSessions::new()),
        }
    }

    pub fn service(&self) -> &ContentService {
        &self.service
    }

    /// Start editing a section; the draft is seeded from the committed
    /// settings, never from an earlier abandoned draft
    pub async fn start(&self, section: Section) -> StoreResult<SectionDraft> {
        let committed = self.service.settings().await.ok_or(StoreError::NotLoaded)?;
        Ok(self.sessions.lock().await.start(section, &committed))
    }

    /// Replace a section's draft
    pub async fn set_draft(&self, section: Section, draft: SectionDraft) -> StoreResult<()> {
        self.sessions
            .lock()
            .await
            .set_draft(section, draft)
            .map_err(StoreError::Validation)
    }

    pub async fn draft(&self, section: Section) -> Option<SectionDraft> {
        self.sessions.lock().await.draft(section)
    }

    pub async fn is_editing(&self, section: Section) -> bool {
        self.sessions.lock().await.is_editing(section)
    }

    /// Discard the draft; affects only future edits, never an in-flight save
    pub async fn cancel(&self, section: Section) {
        self.sessions.lock().await.cancel(section);
    }

    /// Save a section's draft.
    ///
    /// The draft is taken before the write, which removes the save
    /// affordance for the section while the call is outstanding. On failure
    /// the draft is restored and the error propagates; the committed value
    /// is untouched.
    pub async fn save(&self, section: Section) -> StoreResult<ParkSettings> {
        let draft = self
            .sessions
            .lock()
            .await
            .take_draft(section)
            .ok_or_else(|| {
                StoreError::Validation(format!("Section '{}' is not being edited", section))
            })?;

        match self
            .service
            .update_settings(draft.clone().into_update())
            .await
        {
            Ok(settings) => Ok(settings),
            Err(e) => {
                self.sessions.lock().await.restore(section, draft);
                Err(e)
            }
        }
    }

    /// Drop every draft (admin logout)
    pub async fn reset_all(&self) {
        self.sessions.lock().await.reset_all();
    }
}
