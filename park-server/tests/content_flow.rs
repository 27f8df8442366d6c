//! End-to-end flows through a fully initialized server state:
//! load → edit session → save, gallery management, and the admin gate.

use std::time::Duration;

use park_server::{Config, Section, SectionDraft, ServerState, StorageBackend};
use shared::models::{MediaKind, Prices};

async fn test_state(backend: StorageBackend) -> (tempfile::TempDir, ServerState) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0, backend);
    let state = ServerState::initialize(&config).await.unwrap();
    (dir, state)
}

#[tokio::test]
async fn test_price_edit_flow_end_to_end() {
    let (_dir, state) = test_state(StorageBackend::Local).await;

    // Initial load happened during initialization
    let snapshot = state.content.snapshot().await;
    let settings = snapshot.settings.expect("settings loaded");
    assert_eq!(settings.prices.weekday, 400);
    assert_eq!(settings.prices.weekend, 500);

    // Admin opens the prices editor, changes weekday, saves
    let draft = state.edit.start(Section::Prices).await.unwrap();
    assert_eq!(draft, SectionDraft::Prices(Prices::default()));

    state
        .edit
        .set_draft(
            Section::Prices,
            SectionDraft::Prices(Prices {
                weekday: 350,
                weekend: 500,
            }),
        )
        .await
        .unwrap();
    let saved = state.edit.save(Section::Prices).await.unwrap();

    // Committed settings show the change, weekend untouched, session over
    assert_eq!(saved.prices.weekday, 350);
    assert_eq!(saved.prices.weekend, 500);
    assert!(!state.edit.is_editing(Section::Prices).await);

    let committed = state.content.settings().await.unwrap();
    assert_eq!(committed.prices.weekday, 350);
    assert!(committed.updated_at >= committed.created_at);
}

#[tokio::test]
async fn test_gallery_management_flow() {
    let (_dir, state) = test_state(StorageBackend::Local).await;

    let seeded = state.content.gallery().await;
    assert_eq!(seeded.len(), 3);

    let added = state
        .content
        .add_item(park_server::content::GalleryItemSource::Url {
            url: "https://cdn.example.com/new-slide.jpg".to_string(),
            file_name: "New Slide".to_string(),
            file_type: MediaKind::Image,
        })
        .await
        .unwrap();
    assert_eq!(added.display_order, 4);

    state.content.remove_item(&added.id).await.unwrap();
    assert_eq!(state.content.gallery().await.len(), 3);

    // Unknown ids fail loudly and change nothing
    assert!(state.content.remove_item(&added.id).await.is_err());
    assert_eq!(state.content.gallery().await.len(), 3);
}

#[tokio::test]
async fn test_admin_gate_and_session() {
    let (_dir, state) = test_state(StorageBackend::Local).await;

    // Five logo clicks reveal the login form
    {
        let mut gate = state.logo_gate.lock().unwrap();
        for _ in 0..4 {
            assert!(!gate.click());
        }
        assert!(gate.click());
        assert_eq!(gate.count(), 0);
    }

    // Default dev credentials: exact match only
    assert!(state.admin.verify("admin", "admin123"));
    assert!(!state.admin.verify("admin", "Admin123"));

    // Token roundtrip through the session service
    let token = state.jwt_service.generate_token("admin").unwrap();
    let claims = state.jwt_service.validate_token(&token).unwrap();
    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.role, "admin");
}

#[tokio::test]
async fn test_realtime_backend_applies_saves_via_push() {
    let (_dir, state) = test_state(StorageBackend::Surreal).await;
    assert!(state.content.is_realtime());

    state.edit.start(Section::Prices).await.unwrap();
    state
        .edit
        .set_draft(
            Section::Prices,
            SectionDraft::Prices(Prices {
                weekday: 375,
                weekend: 525,
            }),
        )
        .await
        .unwrap();
    state.edit.save(Section::Prices).await.unwrap();

    // Confirmed state lands through the change feed listener
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let settings = state.content.settings().await.unwrap();
            if settings.prices.weekday == 375 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("push update applied");

    assert!(state.content.last_applied_version() >= 1);
    state.shutdown();
}
