//! Gallery API Handlers
//!
//! Listing is public; adding (file upload or URL) and removal require the
//! admin token. Uploads arrive as multipart with the payload in a `file`
//! field.

use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
};
use serde::Deserialize;

use shared::models::{GalleryItem, GalleryItemPatch, MediaKind};

use crate::auth::CurrentUser;
use crate::content::GalleryItemSource;
use crate::core::ServerState;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Public gallery listing, display order ascending
pub async fn list(State(state): State<ServerState>) -> Json<Vec<GalleryItem>> {
    Json(state.content.gallery().await)
}

/// Add a gallery item from an uploaded file
pub async fn upload(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<GalleryItem>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") || name.is_none() {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(field.bytes().await?.to_vec());
            break;
        }
    }

    let data = file_data.ok_or_else(|| {
        AppError::validation("No 'file' field found. Field name must be 'file'".to_string())
    })?;
    let file_name = file_name
        .ok_or_else(|| AppError::validation("No filename provided in file field".to_string()))?;
    validate_required_text(&file_name, "file name", MAX_NAME_LEN)?;

    let item = state
        .content
        .add_item(GalleryItemSource::Upload { file_name, data })
        .await?;

    tracing::info!(
        username = %user.username,
        item_id = %item.id,
        file_type = %item.file_type,
        "Gallery item uploaded"
    );
    Ok(Json(item))
}

/// Request to add a gallery item by URL
#[derive(Debug, Deserialize)]
pub struct AddUrlRequest {
    pub url: String,
    pub file_name: String,
    pub file_type: MediaKind,
}

/// Add a gallery item pointing at an external URL or data URI
pub async fn add_from_url(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AddUrlRequest>,
) -> AppResult<Json<GalleryItem>> {
    validate_required_text(&req.file_name, "file name", MAX_NAME_LEN)?;

    let item = state
        .content
        .add_item(GalleryItemSource::Url {
            url: req.url,
            file_name: req.file_name,
            file_type: req.file_type,
        })
        .await?;

    tracing::info!(
        username = %user.username,
        item_id = %item.id,
        "Gallery item added from URL"
    );
    Ok(Json(item))
}

/// Rename or reorder an existing gallery item
pub async fn patch(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<GalleryItemPatch>,
) -> AppResult<Json<GalleryItem>> {
    validate_optional_text(&req.file_name, "file name", MAX_NAME_LEN)?;

    let item = state.content.update_item(&id, req).await?;
    tracing::info!(username = %user.username, item_id = %id, "Gallery item updated");
    Ok(Json(item))
}

/// Remove a gallery item; the backing file of an upload is cleaned up
/// best-effort
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    state.content.remove_item(&id).await?;

    tracing::info!(username = %user.username, item_id = %id, "Gallery item removed");
    Ok(ok(()))
}
