//! Settings API Handlers
//!
//! Direct partial updates plus the per-section edit session flow
//! (start → draft → save | cancel). Everything here sits behind the admin
//! token middleware.

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use shared::models::{ParkSettings, ParkSettingsUpdate, Timings};

use crate::auth::CurrentUser;
use crate::content::{Section, SectionDraft};
use crate::core::ServerState;
use crate::utils::validation::{MAX_NAME_LEN, MAX_TIME_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};

fn parse_section(raw: &str) -> AppResult<Section> {
    Section::parse(raw)
        .ok_or_else(|| AppError::invalid(format!("Unknown settings section '{}'", raw)))
}

fn validate_timings(timings: &Timings) -> AppResult<()> {
    validate_required_text(&timings.open_time, "open time", MAX_TIME_LEN)?;
    validate_required_text(&timings.close_time, "close time", MAX_TIME_LEN)?;
    validate_required_text(&timings.days, "days", MAX_NAME_LEN)?;
    Ok(())
}

/// Merge a partial update into the committed settings
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ParkSettingsUpdate>,
) -> AppResult<Json<ParkSettings>> {
    if payload.is_empty() {
        return Err(AppError::validation("Update payload is empty".to_string()));
    }
    if let Some(timings) = &payload.timings {
        validate_timings(timings)?;
    }

    let settings = state.content.update_settings(payload).await?;
    tracing::info!(username = %user.username, "Park settings updated");
    Ok(Json(settings))
}

/// Start editing a section; returns the seeded draft
pub async fn start_edit(
    State(state): State<ServerState>,
    Path(section): Path<String>,
) -> AppResult<Json<AppResponse<SectionDraft>>> {
    let section = parse_section(&section)?;
    let draft = state.edit.start(section).await?;
    Ok(ok(draft))
}

/// Replace the draft of a section being edited
pub async fn set_draft(
    State(state): State<ServerState>,
    Path(section): Path<String>,
    Json(draft): Json<SectionDraft>,
) -> AppResult<Json<AppResponse<()>>> {
    let section = parse_section(&section)?;
    if let SectionDraft::Timings(timings) = &draft {
        validate_timings(timings)?;
    }
    state.edit.set_draft(section, draft).await?;
    Ok(ok(()))
}

/// Save the draft; on failure the draft is kept and the session stays
/// editable
pub async fn save(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(section): Path<String>,
) -> AppResult<Json<ParkSettings>> {
    let section = parse_section(&section)?;
    let settings = state.edit.save(section).await?;
    tracing::info!(username = %user.username, section = %section, "Settings section saved");
    Ok(Json(settings))
}

/// Discard the draft and return the section to viewing
pub async fn cancel(
    State(state): State<ServerState>,
    Path(section): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    let section = parse_section(&section)?;
    state.edit.cancel(section).await;
    Ok(ok(()))
}
