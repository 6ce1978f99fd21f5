use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde::Serialize;
use std::sync::Arc;

use musicat_db::entities::{album, artist, group, track};
use musicat_db::AppState;

// ─── Statistics ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_tracks: u64,
    pub total_albums: u64,
    pub total_artists: u64,
    pub total_groups: u64,
}

/// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminStats>, (StatusCode, String)> {
    let total_tracks = track::Entity::find()
        .count(&state.db)
        .await
        .map_err(super::db_error)?;

    let total_albums = album::Entity::find()
        .count(&state.db)
        .await
        .map_err(super::db_error)?;

    let total_artists = artist::Entity::find()
        .count(&state.db)
        .await
        .map_err(super::db_error)?;

    let total_groups = group::Entity::find()
        .count(&state.db)
        .await
        .map_err(super::db_error)?;

    Ok(Json(AdminStats {
        total_tracks,
        total_albums,
        total_artists,
        total_groups,
    }))
}
