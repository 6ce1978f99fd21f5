use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use musicat_db::entities::{playlist, playlist_track, track};
use musicat_db::AppState;

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub is_public: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<playlist::Model> for PlaylistResponse {
    fn from(p: playlist::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            user_id: p.user_id,
            is_public: p.is_public,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Playlists are public unless created otherwise.
pub const DEFAULT_IS_PUBLIC: bool = true;

fn playlist_name(raw: &str) -> Result<String, (StatusCode, String)> {
    let name = raw.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Playlist name is required".to_string()));
    }
    Ok(name.to_string())
}

/// Position for a track appended after `positions`.
fn next_position(positions: impl IntoIterator<Item = i32>) -> i32 {
    positions.into_iter().max().map_or(0, |max| max + 1)
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PlaylistEntryResponse {
    pub playlist_id: Uuid,
    pub track_id: Uuid,
    pub position: i32,
}

/// Load a playlist and make sure the caller owns it.
async fn owned_playlist(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<playlist::Model, (StatusCode, String)> {
    let playlist_model = playlist::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Playlist not found".to_string()))?;

    if playlist_model.user_id != user_id {
        return Err((StatusCode::FORBIDDEN, "Not your playlist".to_string()));
    }
    Ok(playlist_model)
}

/// POST /api/playlists (auth required)
pub async fn create_playlist(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Json(body): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<PlaylistResponse>), (StatusCode, String)> {
    let name = playlist_name(&body.name)?;

    let new_playlist = playlist::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(auth_user.0.sub),
        name: Set(name),
        description: Set(body.description),
        is_public: Set(body.is_public.unwrap_or(DEFAULT_IS_PUBLIC)),
        created_at: Set(chrono::Utc::now().fixed_offset()),
    };

    let created = new_playlist
        .insert(&state.db)
        .await
        .map_err(super::db_error)?;

    Ok((StatusCode::CREATED, Json(PlaylistResponse::from(created))))
}

/// PATCH /api/playlists/:id (owner only)
pub async fn update_playlist(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePlaylistRequest>,
) -> Result<Json<PlaylistResponse>, (StatusCode, String)> {
    let name = body.name.as_deref().map(playlist_name).transpose()?;
    let existing = owned_playlist(&state, id, auth_user.0.sub).await?;

    let mut active: playlist::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = body.description {
        let description = description.trim().to_string();
        active.description = Set((!description.is_empty()).then_some(description));
    }
    if let Some(is_public) = body.is_public {
        active.is_public = Set(is_public);
    }

    let updated = active.update(&state.db).await.map_err(super::db_error)?;

    Ok(Json(PlaylistResponse::from(updated)))
}

/// DELETE /api/playlists/:id (owner only)
///
/// Entries go with the playlist; the tracks themselves stay.
pub async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let existing = owned_playlist(&state, id, auth_user.0.sub).await?;

    existing.delete(&state.db).await.map_err(super::db_error)?;

    tracing::debug!(playlist_id = %id, "playlist deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/playlists/:id/tracks (owner only)
pub async fn add_track_to_playlist(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddTrackRequest>,
) -> Result<(StatusCode, Json<PlaylistEntryResponse>), (StatusCode, String)> {
    owned_playlist(&state, id, auth_user.0.sub).await?;

    track::Entity::find_by_id(body.track_id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Track not found".to_string()))?;

    let existing = playlist_track::Entity::find_by_id((id, body.track_id))
        .one(&state.db)
        .await
        .map_err(super::db_error)?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            "Track is already in this playlist".to_string(),
        ));
    }

    // Append after the current last entry; removals leave gaps.
    let position = next_position(
        playlist_track::Entity::find()
            .filter(playlist_track::Column::PlaylistId.eq(id))
            .all(&state.db)
            .await
            .map_err(super::db_error)?
            .iter()
            .map(|pt| pt.position),
    );

    playlist_track::ActiveModel {
        playlist_id: Set(id),
        track_id: Set(body.track_id),
        position: Set(position),
        added_at: Set(chrono::Utc::now().fixed_offset()),
    }
    .insert(&state.db)
    .await
    .map_err(super::db_error)?;

    Ok((
        StatusCode::CREATED,
        Json(PlaylistEntryResponse {
            playlist_id: id,
            track_id: body.track_id,
            position,
        }),
    ))
}

/// DELETE /api/playlists/:id/tracks/:track_id (owner only)
pub async fn remove_track_from_playlist(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path((id, track_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    owned_playlist(&state, id, auth_user.0.sub).await?;

    let entry = playlist_track::Entity::find_by_id((id, track_id))
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Track is not in this playlist".to_string(),
        ))?;

    entry.delete(&state.db).await.map_err(super::db_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_playlist_request_optional_fields() {
        let body: CreatePlaylistRequest =
            serde_json::from_str(r#"{"name":"Road trip"}"#).unwrap();
        assert_eq!(body.name, "Road trip");
        assert!(body.description.is_none());
        assert!(body.is_public.is_none());
    }

    #[test]
    fn test_add_track_request_requires_uuid() {
        assert!(serde_json::from_str::<AddTrackRequest>(r#"{"track_id":"nope"}"#).is_err());
        let id = Uuid::new_v4();
        let body: AddTrackRequest =
            serde_json::from_str(&format!(r#"{{"track_id":"{id}"}}"#)).unwrap();
        assert_eq!(body.track_id, id);
    }

    #[test]
    fn test_playlist_response_from_model() {
        let model = playlist::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Late night".into(),
            description: Some("slow ones".into()),
            is_public: true,
            created_at: chrono::Utc::now().fixed_offset(),
        };
        let resp = PlaylistResponse::from(model.clone());
        assert_eq!(resp.id, model.id);
        assert_eq!(resp.user_id, model.user_id);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["name"], "Late night");
        assert_eq!(json["is_public"], true);
    }

    #[test]
    fn test_next_position_after_removal() {
        assert_eq!(next_position(Vec::<i32>::new()), 0);

        let mut positions = vec![0, 1, 2];
        positions.retain(|&p| p != 0);
        let appended = next_position(positions.iter().copied());
        assert_eq!(appended, 3);
        assert!(!positions.contains(&appended));

        positions.push(appended);
        positions.retain(|&p| p != 3);
        assert_eq!(next_position(positions), 3);
    }

    #[test]
    fn test_playlist_name_trimmed_and_required() {
        assert_eq!(playlist_name("  Focus  ").unwrap(), "Focus");
        assert_eq!(playlist_name("   ").unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let body: UpdatePlaylistRequest = serde_json::from_str(r#"{"is_public":false}"#).unwrap();
        assert!(body.name.is_none());
        assert!(body.description.is_none());
        assert_eq!(body.is_public, Some(false));
    }

    #[test]
    fn test_new_playlists_are_public_by_default() {
        let body: CreatePlaylistRequest = serde_json::from_str(r#"{"name":"Mix"}"#).unwrap();
        assert!(body.is_public.unwrap_or(DEFAULT_IS_PUBLIC));
    }
}
