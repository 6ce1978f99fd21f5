//! One rating per user and item; rating again replaces the earlier value.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{sea_query::OnConflict, ColumnTrait, EntityTrait, Insert, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use musicat_db::entities::{
    album, album_rating, is_valid_rating, track, track_rating, RATING_MAX, RATING_MIN,
};
use musicat_db::AppState;

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub rating: i16,
    pub average_rating: Option<f64>,
    pub rating_count: usize,
}

/// Accept only integer ratings in the allowed range.
pub fn validate_rating(raw: i64) -> Result<i16, (StatusCode, String)> {
    i16::try_from(raw)
        .ok()
        .filter(|v| is_valid_rating(*v))
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("Rating must be between {RATING_MIN} and {RATING_MAX}"),
            )
        })
}

/// Insert a track rating, or overwrite the value of the existing one in the
/// same statement.
fn track_rating_upsert(
    user_id: Uuid,
    track_id: Uuid,
    value: i16,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Insert<track_rating::ActiveModel> {
    track_rating::Entity::insert(track_rating::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        track_id: Set(track_id),
        value: Set(value),
        rated_at: Set(now),
    })
    .on_conflict(
        OnConflict::columns([track_rating::Column::UserId, track_rating::Column::TrackId])
            .update_columns([track_rating::Column::Value, track_rating::Column::RatedAt])
            .to_owned(),
    )
}

fn album_rating_upsert(
    user_id: Uuid,
    album_id: Uuid,
    value: i16,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Insert<album_rating::ActiveModel> {
    album_rating::Entity::insert(album_rating::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        album_id: Set(album_id),
        value: Set(value),
        rated_at: Set(now),
    })
    .on_conflict(
        OnConflict::columns([album_rating::Column::UserId, album_rating::Column::AlbumId])
            .update_columns([album_rating::Column::Value, album_rating::Column::RatedAt])
            .to_owned(),
    )
}

fn mean(values: &[i16]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    Some(sum as f64 / values.len() as f64)
}

/// POST /api/tracks/:id/rating (auth required)
pub async fn rate_track(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(track_id): Path<Uuid>,
    Json(body): Json<RateRequest>,
) -> Result<Json<RatingResponse>, (StatusCode, String)> {
    let value = validate_rating(body.rating)?;
    let user_id = auth_user.0.sub;

    track::Entity::find_by_id(track_id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Track not found".to_string()))?;

    track_rating_upsert(user_id, track_id, value, chrono::Utc::now().fixed_offset())
        .exec_without_returning(&state.db)
        .await
        .map_err(super::db_error)?;

    let values: Vec<i16> = track_rating::Entity::find()
        .filter(track_rating::Column::TrackId.eq(track_id))
        .all(&state.db)
        .await
        .map_err(super::db_error)?
        .into_iter()
        .map(|r| r.value)
        .collect();

    tracing::debug!(user_id = %user_id, track_id = %track_id, value, "track rated");

    Ok(Json(RatingResponse {
        id: track_id,
        rating: value,
        average_rating: mean(&values),
        rating_count: values.len(),
    }))
}

/// POST /api/albums/:id/rating (auth required)
pub async fn rate_album(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(album_id): Path<Uuid>,
    Json(body): Json<RateRequest>,
) -> Result<Json<RatingResponse>, (StatusCode, String)> {
    let value = validate_rating(body.rating)?;
    let user_id = auth_user.0.sub;

    album::Entity::find_by_id(album_id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Album not found".to_string()))?;

    album_rating_upsert(user_id, album_id, value, chrono::Utc::now().fixed_offset())
        .exec_without_returning(&state.db)
        .await
        .map_err(super::db_error)?;

    let values: Vec<i16> = album_rating::Entity::find()
        .filter(album_rating::Column::AlbumId.eq(album_id))
        .all(&state.db)
        .await
        .map_err(super::db_error)?
        .into_iter()
        .map(|r| r.value)
        .collect();

    Ok(Json(RatingResponse {
        id: album_id,
        rating: value,
        average_rating: mean(&values),
        rating_count: values.len(),
    }))
}
