use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::capabilities::{has_capability, Capability};
use crate::auth::middleware::{current_role, AuthUser};
use musicat_db::entities::{comment, track};
use musicat_db::AppState;

pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub track_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            track_id: c.track_id,
            user_id: c.user_id,
            text: c.text,
            created_at: c.created_at,
        }
    }
}

pub fn normalize_comment(text: &str) -> Result<String, (StatusCode, String)> {
    let text = text.trim();
    if text.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Comment cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Comment cannot exceed {MAX_COMMENT_CHARS} characters"),
        ));
    }
    Ok(text.to_string())
}

/// POST /api/tracks/:id/comments (auth required)
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(track_id): Path<Uuid>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), (StatusCode, String)> {
    let text = normalize_comment(&body.text)?;

    track::Entity::find_by_id(track_id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Track not found".to_string()))?;

    let created = comment::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(auth_user.0.sub),
        track_id: Set(track_id),
        text: Set(text),
        created_at: Set(chrono::Utc::now().fixed_offset()),
    }
    .insert(&state.db)
    .await
    .map_err(super::db_error)?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(created))))
}

/// DELETE /api/comments/:id (author, or a comment moderator)
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let existing = comment::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Comment not found".to_string()))?;

    if existing.user_id != auth_user.0.sub {
        let can_moderate = current_role(&state, auth_user.0.sub)
            .await
            .is_some_and(|role| has_capability(role, Capability::ModerateComments));
        if !can_moderate {
            return Err((StatusCode::FORBIDDEN, "Not your comment".to_string()));
        }
        tracing::info!(
            moderator = %auth_user.0.sub,
            comment_id = %id,
            "comment removed by moderator"
        );
    }

    existing.delete(&state.db).await.map_err(super::db_error)?;

    Ok(StatusCode::NO_CONTENT)
}
