use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::{
    sea_query::{Expr, Func, IntoColumnRef, SimpleExpr},
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use musicat_db::entities::{album, artist, genre, group, track, track_genre};
use musicat_db::AppState;

pub const TRACKS_PER_PAGE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct TrackListParams {
    /// Matched against track, album, artist, group and genre names.
    pub q: Option<String>,
    /// Exact genre name.
    pub genre: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: Uuid,
    pub name: String,
    pub album_id: Option<Uuid>,
    pub duration_secs: Option<i32>,
    pub play_count: i64,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<track::Model> for TrackResponse {
    fn from(t: track::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            album_id: t.album_id,
            duration_secs: t.duration_secs,
            play_count: t.play_count,
            created_at: t.created_at,
        }
    }
}

/// Case-insensitive substring pattern for `q`, or `None` for a blank query.
/// LIKE wildcards typed by the user match literally.
fn like_pattern(q: &str) -> Option<String> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    let escaped = q
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

/// Out-of-range pages fall back to the nearest existing one.
fn clamp_page(requested: Option<u64>, total_pages: u64) -> u64 {
    requested.unwrap_or(1).clamp(1, total_pages.max(1))
}

fn lower_like(col: impl IntoColumnRef, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

/// Tracks whose own name, album, album performer or any genre matches.
fn search_condition(pattern: &str) -> Condition {
    let artists = artist::Entity::find()
        .select_only()
        .column(artist::Column::Id)
        .filter(lower_like((artist::Entity, artist::Column::Name), pattern))
        .into_query();
    let groups = group::Entity::find()
        .select_only()
        .column(group::Column::Id)
        .filter(lower_like((group::Entity, group::Column::Name), pattern))
        .into_query();
    let albums = album::Entity::find()
        .select_only()
        .column(album::Column::Id)
        .filter(
            Condition::any()
                .add(lower_like((album::Entity, album::Column::Name), pattern))
                .add(album::Column::ArtistId.in_subquery(artists))
                .add(album::Column::GroupId.in_subquery(groups)),
        )
        .into_query();
    let tagged = track_genre::Entity::find()
        .select_only()
        .column(track_genre::Column::TrackId)
        .inner_join(genre::Entity)
        .filter(lower_like((genre::Entity, genre::Column::Name), pattern))
        .into_query();

    Condition::any()
        .add(lower_like((track::Entity, track::Column::Name), pattern))
        .add(track::Column::AlbumId.in_subquery(albums))
        .add(track::Column::Id.in_subquery(tagged))
}

fn in_genre(name: &str) -> SimpleExpr {
    let tagged = track_genre::Entity::find()
        .select_only()
        .column(track_genre::Column::TrackId)
        .inner_join(genre::Entity)
        .filter(genre::Column::Name.eq(name))
        .into_query();
    track::Column::Id.in_subquery(tagged)
}

fn track_list_query(params: &TrackListParams) -> sea_orm::Select<track::Entity> {
    let mut query = track::Entity::find();
    if let Some(pattern) = params.q.as_deref().and_then(like_pattern) {
        query = query.filter(search_condition(&pattern));
    }
    if let Some(name) = params.genre.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        query = query.filter(in_genre(name));
    }
    query
        .order_by_desc(track::Column::CreatedAt)
        .order_by_desc(track::Column::Id)
}

/// GET /api/tracks?q=&genre=&page=
pub async fn list_tracks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrackListParams>,
) -> Result<Json<PaginatedResponse<TrackResponse>>, (StatusCode, String)> {
    let paginator = track_list_query(&params).paginate(&state.db, TRACKS_PER_PAGE);

    let total = paginator.num_items().await.map_err(super::db_error)?;
    let total_pages = total.div_ceil(TRACKS_PER_PAGE);
    let page = clamp_page(params.page, total_pages);

    let tracks = paginator
        .fetch_page(page - 1)
        .await
        .map_err(super::db_error)?;

    Ok(Json(PaginatedResponse {
        data: tracks.into_iter().map(TrackResponse::from).collect(),
        total,
        page,
        per_page: TRACKS_PER_PAGE,
        total_pages,
    }))
}

#[derive(Debug, Serialize)]
pub struct PlayCountResponse {
    pub track_id: Uuid,
    pub play_count: i64,
}

/// POST /api/tracks/:id/play
///
/// Anonymous listens count too.
pub async fn record_play(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayCountResponse>, (StatusCode, String)> {
    // Single UPDATE so concurrent plays are never lost.
    let result = track::Entity::update_many()
        .col_expr(
            track::Column::PlayCount,
            Expr::col(track::Column::PlayCount).add(1),
        )
        .filter(track::Column::Id.eq(id))
        .exec(&state.db)
        .await
        .map_err(super::db_error)?;

    if result.rows_affected == 0 {
        return Err((StatusCode::NOT_FOUND, "Track not found".to_string()));
    }

    let updated = track::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(super::db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Track not found".to_string()))?;

    Ok(Json(PlayCountResponse {
        track_id: id,
        play_count: updated.play_count,
    }))
}
