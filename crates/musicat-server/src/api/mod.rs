pub mod admin;
pub mod comments;
pub mod playlists;
pub mod ratings;
pub mod reports;
pub mod tracks;

use axum::http::StatusCode;
use sea_orm::DbErr;

/// Map a storage failure to the handler error shape.
pub(crate) fn db_error(e: DbErr) -> (StatusCode, String) {
    tracing::error!(error = %e, "database error");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}"))
}
