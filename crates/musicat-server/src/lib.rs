//! HTTP surface of the music catalog: report downloads, admin overview and
//! the listener endpoints that feed the report's aggregates.

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use auth::capabilities::Capability;
use musicat_db::AppState;

pub mod api;
pub mod auth;

#[derive(Serialize)]
struct ApiStatus {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router.
///
/// `rate_limit_reports` throttles report generation per client IP; it needs
/// the router to be served with `into_make_service_with_connect_info`.
pub fn router(state: Arc<AppState>, rate_limit_reports: bool) -> Router {
    let mut reports = Router::new()
        .route("/report", get(api::reports::download_report))
        .route("/report/summary", get(api::reports::report_summary))
        .layer(axum_middleware::from_fn_with_state(
            (state.clone(), Capability::GenerateReports),
            auth::middleware::require_capability,
        ));

    if rate_limit_reports {
        // One report every 12 seconds per IP, bursts of 5
        match GovernorConfigBuilder::default()
            .per_second(12)
            .burst_size(5)
            .finish()
        {
            Some(conf) => reports = reports.layer(GovernorLayer::new(Arc::new(conf))),
            None => tracing::warn!("invalid report rate limit configuration, not limiting"),
        }
    }

    let admin = Router::new()
        .route("/stats", get(api::admin::get_stats))
        .layer(axum_middleware::from_fn_with_state(
            (state.clone(), Capability::ViewAdminStats),
            auth::middleware::require_capability,
        ))
        .merge(reports);

    // Listener activity (auth required)
    let protected_api = Router::new()
        .route("/tracks/{id}/rating", post(api::ratings::rate_track))
        .route("/albums/{id}/rating", post(api::ratings::rate_album))
        .route("/tracks/{id}/comments", post(api::comments::add_comment))
        .route("/comments/{id}", delete(api::comments::delete_comment))
        .route("/playlists", post(api::playlists::create_playlist))
        .route(
            "/playlists/{id}",
            patch(api::playlists::update_playlist).delete(api::playlists::delete_playlist),
        )
        .route(
            "/playlists/{id}/tracks",
            post(api::playlists::add_track_to_playlist),
        )
        .route(
            "/playlists/{id}/tracks/{track_id}",
            delete(api::playlists::remove_track_from_playlist),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let api_routes = Router::new()
        .route("/tracks", get(api::tracks::list_tracks))
        .route("/tracks/{id}/play", post(api::tracks::record_play))
        .merge(protected_api)
        .nest("/admin", admin);

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
