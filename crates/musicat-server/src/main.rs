use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use musicat_db::AppState;

const DEV_JWT_SECRET: &str = "dev-secret-change-me-in-production";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Database connection
    let db_config = musicat_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = musicat_db::connect(&db_config)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("running database migrations...");
    musicat_migration::Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    tracing::info!("migrations complete");

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());

    // SECURITY: tokens signed with the fallback secret can be forged by anyone
    if jwt_secret == DEV_JWT_SECRET {
        tracing::error!(
            "JWT_SECRET is not set, falling back to a known development value. \
             Set JWT_SECRET to a strong random string in production."
        );
        if std::env::var("MUSICAT_ENV").unwrap_or_default() == "production" {
            panic!("Refusing to start: JWT_SECRET must be set to a secure value in production.");
        }
    }

    let report_page =
        std::env::var("REPORT_PAGE_PATH").unwrap_or_else(|_| "/admin/reports".to_string());

    let state = Arc::new(AppState {
        db,
        jwt_secret,
        report_page,
    });

    let app = musicat_server::router(state, true);

    let addr: SocketAddr = std::env::var("MUSICAT_BIND")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
    tracing::info!(%addr, "server started");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
