pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_artists_and_groups;
mod m20240101_000003_create_albums;
mod m20240101_000004_create_genres;
mod m20240101_000005_create_tracks;
mod m20240101_000006_create_playlists;
mod m20240101_000007_create_ratings;
mod m20240101_000008_create_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_artists_and_groups::Migration),
            Box::new(m20240101_000003_create_albums::Migration),
            Box::new(m20240101_000004_create_genres::Migration),
            Box::new(m20240101_000005_create_tracks::Migration),
            Box::new(m20240101_000006_create_playlists::Migration),
            Box::new(m20240101_000007_create_ratings::Migration),
            Box::new(m20240101_000008_create_comments::Migration),
        ]
    }
}
