//! Read-only view of the catalog, rating and user stores used by the
//! aggregation engine.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder};

use musicat_db::entities::{
    album, album_rating, artist, comment, genre, group, playlist, playlist_track, track,
    track_genre, track_rating, user,
};

/// Every row the report needs, loaded once per report run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub users: Vec<user::Model>,
    pub artists: Vec<artist::Model>,
    pub groups: Vec<group::Model>,
    pub albums: Vec<album::Model>,
    pub genres: Vec<genre::Model>,
    pub tracks: Vec<track::Model>,
    pub track_genres: Vec<track_genre::Model>,
    pub playlists: Vec<playlist::Model>,
    pub playlist_tracks: Vec<playlist_track::Model>,
    pub track_ratings: Vec<track_rating::Model>,
    pub album_ratings: Vec<album_rating::Model>,
    pub comments: Vec<comment::Model>,
}

/// Anything able to produce a [`CatalogSnapshot`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_snapshot(&self) -> Result<CatalogSnapshot, DbErr>;
}

#[async_trait]
impl CatalogSource for DatabaseConnection {
    async fn load_snapshot(&self) -> Result<CatalogSnapshot, DbErr> {
        // Each table is an independent read; no transaction spans them.
        let snapshot = CatalogSnapshot {
            users: user::Entity::find()
                .order_by_asc(user::Column::Id)
                .all(self)
                .await?,
            artists: artist::Entity::find()
                .order_by_asc(artist::Column::Id)
                .all(self)
                .await?,
            groups: group::Entity::find()
                .order_by_asc(group::Column::Id)
                .all(self)
                .await?,
            albums: album::Entity::find()
                .order_by_asc(album::Column::Id)
                .all(self)
                .await?,
            genres: genre::Entity::find()
                .order_by_asc(genre::Column::Id)
                .all(self)
                .await?,
            tracks: track::Entity::find()
                .order_by_asc(track::Column::Id)
                .all(self)
                .await?,
            track_genres: track_genre::Entity::find().all(self).await?,
            playlists: playlist::Entity::find()
                .order_by_asc(playlist::Column::Id)
                .all(self)
                .await?,
            playlist_tracks: playlist_track::Entity::find().all(self).await?,
            track_ratings: track_rating::Entity::find().all(self).await?,
            album_ratings: album_rating::Entity::find().all(self).await?,
            comments: comment::Entity::find().all(self).await?,
        };

        tracing::debug!(
            users = snapshot.users.len(),
            tracks = snapshot.tracks.len(),
            albums = snapshot.albums.len(),
            track_ratings = snapshot.track_ratings.len(),
            comments = snapshot.comments.len(),
            "catalog snapshot loaded"
        );

        Ok(snapshot)
    }
}

/// An in-memory snapshot serves itself, which is how tests and callers that
/// already hold the rows feed the engine.
#[async_trait]
impl CatalogSource for CatalogSnapshot {
    async fn load_snapshot(&self) -> Result<CatalogSnapshot, DbErr> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_snapshot_returns_itself() {
        let snapshot = CatalogSnapshot {
            genres: vec![genre::Model {
                id: uuid::Uuid::new_v4(),
                name: "Jazz".into(),
            }],
            ..Default::default()
        };

        let loaded = snapshot.load_snapshot().await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_disconnected_database_fails() {
        let db = DatabaseConnection::Disconnected;
        let handle = tokio::spawn(async move { db.load_snapshot().await });
        // A disconnected pool either errors or panics inside the task; neither
        // yields a snapshot.
        let outcome = handle.await;
        assert!(!matches!(outcome, Ok(Ok(_))));
    }
}
