use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tracks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub album_id: Option<Uuid>,
    /// Length in whole seconds, unknown until the file has been probed.
    pub duration_secs: Option<i32>,
    pub file_url: Option<String>,
    #[sea_orm(default_value = "0")]
    pub play_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::album::Entity",
        from = "Column::AlbumId",
        to = "super::album::Column::Id",
        on_delete = "Cascade"
    )]
    Album,
    #[sea_orm(has_many = "super::track_genre::Entity")]
    TrackGenre,
    #[sea_orm(has_many = "super::track_rating::Entity")]
    TrackRating,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::playlist_track::Entity")]
    PlaylistTrack,
}

impl Related<super::album::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Album.def()
    }
}

impl Related<super::track_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackGenre.def()
    }
}

impl Related<super::track_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackRating.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::playlist_track::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlaylistTrack.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::track_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::track_genre::Relation::Track.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
