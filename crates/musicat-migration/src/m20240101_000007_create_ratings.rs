use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000003_create_albums::Albums;
use super::m20240101_000005_create_tracks::Tracks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackRatings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrackRatings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TrackRatings::UserId).uuid().not_null())
                    .col(ColumnDef::new(TrackRatings::TrackId).uuid().not_null())
                    .col(
                        ColumnDef::new(TrackRatings::Value)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(TrackRatings::Value).between(1, 5)),
                    )
                    .col(
                        ColumnDef::new(TrackRatings::RatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_ratings_user_id")
                            .from(TrackRatings::Table, TrackRatings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_ratings_track_id")
                            .from(TrackRatings::Table, TrackRatings::TrackId)
                            .to(Tracks::Table, Tracks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per user and track
        manager
            .create_index(
                Index::create()
                    .name("idx_track_ratings_user_track")
                    .table(TrackRatings::Table)
                    .col(TrackRatings::UserId)
                    .col(TrackRatings::TrackId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumRatings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumRatings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AlbumRatings::UserId).uuid().not_null())
                    .col(ColumnDef::new(AlbumRatings::AlbumId).uuid().not_null())
                    .col(
                        ColumnDef::new(AlbumRatings::Value)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(AlbumRatings::Value).between(1, 5)),
                    )
                    .col(
                        ColumnDef::new(AlbumRatings::RatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_ratings_user_id")
                            .from(AlbumRatings::Table, AlbumRatings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_ratings_album_id")
                            .from(AlbumRatings::Table, AlbumRatings::AlbumId)
                            .to(Albums::Table, Albums::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_ratings_user_album")
                    .table(AlbumRatings::Table)
                    .col(AlbumRatings::UserId)
                    .col(AlbumRatings::AlbumId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlbumRatings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrackRatings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackRatings {
    Table,
    Id,
    UserId,
    TrackId,
    Value,
    RatedAt,
}

#[derive(DeriveIden)]
enum AlbumRatings {
    Table,
    Id,
    UserId,
    AlbumId,
    Value,
    RatedAt,
}
