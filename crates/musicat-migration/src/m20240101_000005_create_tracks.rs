use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_albums::Albums;
use super::m20240101_000004_create_genres::Genres;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tracks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tracks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tracks::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Tracks::AlbumId).uuid().null())
                    .col(
                        ColumnDef::new(Tracks::DurationSecs)
                            .integer()
                            .null()
                            .check(Expr::col(Tracks::DurationSecs).gte(0)),
                    )
                    .col(ColumnDef::new(Tracks::FileUrl).string_len(500).null())
                    .col(
                        ColumnDef::new(Tracks::PlayCount)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Tracks::PlayCount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Tracks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracks_album_id")
                            .from(Tracks::Table, Tracks::AlbumId)
                            .to(Albums::Table, Albums::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracks_album_id")
                    .table(Tracks::Table)
                    .col(Tracks::AlbumId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracks_play_count")
                    .table(Tracks::Table)
                    .col(Tracks::PlayCount)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrackGenres::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrackGenres::TrackId).uuid().not_null())
                    .col(ColumnDef::new(TrackGenres::GenreId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(TrackGenres::TrackId)
                            .col(TrackGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_genres_track_id")
                            .from(TrackGenres::Table, TrackGenres::TrackId)
                            .to(Tracks::Table, Tracks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_genres_genre_id")
                            .from(TrackGenres::Table, TrackGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackGenres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tracks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tracks {
    Table,
    Id,
    Name,
    AlbumId,
    DurationSecs,
    FileUrl,
    PlayCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TrackGenres {
    Table,
    TrackId,
    GenreId,
}
