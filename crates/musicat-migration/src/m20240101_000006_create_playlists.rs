use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000005_create_tracks::Tracks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlists::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Playlists::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Playlists::UserId).uuid().not_null())
                    .col(ColumnDef::new(Playlists::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Playlists::Description).text().null())
                    .col(
                        ColumnDef::new(Playlists::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Playlists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlists_user_id")
                            .from(Playlists::Table, Playlists::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlists_user_id")
                    .table(Playlists::Table)
                    .col(Playlists::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlaylistTracks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlaylistTracks::PlaylistId).uuid().not_null())
                    .col(ColumnDef::new(PlaylistTracks::TrackId).uuid().not_null())
                    .col(
                        ColumnDef::new(PlaylistTracks::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlaylistTracks::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PlaylistTracks::PlaylistId)
                            .col(PlaylistTracks::TrackId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_tracks_playlist_id")
                            .from(PlaylistTracks::Table, PlaylistTracks::PlaylistId)
                            .to(Playlists::Table, Playlists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_tracks_track_id")
                            .from(PlaylistTracks::Table, PlaylistTracks::TrackId)
                            .to(Tracks::Table, Tracks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaylistTracks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlists::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Playlists {
    Table,
    Id,
    UserId,
    Name,
    Description,
    IsPublic,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlaylistTracks {
    Table,
    PlaylistId,
    TrackId,
    Position,
    AddedAt,
}
