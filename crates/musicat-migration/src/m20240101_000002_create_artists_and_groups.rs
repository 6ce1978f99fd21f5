use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Groups::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Groups::Description).text().null())
                    .col(ColumnDef::new(Groups::PhotoUrl).string_len(500).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Artists::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Artists::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Artists::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Artists::Biography).text().null())
                    .col(ColumnDef::new(Artists::AvatarUrl).string_len(500).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ArtistGroups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ArtistGroups::GroupId).uuid().not_null())
                    .col(ColumnDef::new(ArtistGroups::ArtistId).uuid().not_null())
                    .col(
                        ColumnDef::new(ArtistGroups::ArtistRole)
                            .string_len(100)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ArtistGroups::GroupId)
                            .col(ArtistGroups::ArtistId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_groups_group_id")
                            .from(ArtistGroups::Table, ArtistGroups::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_groups_artist_id")
                            .from(ArtistGroups::Table, ArtistGroups::ArtistId)
                            .to(Artists::Table, Artists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArtistGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Artists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Groups {
    Table,
    Id,
    Name,
    Description,
    PhotoUrl,
}

#[derive(DeriveIden)]
pub enum Artists {
    Table,
    Id,
    Name,
    Biography,
    AvatarUrl,
}

#[derive(DeriveIden)]
enum ArtistGroups {
    Table,
    GroupId,
    ArtistId,
    ArtistRole,
}
