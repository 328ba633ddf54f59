use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_profiles_table::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Notifications::Table)
                .if_not_exists()
                .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Notifications::ProfileId).uuid().not_null())
                .col(ColumnDef::new(Notifications::Title).string().not_null())
                .col(ColumnDef::new(Notifications::Message).text().not_null())
                .col(ColumnDef::new(Notifications::Kind).string_len(20).not_null())
                .col(ColumnDef::new(Notifications::IsRead).boolean().not_null().default(false))
                .col(
                    ColumnDef::new(Notifications::IsBroadcast).boolean().not_null().default(false)
                )
                .col(
                    ColumnDef::new(Notifications::IsPersistent).boolean().not_null().default(false)
                )
                .col(ColumnDef::new(Notifications::DismissedBy).json().not_null())
                .col(ColumnDef::new(Notifications::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Notifications::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_notifications_profile")
                        .from(Notifications::Table, Notifications::ProfileId)
                        .to(Profiles::Table, Profiles::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_notifications_profile_created_at")
                .table(Notifications::Table)
                .col(Notifications::ProfileId)
                .col(Notifications::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notifications::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    ProfileId,
    Title,
    Message,
    Kind,
    IsRead,
    IsBroadcast,
    IsPersistent,
    DismissedBy,
    CreatedAt,
    UpdatedAt,
}
