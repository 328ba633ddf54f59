use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Profiles::Table)
                .if_not_exists()
                .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Profiles::Username).string().not_null().unique_key())
                .col(ColumnDef::new(Profiles::Email).string().not_null().unique_key())
                .col(ColumnDef::new(Profiles::Phone).string_len(20).not_null())
                .col(ColumnDef::new(Profiles::PasswordHash).string().not_null())
                .col(ColumnDef::new(Profiles::IsAdmin).boolean().not_null().default(false))
                .col(ColumnDef::new(Profiles::Balance).decimal().not_null().default(0))
                .col(ColumnDef::new(Profiles::SignupBonus).decimal().not_null().default(0))
                .col(ColumnDef::new(Profiles::ReferralCode).string_len(16).not_null().unique_key())
                .col(ColumnDef::new(Profiles::ReferredBy).string_len(16).null())
                .col(ColumnDef::new(Profiles::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Profiles::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_profiles_referred_by")
                .table(Profiles::Table)
                .col(Profiles::ReferredBy)
                .to_owned()
        ).await?;

        manager.create_table(
            Table::create()
                .table(Sessions::Table)
                .if_not_exists()
                .col(ColumnDef::new(Sessions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Sessions::ProfileId).uuid().not_null())
                .col(ColumnDef::new(Sessions::TokenHash).string_len(64).not_null().unique_key())
                .col(ColumnDef::new(Sessions::ExpiresAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Sessions::CreatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_sessions_profile")
                        .from(Sessions::Table, Sessions::ProfileId)
                        .to(Profiles::Table, Profiles::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Sessions::Table).to_owned()).await?;

        manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Profiles {
    Table,
    Id,
    Username,
    Email,
    Phone,
    PasswordHash,
    IsAdmin,
    Balance,
    SignupBonus,
    ReferralCode,
    ReferredBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    ProfileId,
    TokenHash,
    ExpiresAt,
    CreatedAt,
}
