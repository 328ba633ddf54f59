use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_profiles_table::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Transactions::Table)
                .if_not_exists()
                .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Transactions::ProfileId).uuid().not_null())
                .col(ColumnDef::new(Transactions::Kind).string_len(20).not_null())
                .col(ColumnDef::new(Transactions::Amount).decimal().not_null())
                .col(ColumnDef::new(Transactions::Status).string_len(20).not_null())
                .col(ColumnDef::new(Transactions::Network).string().null())
                .col(ColumnDef::new(Transactions::AccountName).string().null())
                .col(ColumnDef::new(Transactions::AccountNumber).string().null())
                .col(ColumnDef::new(Transactions::Phone).string_len(20).null())
                .col(ColumnDef::new(Transactions::Email).string().null())
                .col(ColumnDef::new(Transactions::TransactionRef).string().null())
                .col(ColumnDef::new(Transactions::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Transactions::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_transactions_profile")
                        .from(Transactions::Table, Transactions::ProfileId)
                        .to(Profiles::Table, Profiles::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transactions_profile_id")
                .table(Transactions::Table)
                .col(Transactions::ProfileId)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transactions_status_created_at")
                .table(Transactions::Table)
                .col(Transactions::Status)
                .col(Transactions::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    ProfileId,
    Kind,
    Amount,
    Status,
    Network,
    AccountName,
    AccountNumber,
    Phone,
    Email,
    TransactionRef,
    CreatedAt,
    UpdatedAt,
}
