use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_profiles_table::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Investments::Table)
                .if_not_exists()
                .col(ColumnDef::new(Investments::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Investments::ProfileId).uuid().not_null())
                .col(ColumnDef::new(Investments::Amount).decimal().not_null())
                .col(ColumnDef::new(Investments::DailyInterest).decimal().not_null())
                .col(ColumnDef::new(Investments::Status).string_len(20).not_null())
                .col(ColumnDef::new(Investments::StartDate).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Investments::EndDate).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Investments::TotalReturns).decimal().not_null().default(0))
                .col(ColumnDef::new(Investments::LastReturnAt).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Investments::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Investments::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_investments_profile")
                        .from(Investments::Table, Investments::ProfileId)
                        .to(Profiles::Table, Profiles::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        // Settlement scans active investments by end date
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_investments_status_end_date")
                .table(Investments::Table)
                .col(Investments::Status)
                .col(Investments::EndDate)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_investments_profile_id")
                .table(Investments::Table)
                .col(Investments::ProfileId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Investments::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Investments {
    Table,
    Id,
    ProfileId,
    Amount,
    DailyInterest,
    Status,
    StartDate,
    EndDate,
    TotalReturns,
    LastReturnAt,
    CreatedAt,
    UpdatedAt,
}
