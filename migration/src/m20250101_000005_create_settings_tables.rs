use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(PaymentSettings::Table)
                .if_not_exists()
                .col(ColumnDef::new(PaymentSettings::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(PaymentSettings::AccountName).string().not_null())
                .col(ColumnDef::new(PaymentSettings::AccountNumber).string().not_null())
                .col(ColumnDef::new(PaymentSettings::Network).string().not_null())
                .col(ColumnDef::new(PaymentSettings::IsActive).boolean().not_null().default(true))
                .col(
                    ColumnDef::new(PaymentSettings::CreatedAt).timestamp_with_time_zone().not_null()
                )
                .col(
                    ColumnDef::new(PaymentSettings::UpdatedAt).timestamp_with_time_zone().not_null()
                )
                .to_owned()
        ).await?;

        manager.create_table(
            Table::create()
                .table(WithdrawalSettings::Table)
                .if_not_exists()
                .col(ColumnDef::new(WithdrawalSettings::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(WithdrawalSettings::Network).string().not_null().unique_key())
                .col(ColumnDef::new(WithdrawalSettings::MinimumAmount).decimal().not_null())
                .col(
                    ColumnDef::new(WithdrawalSettings::IsActive).boolean().not_null().default(true)
                )
                .col(
                    ColumnDef::new(WithdrawalSettings::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(
                    ColumnDef::new(WithdrawalSettings::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_table(
            Table::create()
                .table(SignupSettings::Table)
                .if_not_exists()
                .col(ColumnDef::new(SignupSettings::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(SignupSettings::SignupBonus).decimal().not_null())
                .col(ColumnDef::new(SignupSettings::ReferralBonus).decimal().not_null())
                .col(ColumnDef::new(SignupSettings::IsActive).boolean().not_null().default(false))
                .col(
                    ColumnDef::new(SignupSettings::CreatedAt).timestamp_with_time_zone().not_null()
                )
                .col(
                    ColumnDef::new(SignupSettings::UpdatedAt).timestamp_with_time_zone().not_null()
                )
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SignupSettings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(WithdrawalSettings::Table).to_owned()).await?;

        manager.drop_table(Table::drop().table(PaymentSettings::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum PaymentSettings {
    Table,
    Id,
    AccountName,
    AccountNumber,
    Network,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WithdrawalSettings {
    Table,
    Id,
    Network,
    MinimumAmount,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SignupSettings {
    Table,
    Id,
    SignupBonus,
    ReferralBonus,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
