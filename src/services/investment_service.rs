use chrono::{ Duration, Utc };
use sea_orm::{
    prelude::Decimal,
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    TransactionTrait,
};
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::config::InvestmentTerms;
use crate::db::entity::{ investment, Investment };
use crate::db::{ balance, NewTransaction, TransactionRepository };
use crate::enums::{ is_package_amount, InvestmentStatus, TransactionKind, TransactionStatus, PACKAGE_AMOUNTS };
use crate::error::{ AppError, Result };

/// One purchasable package with the returns it would earn over its term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentPackage {
    pub amount: Decimal,
    pub term_days: i64,
    pub daily_interest: Decimal,
    pub daily_return: Decimal,
    pub total_return: Decimal,
}

pub fn packages(terms: &InvestmentTerms) -> Vec<InvestmentPackage> {
    PACKAGE_AMOUNTS.iter()
        .map(|amount| {
            let daily_return = (*amount * terms.daily_interest_percent) / Decimal::from(100);
            InvestmentPackage {
                amount: *amount,
                term_days: terms.term_days,
                daily_interest: terms.daily_interest_percent,
                daily_return,
                total_return: daily_return * Decimal::from(terms.term_days),
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct InvestmentService {
    db: DatabaseConnection,
    terms: InvestmentTerms,
}

impl InvestmentService {
    pub fn new(db: DatabaseConnection, terms: InvestmentTerms) -> Self {
        Self { db, terms }
    }

    pub fn list_packages(&self) -> Vec<InvestmentPackage> {
        packages(&self.terms)
    }

    /// Buys a package from the caller's balance.
    ///
    /// The debit, the investment row and its ledger row are written in one
    /// database transaction. The debit only succeeds if the stored balance
    /// still covers the amount at write time.
    pub async fn purchase(&self, profile_id: Uuid, amount: Decimal) -> Result<investment::Model> {
        if !is_package_amount(amount) {
            return Err(AppError::InvalidInput("Select one of the available packages".to_string()));
        }

        let txn = self.db.begin().await?;

        balance::debit(&txn, profile_id, amount).await?;

        let now = Utc::now();
        let investment = (investment::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            profile_id: ActiveValue::Set(profile_id),
            amount: ActiveValue::Set(amount),
            daily_interest: ActiveValue::Set(self.terms.daily_interest_percent),
            status: ActiveValue::Set(InvestmentStatus::Active.to_string()),
            start_date: ActiveValue::Set(now),
            end_date: ActiveValue::Set(now + Duration::days(self.terms.term_days)),
            total_returns: ActiveValue::Set(Decimal::ZERO),
            last_return_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }).insert(&txn).await?;

        TransactionRepository::insert(
            &txn,
            NewTransaction::new(
                profile_id,
                TransactionKind::Investment,
                amount,
                TransactionStatus::Approved
            )
        ).await?;

        txn.commit().await?;

        tracing::info!(
            "Investment {} of {} started by {}, matures {}",
            investment.id,
            amount,
            profile_id,
            investment.end_date
        );

        Ok(investment)
    }

    pub async fn list_for_profile(
        &self,
        profile_id: Uuid,
        status: Option<InvestmentStatus>
    ) -> Result<Vec<investment::Model>> {
        let mut query = Investment::find()
            .filter(investment::Column::ProfileId.eq(profile_id))
            .order_by_desc(investment::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(investment::Column::Status.eq(status.as_str()));
        }

        let investments = query.all(&self.db).await?;
        Ok(investments)
    }
}
