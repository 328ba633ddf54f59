//! Interest accrual and maturity of investments.
//!
//! Each investment is settled in its own database transaction. The row update
//! is a compare-and-set on `last_return_at` and `status`, so a run that lost
//! a race (or repeats work already done) updates nothing and credits nothing.

use chrono::{ DateTime, Duration, Utc };
use sea_orm::sea_query::Expr;
use sea_orm::{
    prelude::Decimal,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use crate::db::balance;
use crate::db::entity::{ investment, Investment };
use crate::enums::{ InvestmentStatus, NotificationKind };
use crate::error::Result;
use crate::services::notification_service::NotificationService;

/// Returns owed on an investment at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    pub days: i64,
    pub amount: Decimal,
    /// New value of `last_return_at` once these days are paid.
    pub paid_through: DateTime<Utc>,
}

/// Whole days not yet paid on `inv`, never counting past its end date.
pub fn accrual_for(inv: &investment::Model, now: DateTime<Utc>) -> Option<Accrual> {
    let paid_from = inv.last_return_at.unwrap_or(inv.start_date);
    let until = now.min(inv.end_date);
    let days = (until - paid_from).num_days();

    if days <= 0 {
        return None;
    }

    let daily = (inv.amount * inv.daily_interest) / Decimal::from(100);

    Some(Accrual {
        days,
        amount: daily * Decimal::from(days),
        paid_through: paid_from + Duration::days(days),
    })
}

#[derive(Clone)]
pub struct SettlementService {
    db: DatabaseConnection,
    notifications: NotificationService,
}

impl SettlementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            notifications: NotificationService::new(db.clone()),
            db,
        }
    }

    async fn active_investments(&self) -> Result<Vec<investment::Model>> {
        let investments = Investment::find()
            .filter(investment::Column::Status.eq(InvestmentStatus::Active.as_str()))
            .all(&self.db).await?;

        Ok(investments)
    }

    /// Credits every elapsed, unpaid day of every active investment.
    /// Returns how many investments were credited.
    pub async fn calculate_daily_investment_returns(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut credited = 0;

        for inv in self.active_investments().await? {
            let Some(accrual) = accrual_for(&inv, now) else {
                continue;
            };

            if self.settle(&inv, Some(accrual), false).await? {
                credited += 1;
                tracing::debug!(
                    "Investment {} earned {} over {} day(s)",
                    inv.id,
                    accrual.amount,
                    accrual.days
                );
            }
        }

        if credited > 0 {
            tracing::info!("Daily returns credited on {} investment(s)", credited);
        }

        Ok(credited)
    }

    /// Completes every active investment past its end date: pays any
    /// remaining returns, then returns the principal.
    pub async fn update_completed_investments(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut completed = 0;

        for inv in self.active_investments().await? {
            if inv.end_date > now {
                continue;
            }

            let accrual = accrual_for(&inv, now);
            if !self.settle(&inv, accrual, true).await? {
                continue;
            }
            completed += 1;

            let returns = inv.total_returns + accrual.map(|a| a.amount).unwrap_or_default();
            self.notifications.notify(
                inv.profile_id,
                "Investment completed",
                format!(
                    "Your investment of {} has matured. {} in returns and your principal have been added to your balance.",
                    inv.amount.normalize(),
                    returns.normalize()
                ),
                NotificationKind::Success
            ).await;
        }

        if completed > 0 {
            tracing::info!("{} investment(s) completed", completed);
        }

        Ok(completed)
    }

    /// Atomic increment of a profile balance.
    pub async fn credit_balance(&self, profile_id: Uuid, amount: Decimal) -> Result<()> {
        balance::credit(&self.db, profile_id, amount).await?;
        tracing::info!("Balance of {} credited with {}", profile_id, amount);
        Ok(())
    }

    /// Pays `accrual` and, when `complete` is set, closes the investment and
    /// returns its principal. Returns false when the row changed underneath.
    async fn settle(
        &self,
        inv: &investment::Model,
        accrual: Option<Accrual>,
        complete: bool
    ) -> Result<bool> {
        let txn = self.db.begin().await?;

        let mut update = Investment::update_many()
            .col_expr(investment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(investment::Column::Id.eq(inv.id))
            .filter(investment::Column::Status.eq(InvestmentStatus::Active.as_str()));

        update = match inv.last_return_at {
            Some(last) => update.filter(investment::Column::LastReturnAt.eq(last)),
            None => update.filter(investment::Column::LastReturnAt.is_null()),
        };

        if let Some(accrual) = accrual {
            update = update
                .col_expr(
                    investment::Column::TotalReturns,
                    Expr::col(investment::Column::TotalReturns).add(accrual.amount)
                )
                .col_expr(investment::Column::LastReturnAt, Expr::value(accrual.paid_through));
        }

        if complete {
            update = update.col_expr(
                investment::Column::Status,
                Expr::value(InvestmentStatus::Completed.as_str())
            );
        }

        if update.exec(&txn).await?.rows_affected == 0 {
            tracing::debug!("Investment {} already settled by another run", inv.id);
            return Ok(false);
        }

        let mut payout = accrual.map(|a| a.amount).unwrap_or_default();
        if complete {
            payout += inv.amount;
        }

        if payout > Decimal::ZERO {
            balance::credit(&txn, inv.profile_id, payout).await?;
        }

        txn.commit().await?;

        Ok(true)
    }
}
