use sea_orm::{
    prelude::Decimal,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    SqlErr,
};
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::{ investment, profile, transaction, Investment, Profile, Transaction };
use crate::db::ProfileRepository;
use crate::enums::{ InvestmentStatus, TransactionKind, TransactionStatus };
use crate::error::{ AppError, Result };
use crate::services::notification_service::NotificationService;
use crate::services::validation::{ require_text, validate_phone };

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub phone: Option<String>,
}

/// Figures shown on the user dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub balance: Decimal,
    pub signup_bonus: Decimal,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub active_investments: usize,
    pub invested_amount: Decimal,
    pub total_returns: Decimal,
    pub pending_transactions: usize,
    pub unread_notifications: u64,
}

/// Platform-wide totals for the admin overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_balance: Decimal,
    pub pending_deposits: usize,
    pub pending_withdrawals: usize,
    pub approved_deposits: Decimal,
    pub approved_withdrawals: Decimal,
    pub active_investments: usize,
    pub invested_amount: Decimal,
}

#[derive(Clone)]
pub struct ProfileService {
    db: DatabaseConnection,
    notifications: NotificationService,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            notifications: NotificationService::new(db.clone()),
            db,
        }
    }

    fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.db.clone())
    }

    pub async fn get_profile(&self, profile_id: Uuid) -> Result<profile::Model> {
        self.profiles().find_by_id(profile_id).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<profile::Model>> {
        self.profiles().list_all().await
    }

    /// Username and phone follow the same rules as signup.
    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        update: ProfileUpdate
    ) -> Result<profile::Model> {
        let username = update.username
            .as_deref()
            .map(|u| require_text("Username", u))
            .transpose()?;
        let phone = update.phone.as_deref().map(validate_phone).transpose()?;

        self.profiles()
            .update_contact(profile_id, username, phone).await
            .map_err(|e| {
                match e {
                    AppError::Database(db_err) =>
                        match db_err.sql_err() {
                            Some(SqlErr::UniqueConstraintViolation(_)) =>
                                AppError::Conflict("Username is already taken".to_string()),
                            _ => AppError::Database(db_err),
                        }
                    other => other,
                }
            })
    }

    pub async fn dashboard(&self, profile_id: Uuid) -> Result<Dashboard> {
        let profile = self.get_profile(profile_id).await?;

        let transactions = Transaction::find()
            .filter(transaction::Column::ProfileId.eq(profile_id))
            .all(&self.db).await?;

        let investments = Investment::find()
            .filter(investment::Column::ProfileId.eq(profile_id))
            .all(&self.db).await?;

        let approved_total = |kind: TransactionKind| -> Decimal {
            transactions
                .iter()
                .filter(|t| t.kind == kind.as_str())
                .filter(|t| t.status == TransactionStatus::Approved.as_str())
                .map(|t| t.amount)
                .sum()
        };

        let active: Vec<&investment::Model> = investments
            .iter()
            .filter(|i| i.status == InvestmentStatus::Active.as_str())
            .collect();

        Ok(Dashboard {
            balance: profile.balance,
            signup_bonus: profile.signup_bonus,
            total_deposits: approved_total(TransactionKind::Deposit),
            total_withdrawals: approved_total(TransactionKind::Withdrawal),
            active_investments: active.len(),
            invested_amount: active
                .iter()
                .map(|i| i.amount)
                .sum(),
            total_returns: investments
                .iter()
                .map(|i| i.total_returns)
                .sum(),
            pending_transactions: transactions
                .iter()
                .filter(|t| t.status == TransactionStatus::Pending.as_str())
                .count(),
            unread_notifications: self.notifications.unread_count(profile_id).await?,
        })
    }

    pub async fn admin_stats(&self) -> Result<AdminStats> {
        let profiles = Profile::find().all(&self.db).await?;

        let transactions = Transaction::find().all(&self.db).await?;
        let active = Investment::find()
            .filter(investment::Column::Status.eq(InvestmentStatus::Active.as_str()))
            .all(&self.db).await?;

        let count = |kind: TransactionKind, status: TransactionStatus| {
            transactions
                .iter()
                .filter(|t| t.kind == kind.as_str() && t.status == status.as_str())
                .count()
        };
        let total = |kind: TransactionKind| -> Decimal {
            transactions
                .iter()
                .filter(|t| t.kind == kind.as_str())
                .filter(|t| t.status == TransactionStatus::Approved.as_str())
                .map(|t| t.amount)
                .sum()
        };

        Ok(AdminStats {
            total_users: profiles.len() as u64,
            total_balance: profiles
                .iter()
                .map(|p| p.balance)
                .sum(),
            pending_deposits: count(TransactionKind::Deposit, TransactionStatus::Pending),
            pending_withdrawals: count(TransactionKind::Withdrawal, TransactionStatus::Pending),
            approved_deposits: total(TransactionKind::Deposit),
            approved_withdrawals: total(TransactionKind::Withdrawal),
            active_investments: active.len(),
            invested_amount: active
                .iter()
                .map(|i| i.amount)
                .sum(),
        })
    }
}
