use std::sync::Arc;

use sea_orm::{ prelude::Decimal, DatabaseConnection, EntityTrait, TransactionTrait };
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::with_read_retry;
use crate::db::entity::{ transaction, Transaction };
use crate::db::{ balance, NewTransaction, ProfileRepository, TransactionRepository };
use crate::enums::{ is_package_amount, NotificationKind, TransactionKind, TransactionStatus };
use crate::error::{ AppError, Result };
use crate::services::notification_service::NotificationService;
use crate::services::settings_service::SettingsService;
use crate::services::validation::{ normalize_email, require_text, validate_phone };

#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
    pub account_name: String,
    pub email: String,
    pub phone: String,
    pub transaction_ref: String,
    pub amount: Decimal,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    pub phone: String,
    pub network: String,
    pub account_name: String,
    pub amount: Decimal,
}

pub struct TransactionService {
    transaction_repo: Arc<TransactionRepository>,
    db: DatabaseConnection,
    notifications: NotificationService,
}

impl TransactionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            transaction_repo: Arc::new(TransactionRepository::new(db.clone())),
            notifications: NotificationService::new(db.clone()),
            db,
        }
    }

    /// Records a pending deposit for manual review. The reference is not verified.
    pub async fn request_deposit(
        &self,
        profile_id: Uuid,
        request: DepositRequest
    ) -> Result<transaction::Model> {
        if !is_package_amount(request.amount) {
            return Err(AppError::InvalidInput("Select one of the available packages".to_string()));
        }

        let mut new = NewTransaction::new(
            profile_id,
            TransactionKind::Deposit,
            request.amount,
            TransactionStatus::Pending
        );
        new.account_name = Some(require_text("Account name", &request.account_name)?);
        new.email = Some(normalize_email(&request.email)?);
        new.phone = Some(validate_phone(&request.phone)?);
        new.transaction_ref = Some(require_text("Transaction ID", &request.transaction_ref)?);
        new.network = request.network
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        let deposit = self.transaction_repo.create(new).await?;
        tracing::info!("Deposit {} of {} requested by {}", deposit.id, deposit.amount, profile_id);

        Ok(deposit)
    }

    /// Records a pending withdrawal. The balance is checked here but only
    /// debited when an admin approves it.
    pub async fn request_withdrawal(
        &self,
        profile_id: Uuid,
        request: WithdrawalRequest
    ) -> Result<transaction::Model> {
        if request.amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Amount must be positive".to_string()));
        }

        let network = SettingsService::find_withdrawal_network(&self.db, &request.network).await?
            .filter(|n| n.is_active)
            .ok_or(AppError::NetworkUnavailable)?;

        if request.amount < network.minimum_amount {
            return Err(AppError::BelowMinimum { minimum: network.minimum_amount });
        }

        let profile = ProfileRepository::new(self.db.clone()).find_by_id(profile_id).await?;
        if profile.balance < request.amount {
            return Err(AppError::InsufficientBalance);
        }

        let mut new = NewTransaction::new(
            profile_id,
            TransactionKind::Withdrawal,
            request.amount,
            TransactionStatus::Pending
        );
        new.phone = Some(validate_phone(&request.phone)?);
        new.account_name = Some(require_text("Account name", &request.account_name)?);
        new.network = Some(network.network);

        let withdrawal = self.transaction_repo.create(new).await?;
        tracing::info!(
            "Withdrawal {} of {} requested by {}",
            withdrawal.id,
            withdrawal.amount,
            profile_id
        );

        Ok(withdrawal)
    }

    /// Caller's history, newest first. Reads are retried on database errors.
    pub async fn list_for_profile(
        &self,
        profile_id: Uuid,
        kind: Option<TransactionKind>,
        limit: Option<u64>,
        offset: Option<u64>
    ) -> Result<Vec<transaction::Model>> {
        let repo = &self.transaction_repo;
        with_read_retry(move || repo.find_by_profile_id(profile_id, kind, limit, offset)).await
    }

    pub async fn list_all(
        &self,
        status: Option<TransactionStatus>,
        kind: Option<TransactionKind>
    ) -> Result<Vec<transaction::Model>> {
        self.transaction_repo.find_all(status, kind).await
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<transaction::Model> {
        self.transaction_repo.find_by_id(id).await
    }

    /// Approves a pending request and moves the money it describes.
    ///
    /// Deposits credit the owner's balance, withdrawals debit it. The status
    /// change and the balance change commit together or not at all.
    pub async fn approve(&self, id: Uuid) -> Result<transaction::Model> {
        let approved = self.resolve(id, TransactionStatus::Approved).await?;

        let message = format!(
            "Your {} of {} has been approved.",
            approved.kind,
            approved.amount.normalize()
        );
        self.notifications.notify(
            approved.profile_id,
            "Transaction approved",
            message,
            NotificationKind::Success
        ).await;

        Ok(approved)
    }

    pub async fn reject(&self, id: Uuid) -> Result<transaction::Model> {
        let rejected = self.resolve(id, TransactionStatus::Rejected).await?;

        let message = format!(
            "Your {} of {} has been rejected.",
            rejected.kind,
            rejected.amount.normalize()
        );
        self.notifications.notify(
            rejected.profile_id,
            "Transaction rejected",
            message,
            NotificationKind::Error
        ).await;

        Ok(rejected)
    }

    async fn resolve(&self, id: Uuid, status: TransactionStatus) -> Result<transaction::Model> {
        let txn = self.db.begin().await?;

        let pending = Transaction::find_by_id(id)
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        if !TransactionRepository::resolve_pending(&txn, id, status).await? {
            return Err(
                AppError::Conflict(format!("Transaction is already {}", pending.status))
            );
        }

        if status == TransactionStatus::Approved {
            match pending.kind.parse::<TransactionKind>()? {
                TransactionKind::Deposit => {
                    balance::credit(&txn, pending.profile_id, pending.amount).await?;
                }
                TransactionKind::Withdrawal => {
                    balance::debit(&txn, pending.profile_id, pending.amount).await?;
                }
                TransactionKind::Investment => {}
            }
        }

        let resolved = Transaction::find_by_id(id)
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        txn.commit().await?;

        tracing::info!(
            "Transaction {} ({} of {}) {}",
            resolved.id,
            resolved.kind,
            resolved.amount,
            resolved.status
        );

        Ok(resolved)
    }
}
