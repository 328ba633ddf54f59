use chrono::Utc;
use sea_orm::{
    prelude::Decimal,
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    ConnectionTrait,
    DatabaseConnection,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    QueryOrder,
    SqlErr,
};
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::{
    payment_settings,
    signup_settings,
    withdrawal_settings,
    PaymentSettings,
    SignupSettings,
    WithdrawalSettings,
};
use crate::error::{ AppError, Result };
use crate::services::validation::require_text;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSettingsInput {
    pub account_name: String,
    pub account_number: String,
    pub network: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalSettingsInput {
    pub network: String,
    pub minimum_amount: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Effective signup rewards. Zero bonuses when nothing is configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignupRewards {
    pub signup_bonus: Decimal,
    pub referral_bonus: Decimal,
    pub is_active: bool,
}

impl Default for SignupRewards {
    fn default() -> Self {
        Self {
            signup_bonus: Decimal::ZERO,
            referral_bonus: Decimal::ZERO,
            is_active: false,
        }
    }
}

impl From<signup_settings::Model> for SignupRewards {
    fn from(model: signup_settings::Model) -> Self {
        Self {
            signup_bonus: model.signup_bonus,
            referral_bonus: model.referral_bonus,
            is_active: model.is_active,
        }
    }
}

fn default_active() -> bool {
    true
}

fn unique_network(e: sea_orm::DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) =>
            AppError::Conflict("A withdrawal network with this name already exists".to_string()),
        _ => AppError::Database(e),
    }
}

#[derive(Clone)]
pub struct SettingsService {
    db: DatabaseConnection,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ─── Payment settings ────────────────────────────────────────────

    /// Deposit accounts shown to users.
    pub async fn list_deposit_accounts(&self) -> Result<Vec<payment_settings::Model>> {
        let accounts = PaymentSettings::find()
            .filter(payment_settings::Column::IsActive.eq(true))
            .order_by_asc(payment_settings::Column::Network)
            .all(&self.db).await?;

        Ok(accounts)
    }

    pub async fn list_payment_settings(&self) -> Result<Vec<payment_settings::Model>> {
        let settings = PaymentSettings::find()
            .order_by_desc(payment_settings::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(settings)
    }

    pub async fn create_payment_settings(
        &self,
        input: PaymentSettingsInput
    ) -> Result<payment_settings::Model> {
        let now = Utc::now();
        let settings = payment_settings::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            account_name: ActiveValue::Set(require_text("Account name", &input.account_name)?),
            account_number: ActiveValue::Set(
                require_text("Account number", &input.account_number)?
            ),
            network: ActiveValue::Set(require_text("Network", &input.network)?),
            is_active: ActiveValue::Set(input.is_active),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let settings = settings.insert(&self.db).await?;
        tracing::info!("Payment account {} added on {}", settings.id, settings.network);

        Ok(settings)
    }

    pub async fn update_payment_settings(
        &self,
        id: Uuid,
        input: PaymentSettingsInput
    ) -> Result<payment_settings::Model> {
        let existing = PaymentSettings::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Payment settings".to_string()))?;

        let mut active: payment_settings::ActiveModel = existing.into();
        active.account_name = ActiveValue::Set(require_text("Account name", &input.account_name)?);
        active.account_number = ActiveValue::Set(
            require_text("Account number", &input.account_number)?
        );
        active.network = ActiveValue::Set(require_text("Network", &input.network)?);
        active.is_active = ActiveValue::Set(input.is_active);
        active.updated_at = ActiveValue::Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete_payment_settings(&self, id: Uuid) -> Result<()> {
        let existing = PaymentSettings::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Payment settings".to_string()))?;

        existing.delete(&self.db).await?;
        Ok(())
    }

    // ─── Withdrawal settings ─────────────────────────────────────────

    /// Networks users may currently withdraw to.
    pub async fn list_withdrawal_networks(&self) -> Result<Vec<withdrawal_settings::Model>> {
        let networks = WithdrawalSettings::find()
            .filter(withdrawal_settings::Column::IsActive.eq(true))
            .order_by_asc(withdrawal_settings::Column::Network)
            .all(&self.db).await?;

        Ok(networks)
    }

    pub async fn list_withdrawal_settings(&self) -> Result<Vec<withdrawal_settings::Model>> {
        let settings = WithdrawalSettings::find()
            .order_by_asc(withdrawal_settings::Column::Network)
            .all(&self.db).await?;

        Ok(settings)
    }

    pub async fn find_withdrawal_network<C: ConnectionTrait>(
        conn: &C,
        network: &str
    ) -> Result<Option<withdrawal_settings::Model>> {
        let settings = WithdrawalSettings::find()
            .filter(withdrawal_settings::Column::Network.eq(network.trim()))
            .one(conn).await?;

        Ok(settings)
    }

    pub async fn create_withdrawal_settings(
        &self,
        input: WithdrawalSettingsInput
    ) -> Result<withdrawal_settings::Model> {
        Self::check_minimum(input.minimum_amount)?;

        let now = Utc::now();
        let settings = withdrawal_settings::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            network: ActiveValue::Set(require_text("Network", &input.network)?),
            minimum_amount: ActiveValue::Set(input.minimum_amount),
            is_active: ActiveValue::Set(input.is_active),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let settings = settings.insert(&self.db).await.map_err(unique_network)?;
        tracing::info!(
            "Withdrawal network {} added with minimum {}",
            settings.network,
            settings.minimum_amount
        );

        Ok(settings)
    }

    pub async fn update_withdrawal_settings(
        &self,
        id: Uuid,
        input: WithdrawalSettingsInput
    ) -> Result<withdrawal_settings::Model> {
        Self::check_minimum(input.minimum_amount)?;

        let existing = WithdrawalSettings::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Withdrawal settings".to_string()))?;

        let mut active: withdrawal_settings::ActiveModel = existing.into();
        active.network = ActiveValue::Set(require_text("Network", &input.network)?);
        active.minimum_amount = ActiveValue::Set(input.minimum_amount);
        active.is_active = ActiveValue::Set(input.is_active);
        active.updated_at = ActiveValue::Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(unique_network)?;
        Ok(updated)
    }

    pub async fn delete_withdrawal_settings(&self, id: Uuid) -> Result<()> {
        let existing = WithdrawalSettings::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Withdrawal settings".to_string()))?;

        existing.delete(&self.db).await?;
        Ok(())
    }

    fn check_minimum(minimum: Decimal) -> Result<()> {
        if minimum < Decimal::ZERO {
            return Err(AppError::InvalidInput("Minimum amount cannot be negative".to_string()));
        }
        Ok(())
    }

    // ─── Signup settings ─────────────────────────────────────────────

    pub async fn signup_rewards<C: ConnectionTrait>(conn: &C) -> Result<SignupRewards> {
        let settings = SignupSettings::find()
            .order_by_desc(signup_settings::Column::UpdatedAt)
            .one(conn).await?;

        Ok(settings.map(SignupRewards::from).unwrap_or_default())
    }

    pub async fn get_signup_settings(&self) -> Result<SignupRewards> {
        Self::signup_rewards(&self.db).await
    }

    /// Replaces the single signup settings row, creating it on first use.
    pub async fn update_signup_settings(&self, rewards: SignupRewards) -> Result<SignupRewards> {
        if rewards.signup_bonus < Decimal::ZERO || rewards.referral_bonus < Decimal::ZERO {
            return Err(AppError::InvalidInput("Bonuses cannot be negative".to_string()));
        }

        let now = Utc::now();
        let existing = SignupSettings::find()
            .order_by_desc(signup_settings::Column::UpdatedAt)
            .one(&self.db).await?;

        let saved = match existing {
            Some(model) => {
                let mut active: signup_settings::ActiveModel = model.into();
                active.signup_bonus = ActiveValue::Set(rewards.signup_bonus);
                active.referral_bonus = ActiveValue::Set(rewards.referral_bonus);
                active.is_active = ActiveValue::Set(rewards.is_active);
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.db).await?
            }
            None => {
                (signup_settings::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    signup_bonus: ActiveValue::Set(rewards.signup_bonus),
                    referral_bonus: ActiveValue::Set(rewards.referral_bonus),
                    is_active: ActiveValue::Set(rewards.is_active),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }).insert(&self.db).await?
            }
        };

        tracing::info!(
            "Signup settings updated: bonus {}, referral bonus {}, active {}",
            saved.signup_bonus,
            saved.referral_bonus,
            saved.is_active
        );

        Ok(saved.into())
    }
}
