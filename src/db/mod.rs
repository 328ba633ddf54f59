use chrono::Utc;
use sea_orm::sea_query::{ Expr, Func };
use sea_orm::{
    entity::prelude::*,
    ActiveValue::Set,
    ConnectionTrait,
    DatabaseConnection,
    QueryOrder,
    QuerySelect,
    SqlErr,
};
use uuid::Uuid;

use crate::error::{ AppError, Result };

pub mod entity;
pub use entity::*;

mod transaction_repository;
pub use transaction_repository::{ NewTransaction, TransactionRepository };

pub mod balance;

/// Fields required to create a profile row.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub signup_bonus: Decimal,
    pub referral_code: String,
    pub referred_by: Option<String>,
}

/// Names the unique profile column a violation message refers to. Postgres
/// reports the constraint (`profiles_email_key`), SQLite the column
/// (`profiles.email`); both contain the column name.
fn profile_conflict(detail: &str) -> AppError {
    let detail = detail.to_lowercase();

    let message = if detail.contains("referral_code") {
        "Could not reserve a referral code, please try again"
    } else if detail.contains("email") {
        "Email is already registered"
    } else if detail.contains("username") {
        "Username is already taken"
    } else {
        "Username or email is already registered"
    };

    AppError::Conflict(message.to_string())
}

pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert<C: ConnectionTrait>(conn: &C, new: NewProfile) -> Result<profile::Model> {
        let now = Utc::now();
        let profile = profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new.username),
            email: Set(new.email),
            phone: Set(new.phone),
            password_hash: Set(new.password_hash),
            is_admin: Set(new.is_admin),
            balance: Set(Decimal::ZERO),
            signup_bonus: Set(new.signup_bonus),
            referral_code: Set(new.referral_code),
            referred_by: Set(new.referred_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let profile = profile.insert(conn).await.map_err(|e| {
            match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => profile_conflict(&detail),
                _ => AppError::Database(e),
            }
        })?;

        Ok(profile)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<profile::Model> {
        Profile::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<profile::Model>> {
        let profile = Profile::find()
            .filter(profile::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db).await?;

        Ok(profile)
    }

    /// Case-insensitive lookup of the profile owning `code`.
    pub async fn find_by_referral_code<C: ConnectionTrait>(
        conn: &C,
        code: &str
    ) -> Result<Option<profile::Model>> {
        let profile = Profile::find()
            .filter(
                Expr::expr(Func::upper(Expr::col(profile::Column::ReferralCode))).eq(
                    code.trim().to_uppercase()
                )
            )
            .one(conn).await?;

        Ok(profile)
    }

    pub async fn referral_code_exists(&self, code: &str) -> Result<bool> {
        Ok(Self::find_by_referral_code(&self.db, code).await?.is_some())
    }

    /// Profiles that signed up with `code`, newest first.
    pub async fn find_referred_by(&self, code: &str) -> Result<Vec<profile::Model>> {
        let profiles = Profile::find()
            .filter(profile::Column::ReferredBy.eq(code))
            .order_by_desc(profile::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(profiles)
    }

    pub async fn list_all(&self) -> Result<Vec<profile::Model>> {
        let profiles = Profile::find()
            .order_by_desc(profile::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(profiles)
    }

    pub async fn all_ids<C: ConnectionTrait>(conn: &C) -> Result<Vec<Uuid>> {
        let ids = Profile::find()
            .select_only()
            .column(profile::Column::Id)
            .into_tuple::<Uuid>()
            .all(conn).await?;

        Ok(ids)
    }

    pub async fn update_contact(
        &self,
        id: Uuid,
        username: Option<String>,
        phone: Option<String>
    ) -> Result<profile::Model> {
        let profile = self.find_by_id(id).await?;

        let mut active: profile::ActiveModel = profile.into();
        if let Some(username) = username {
            active.username = Set(username);
        }
        if let Some(phone) = phone {
            active.phone = Set(phone);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
