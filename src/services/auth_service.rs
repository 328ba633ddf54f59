use std::sync::Arc;

use argon2::{ Argon2, PasswordHash, PasswordHasher, PasswordVerifier };
use argon2::password_hash::SaltString;
use chrono::{ DateTime, Duration, Utc };
use sea_orm::{
    prelude::Decimal,
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    ConnectionTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    TransactionTrait,
};
use serde::{ Deserialize, Serialize };
use sha2::{ Digest, Sha256 };
use uuid::Uuid;

use crate::config::Config;
use crate::db::entity::{ profile, session };
use crate::db::{ balance, NewProfile, ProfileRepository };
use crate::error::{ AppError, Result };
use crate::services::referral_service::ReferralService;
use crate::services::settings_service::SettingsService;
use crate::services::validation::{
    normalize_email,
    normalize_referral_code,
    require_text,
    validate_password,
    validate_phone,
};

/// The authenticated caller, handed to every gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub profile_id: Uuid,
    pub is_admin: bool,
}

impl Session {
    pub fn require_admin(&self) -> Result<()> {
        if !self.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: profile::Model,
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>()).map_err(|e|
        AppError::Internal(format!("Failed to build salt: {}", e))
    )?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e|
        AppError::Internal(format!("Invalid hash: {}", e))
    )?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

/// Only the digest of a bearer token is ever stored.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn new_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Creates a profile, pays the referral bonus and opens a session.
    ///
    /// Everything after input validation runs in one database transaction;
    /// an unknown referral code aborts it before any row is written.
    pub async fn signup(&self, input: SignupInput) -> Result<AuthResponse> {
        let username = require_text("Username", &input.username)?;
        let email = normalize_email(&input.email)?;
        let phone = validate_phone(&input.phone)?;
        validate_password(&input.password, &input.confirm_password)?;
        let referral_code = normalize_referral_code(input.referral_code.as_deref());

        let password_hash = hash_password(&input.password)?;
        let is_admin = self.config.is_admin_email(&email);

        let txn = self.db.begin().await?;

        let referrer = match &referral_code {
            Some(code) =>
                Some(
                    ProfileRepository::find_by_referral_code(&txn, code).await?.ok_or(
                        AppError::InvalidReferralCode
                    )?
                ),
            None => None,
        };

        let rewards = SettingsService::signup_rewards(&txn).await?;
        let own_code = ReferralService::generate_referral_code(&txn).await?;

        let profile = ProfileRepository::insert(&txn, NewProfile {
            username,
            email,
            phone,
            password_hash,
            is_admin,
            signup_bonus: if rewards.is_active {
                rewards.signup_bonus
            } else {
                Decimal::ZERO
            },
            referral_code: own_code,
            referred_by: referrer.as_ref().map(|r| r.referral_code.clone()),
        }).await?;

        if let Some(referrer) = &referrer {
            if rewards.is_active && rewards.referral_bonus > Decimal::ZERO {
                balance::credit(&txn, referrer.id, rewards.referral_bonus).await?;
                tracing::info!(
                    "Referral bonus {} credited to {} for {}",
                    rewards.referral_bonus,
                    referrer.id,
                    profile.id
                );
            }
        }

        let (token, expires_at) = self.open_session(&txn, profile.id).await?;

        txn.commit().await?;

        tracing::info!("New profile {} signed up", profile.id);

        Ok(AuthResponse { token, expires_at, profile })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let profile = ProfileRepository::new(self.db.clone())
            .find_by_email(email).await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &profile.password_hash)? {
            tracing::debug!("Rejected sign-in for profile {}", profile.id);
            return Err(AppError::Unauthorized);
        }

        let (token, expires_at) = self.open_session(&self.db, profile.id).await?;

        Ok(AuthResponse { token, expires_at, profile })
    }

    pub async fn sign_out(&self, token: &str) -> Result<()> {
        session::Entity
            ::delete_many()
            .filter(session::Column::TokenHash.eq(token_digest(token)))
            .exec(&self.db).await?;

        Ok(())
    }

    /// Resolves a bearer token to its live session.
    pub async fn authenticate(&self, token: &str) -> Result<Session> {
        let (session, profile) = session::Entity
            ::find()
            .filter(session::Column::TokenHash.eq(token_digest(token)))
            .filter(session::Column::ExpiresAt.gt(Utc::now()))
            .find_also_related(profile::Entity)
            .one(&self.db).await?
            .ok_or(AppError::Unauthorized)?;

        let profile = profile.ok_or(AppError::Unauthorized)?;

        Ok(Session {
            profile_id: session.profile_id,
            is_admin: profile.is_admin,
        })
    }

    /// Drops sessions past their expiry. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        let result = session::Entity
            ::delete_many()
            .filter(session::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db).await?;

        Ok(result.rows_affected)
    }

    async fn open_session<C: ConnectionTrait>(
        &self,
        conn: &C,
        profile_id: Uuid
    ) -> Result<(String, DateTime<Utc>)> {
        let token = new_token();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.session_ttl_secs);

        (session::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            profile_id: ActiveValue::Set(profile_id),
            token_hash: ActiveValue::Set(token_digest(&token)),
            expires_at: ActiveValue::Set(expires_at),
            created_at: ActiveValue::Set(now),
        }).insert(conn).await?;

        Ok((token, expires_at))
    }
}
