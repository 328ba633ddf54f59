use std::collections::HashSet;

use chrono::{ DateTime, Utc };
use rand::Rng;
use sea_orm::{ ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::entity::{ investment, Investment };
use crate::db::ProfileRepository;
use crate::error::{ AppError, Result };

const REFERRAL_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const REFERRAL_CODE_LEN: usize = 8;
const MAX_CODE_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferredUser {
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub has_invested: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralStatistics {
    pub referral_code: String,
    pub total_referrals: usize,
    pub active_investors: usize,
    pub referrals: Vec<ReferredUser>,
}

/// Draws a random candidate code. Uniqueness is checked by the caller.
pub fn random_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| REFERRAL_CODE_CHARSET[rng.random_range(0..REFERRAL_CODE_CHARSET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct ReferralService {
    db: DatabaseConnection,
}

impl ReferralService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// A code no existing profile holds yet.
    pub async fn generate_referral_code<C: ConnectionTrait>(conn: &C) -> Result<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_referral_code();
            if ProfileRepository::find_by_referral_code(conn, &code).await?.is_none() {
                return Ok(code);
            }
            tracing::debug!("Referral code collision on {}, retrying", code);
        }

        Err(AppError::Internal("Could not generate a unique referral code".to_string()))
    }

    /// Case-insensitive check that `code` belongs to some profile.
    pub async fn validate_referral_code(&self, code: &str) -> Result<bool> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }

        ProfileRepository::new(self.db.clone()).referral_code_exists(code).await
    }

    pub async fn get_referral_statistics(&self, profile_id: Uuid) -> Result<ReferralStatistics> {
        let profiles = ProfileRepository::new(self.db.clone());
        let profile = profiles.find_by_id(profile_id).await?;
        let referred = profiles.find_referred_by(&profile.referral_code).await?;

        let referred_ids: Vec<Uuid> = referred
            .iter()
            .map(|p| p.id)
            .collect();

        let investors: HashSet<Uuid> = if referred_ids.is_empty() {
            HashSet::new()
        } else {
            Investment::find()
                .select_only()
                .column(investment::Column::ProfileId)
                .distinct()
                .filter(investment::Column::ProfileId.is_in(referred_ids))
                .into_tuple::<Uuid>()
                .all(&self.db).await?
                .into_iter()
                .collect()
        };

        let referrals: Vec<ReferredUser> = referred
            .into_iter()
            .map(|p| ReferredUser {
                has_invested: investors.contains(&p.id),
                username: p.username,
                joined_at: p.created_at,
            })
            .collect();

        Ok(ReferralStatistics {
            referral_code: profile.referral_code,
            total_referrals: referrals.len(),
            active_investors: investors.len(),
            referrals,
        })
    }
}
