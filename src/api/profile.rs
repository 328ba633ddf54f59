use axum::{ extract::{ Path, State }, Json };
use serde::Serialize;

use crate::cache::tables;
use crate::db::entity::profile;
use crate::error::Result;
use crate::services::profile_service::{ Dashboard, ProfileUpdate };
use crate::services::referral_service::ReferralStatistics;

use super::session::CurrentSession;
use super::json::AppJson;
use super::AppState;

#[derive(Serialize)]
pub struct ReferralValidation {
    pub code: String,
    pub valid: bool,
}

pub async fn validate_referral_code(
    State(state): State<AppState>,
    Path(code): Path<String>
) -> Result<Json<ReferralValidation>> {
    let valid = state.referral_service.validate_referral_code(&code).await?;

    Ok(
        Json(ReferralValidation {
            code: code.trim().to_uppercase(),
            valid,
        })
    )
}

pub async fn referral_statistics(
    State(state): State<AppState>,
    current: CurrentSession
) -> Result<Json<ReferralStatistics>> {
    let stats = state.referral_service.get_referral_statistics(current.session.profile_id).await?;

    Ok(Json(stats))
}

pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentSession
) -> Result<Json<Dashboard>> {
    let dashboard = state.profile_service.dashboard(current.session.profile_id).await?;

    Ok(Json(dashboard))
}

pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentSession
) -> Result<Json<profile::Model>> {
    let profile = state.profile_service.get_profile(current.session.profile_id).await?;

    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentSession,
    AppJson(update): AppJson<ProfileUpdate>
) -> Result<Json<profile::Model>> {
    let profile = state.profile_service.update_profile(current.session.profile_id, update).await?;
    state.cache.invalidate(tables::PROFILES).await;

    Ok(Json(profile))
}
