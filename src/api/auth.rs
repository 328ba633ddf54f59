use axum::{ extract::State, http::StatusCode, Json };
use serde::Deserialize;

use crate::cache::tables;
use crate::error::Result;
use crate::services::auth_service::{ AuthResponse, SignupInput };

use super::session::CurrentSession;
use super::json::AppJson;
use super::AppState;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupInput>
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth_service.signup(request).await?;

    // A referral bonus may have changed another profile's balance
    state.cache.invalidate(tables::PROFILES).await;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignInRequest>
) -> Result<Json<AuthResponse>> {
    let response = state.auth_service.sign_in(&request.email, &request.password).await?;

    Ok(Json(response))
}

pub async fn sign_out(
    State(state): State<AppState>,
    current: CurrentSession
) -> Result<StatusCode> {
    state.auth_service.sign_out(&current.token).await?;

    Ok(StatusCode::NO_CONTENT)
}
