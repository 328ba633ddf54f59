use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::Session;

use super::AppState;

/// Caller resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session: Session,
    pub token: String,
}

/// A [`CurrentSession`] whose profile holds the admin role.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    let header = parts.headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let mut split = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (split.next(), split.next()) else {
        return Err(AppError::Unauthorized);
    };

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AppError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(token.to_string())
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let session = state.auth_service.authenticate(&token).await?;

        Ok(CurrentSession { session, token })
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentSession { session, .. } = CurrentSession::from_request_parts(parts, state).await?;
        session.require_admin()?;

        Ok(AdminSession(session))
    }
}
