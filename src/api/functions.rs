//! Edge handlers invoked by an external scheduler. Each one forwards to a
//! settlement procedure and answers with a short status message.

use axum::{ extract::State, http::HeaderMap, Json };
use chrono::Utc;
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::cache::tables;
use crate::error::{ AppError, Result };

use super::json::AppJson;
use super::AppState;

pub const FUNCTIONS_KEY_HEADER: &str = "x-functions-key";

#[derive(Deserialize)]
pub struct CreditBalanceRequest {
    pub user_id: Uuid,
    pub amount: Decimal,
}

#[derive(Serialize, Deserialize)]
pub struct FunctionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Open when no key is configured, otherwise the header must match.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.config.functions_key.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(FUNCTIONS_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided != expected {
        tracing::warn!("Rejected edge function call with a missing or wrong key");
        return Err(AppError::Unauthorized);
    }

    Ok(())
}

pub async fn calculate_daily_returns(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<FunctionResponse>> {
    authorize(&state, &headers)?;

    let count = state.settlement_service.calculate_daily_investment_returns(Utc::now()).await?;
    state.cache.invalidate_all(&[tables::INVESTMENTS, tables::PROFILES]).await;

    Ok(
        Json(FunctionResponse {
            message: "Daily returns calculated successfully".to_string(),
            count: Some(count),
        })
    )
}

pub async fn update_completed_investments(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<FunctionResponse>> {
    authorize(&state, &headers)?;

    let count = state.settlement_service.update_completed_investments(Utc::now()).await?;
    state.cache.invalidate_all(
        &[tables::INVESTMENTS, tables::PROFILES, tables::NOTIFICATIONS]
    ).await;

    Ok(
        Json(FunctionResponse {
            message: "Completed investments updated successfully".to_string(),
            count: Some(count),
        })
    )
}

pub async fn credit_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<CreditBalanceRequest>
) -> Result<Json<FunctionResponse>> {
    authorize(&state, &headers)?;

    state.settlement_service.credit_balance(request.user_id, request.amount).await?;
    state.cache.invalidate(tables::PROFILES).await;

    Ok(
        Json(FunctionResponse {
            message: "Balance credited successfully".to_string(),
            count: None,
        })
    )
}
