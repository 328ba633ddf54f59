use axum::{ extract::{ Query, State }, http::StatusCode, Json };
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::cache::tables;
use crate::db::entity::{ payment_settings, transaction, withdrawal_settings };
use crate::enums::TransactionKind;
use crate::error::Result;
use crate::services::transaction_service::{ DepositRequest, WithdrawalRequest };

use super::session::CurrentSession;
use super::json::AppJson;
use super::AppState;

#[derive(Deserialize)]
pub struct HistoryParams {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn list_deposit_accounts(
    State(state): State<AppState>,
    _current: CurrentSession
) -> Result<Json<Vec<payment_settings::Model>>> {
    let accounts = state.settings_service.list_deposit_accounts().await?;

    Ok(Json(accounts))
}

pub async fn request_deposit(
    State(state): State<AppState>,
    current: CurrentSession,
    AppJson(request): AppJson<DepositRequest>
) -> Result<(StatusCode, Json<TransactionResponse>)> {
    let deposit = state.transaction_service.request_deposit(
        current.session.profile_id,
        request
    ).await?;
    state.cache.invalidate(tables::TRANSACTIONS).await;

    Ok((StatusCode::CREATED, Json(deposit.into())))
}

pub async fn list_withdrawal_networks(
    State(state): State<AppState>,
    _current: CurrentSession
) -> Result<Json<Vec<withdrawal_settings::Model>>> {
    let networks = state.settings_service.list_withdrawal_networks().await?;

    Ok(Json(networks))
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    current: CurrentSession,
    AppJson(request): AppJson<WithdrawalRequest>
) -> Result<(StatusCode, Json<TransactionResponse>)> {
    let withdrawal = state.transaction_service.request_withdrawal(
        current.session.profile_id,
        request
    ).await?;
    state.cache.invalidate(tables::TRANSACTIONS).await;

    Ok((StatusCode::CREATED, Json(withdrawal.into())))
}

pub async fn history(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(params): Query<HistoryParams>
) -> Result<Json<Vec<TransactionResponse>>> {
    let transactions = state.transaction_service.list_for_profile(
        current.session.profile_id,
        params.kind,
        params.limit,
        params.offset
    ).await?;

    let response: Vec<TransactionResponse> = transactions
        .into_iter()
        .map(|tx| tx.into())
        .collect();

    Ok(Json(response))
}

#[derive(Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    pub status: String,
    pub network: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(tx: transaction::Model) -> Self {
        Self {
            id: tx.id,
            user_id: tx.profile_id,
            kind: tx.kind,
            amount: tx.amount,
            status: tx.status,
            network: tx.network,
            account_name: tx.account_name,
            account_number: tx.account_number,
            phone: tx.phone,
            email: tx.email,
            transaction_id: tx.transaction_ref,
            created_at: tx.created_at.to_rfc3339(),
            updated_at: tx.updated_at.to_rfc3339(),
        }
    }
}
