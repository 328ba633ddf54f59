//! Admin-only handlers. List endpoints are served through the query cache
//! for the admin poll interval; mutations drop the tables they touched.

use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::cache::{ tables, QueryKey };
use crate::db::entity::{ notification, payment_settings, profile, withdrawal_settings };
use crate::enums::{ TransactionKind, TransactionStatus };
use crate::error::Result;
use crate::services::notification_service::NewNotification;
use crate::services::profile_service::AdminStats;
use crate::services::settings_service::{
    PaymentSettingsInput,
    SignupRewards,
    WithdrawalSettingsInput,
};

use super::session::AdminSession;
use super::transaction::TransactionResponse;
use super::json::AppJson;
use super::AppState;

const TRANSACTION_TABLES: &[&str] = &[tables::TRANSACTIONS];
const USER_TABLES: &[&str] = &[tables::PROFILES];
const STATS_TABLES: &[&str] = &[tables::PROFILES, tables::TRANSACTIONS, tables::INVESTMENTS];

#[derive(Deserialize)]
pub struct AdminTransactionParams {
    pub status: Option<TransactionStatus>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
}

#[derive(Deserialize)]
pub struct SendNotificationRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub notification: NewNotification,
}

#[derive(Serialize)]
pub struct BroadcastResponse {
    pub message: String,
    pub count: u64,
}

// ─── Transactions ────────────────────────────────────────────────────

pub async fn list_transactions(
    State(state): State<AppState>,
    _admin: AdminSession,
    Query(params): Query<AdminTransactionParams>
) -> Result<Json<Vec<TransactionResponse>>> {
    let key = QueryKey::new(
        format!("admin:transactions:{:?}:{:?}", params.status, params.kind),
        TRANSACTION_TABLES
    );
    let service = state.transaction_service.clone();

    let transactions = state.cache.get_or_fetch(&key, state.admin_cache_ttl(), || async move {
        let transactions = service.list_all(params.status, params.kind).await?;
        Ok(
            transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect::<Vec<_>>()
        )
    }).await?;

    Ok(Json(transactions))
}

pub async fn approve_transaction(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<Uuid>
) -> Result<Json<TransactionResponse>> {
    let transaction = state.transaction_service.approve(id).await?;
    tracing::info!("Admin {} approved transaction {}", admin.profile_id, id);

    state.cache.invalidate_all(
        &[tables::TRANSACTIONS, tables::PROFILES, tables::NOTIFICATIONS]
    ).await;

    Ok(Json(transaction.into()))
}

pub async fn reject_transaction(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<Uuid>
) -> Result<Json<TransactionResponse>> {
    let transaction = state.transaction_service.reject(id).await?;
    tracing::info!("Admin {} rejected transaction {}", admin.profile_id, id);

    state.cache.invalidate_all(&[tables::TRANSACTIONS, tables::NOTIFICATIONS]).await;

    Ok(Json(transaction.into()))
}

// ─── Users and stats ─────────────────────────────────────────────────

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminSession
) -> Result<Json<Vec<profile::Model>>> {
    let service = state.profile_service.clone();

    let users = state.cache.get_or_fetch(
        &QueryKey::new("admin:users", USER_TABLES),
        state.admin_cache_ttl(),
        || async move { service.list_profiles().await }
    ).await?;

    Ok(Json(users))
}

pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminSession
) -> Result<Json<AdminStats>> {
    let service = state.profile_service.clone();

    let stats = state.cache.get_or_fetch(
        &QueryKey::new("admin:stats", STATS_TABLES),
        state.admin_cache_ttl(),
        || async move { service.admin_stats().await }
    ).await?;

    Ok(Json(stats))
}

// ─── Notifications ───────────────────────────────────────────────────

pub async fn send_notification(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppJson(request): AppJson<SendNotificationRequest>
) -> Result<(StatusCode, Json<notification::Model>)> {
    let notification = state.notification_service.send(
        request.user_id,
        request.notification
    ).await?;
    state.cache.invalidate(tables::NOTIFICATIONS).await;

    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn broadcast_notification(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppJson(request): AppJson<NewNotification>
) -> Result<(StatusCode, Json<BroadcastResponse>)> {
    let count = state.notification_service.broadcast(request).await?;
    state.cache.invalidate(tables::NOTIFICATIONS).await;

    Ok((
        StatusCode::CREATED,
        Json(BroadcastResponse {
            message: format!("Notification sent to {} users", count),
            count,
        }),
    ))
}

// ─── Payment settings ────────────────────────────────────────────────

pub async fn list_payment_settings(
    State(state): State<AppState>,
    _admin: AdminSession
) -> Result<Json<Vec<payment_settings::Model>>> {
    Ok(Json(state.settings_service.list_payment_settings().await?))
}

pub async fn create_payment_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppJson(input): AppJson<PaymentSettingsInput>
) -> Result<(StatusCode, Json<payment_settings::Model>)> {
    let settings = state.settings_service.create_payment_settings(input).await?;

    Ok((StatusCode::CREATED, Json(settings)))
}

pub async fn update_payment_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<PaymentSettingsInput>
) -> Result<Json<payment_settings::Model>> {
    Ok(Json(state.settings_service.update_payment_settings(id, input).await?))
}

pub async fn delete_payment_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>
) -> Result<StatusCode> {
    state.settings_service.delete_payment_settings(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ─── Withdrawal settings ─────────────────────────────────────────────

pub async fn list_withdrawal_settings(
    State(state): State<AppState>,
    _admin: AdminSession
) -> Result<Json<Vec<withdrawal_settings::Model>>> {
    Ok(Json(state.settings_service.list_withdrawal_settings().await?))
}

pub async fn create_withdrawal_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppJson(input): AppJson<WithdrawalSettingsInput>
) -> Result<(StatusCode, Json<withdrawal_settings::Model>)> {
    let settings = state.settings_service.create_withdrawal_settings(input).await?;

    Ok((StatusCode::CREATED, Json(settings)))
}

pub async fn update_withdrawal_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<WithdrawalSettingsInput>
) -> Result<Json<withdrawal_settings::Model>> {
    Ok(Json(state.settings_service.update_withdrawal_settings(id, input).await?))
}

pub async fn delete_withdrawal_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>
) -> Result<StatusCode> {
    state.settings_service.delete_withdrawal_settings(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ─── Signup settings ─────────────────────────────────────────────────

pub async fn get_signup_settings(
    State(state): State<AppState>,
    _admin: AdminSession
) -> Result<Json<SignupRewards>> {
    Ok(Json(state.settings_service.get_signup_settings().await?))
}

pub async fn update_signup_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    AppJson(rewards): AppJson<SignupRewards>
) -> Result<Json<SignupRewards>> {
    Ok(Json(state.settings_service.update_signup_settings(rewards).await?))
}
