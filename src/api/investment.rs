use axum::{ extract::{ Query, State }, http::StatusCode, Json };
use chrono::Utc;
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::cache::tables;
use crate::db::entity::investment;
use crate::enums::InvestmentStatus;
use crate::error::Result;
use crate::services::investment_service::InvestmentPackage;

use super::session::CurrentSession;
use super::json::AppJson;
use super::AppState;

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub amount: Decimal,
}

#[derive(Deserialize)]
pub struct InvestmentQueryParams {
    pub status: Option<InvestmentStatus>,
}

pub async fn list_packages(
    State(state): State<AppState>,
    _current: CurrentSession
) -> Json<Vec<InvestmentPackage>> {
    Json(state.investment_service.list_packages())
}

pub async fn purchase(
    State(state): State<AppState>,
    current: CurrentSession,
    AppJson(request): AppJson<PurchaseRequest>
) -> Result<(StatusCode, Json<InvestmentResponse>)> {
    let investment = state.investment_service.purchase(
        current.session.profile_id,
        request.amount
    ).await?;
    state.cache.invalidate_all(
        &[tables::INVESTMENTS, tables::TRANSACTIONS, tables::PROFILES]
    ).await;

    Ok((StatusCode::CREATED, Json(investment.into())))
}

pub async fn list_investments(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(params): Query<InvestmentQueryParams>
) -> Result<Json<Vec<InvestmentResponse>>> {
    let investments = state.investment_service.list_for_profile(
        current.session.profile_id,
        params.status
    ).await?;

    Ok(Json(investments.into_iter().map(Into::into).collect()))
}

#[derive(Serialize, Deserialize)]
pub struct InvestmentResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub daily_interest: Decimal,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub days_remaining: i64,
    pub total_returns: Decimal,
    pub last_return_at: Option<String>,
}

impl From<investment::Model> for InvestmentResponse {
    fn from(inv: investment::Model) -> Self {
        Self {
            id: inv.id,
            amount: inv.amount,
            daily_interest: inv.daily_interest,
            days_remaining: (inv.end_date - Utc::now()).num_days().max(0),
            status: inv.status,
            start_date: inv.start_date.to_rfc3339(),
            end_date: inv.end_date.to_rfc3339(),
            total_returns: inv.total_returns,
            last_return_at: inv.last_return_at.map(|t| t.to_rfc3339()),
        }
    }
}
