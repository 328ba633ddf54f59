use axum::{ extract::{ Path, State }, http::StatusCode, Json };
use serde::Serialize;
use uuid::Uuid;

use crate::cache::tables;
use crate::db::entity::notification;
use crate::error::Result;

use super::session::CurrentSession;
use super::AppState;

#[derive(Serialize)]
pub struct NotificationList {
    pub unread: usize,
    pub notifications: Vec<notification::Model>,
}

#[derive(Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    current: CurrentSession
) -> Result<Json<NotificationList>> {
    let notifications = state.notification_service.list_for_profile(
        current.session.profile_id
    ).await?;

    Ok(
        Json(NotificationList {
            unread: notifications
                .iter()
                .filter(|n| !n.is_read)
                .count(),
            notifications,
        })
    )
}

pub async fn mark_read(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<Uuid>
) -> Result<Json<notification::Model>> {
    let notification = state.notification_service.mark_read(current.session.profile_id, id).await?;
    state.cache.invalidate(tables::NOTIFICATIONS).await;

    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    current: CurrentSession
) -> Result<Json<MarkedRead>> {
    let updated = state.notification_service.mark_all_read(current.session.profile_id).await?;
    state.cache.invalidate(tables::NOTIFICATIONS).await;

    Ok(Json(MarkedRead { updated }))
}

pub async fn dismiss(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<Uuid>
) -> Result<StatusCode> {
    state.notification_service.dismiss(current.session.profile_id, id).await?;
    state.cache.invalidate(tables::NOTIFICATIONS).await;

    Ok(StatusCode::NO_CONTENT)
}
