use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ notification, Notification };
use crate::db::ProfileRepository;
use crate::enums::NotificationKind;
use crate::error::{ AppError, Result };
use crate::services::validation::require_text;

/// Rows per INSERT when fanning a broadcast out to every profile.
const BROADCAST_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub persistent: bool,
}

impl NewNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            persistent: false,
        }
    }

    fn validated(self) -> Result<Self> {
        Ok(Self {
            title: require_text("Title", &self.title)?,
            message: require_text("Message", &self.message)?,
            ..self
        })
    }

    fn to_active_model(&self, profile_id: Uuid, broadcast: bool) -> notification::ActiveModel {
        let now = Utc::now();

        notification::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            profile_id: ActiveValue::Set(profile_id),
            title: ActiveValue::Set(self.title.clone()),
            message: ActiveValue::Set(self.message.clone()),
            kind: ActiveValue::Set(self.kind.to_string()),
            is_read: ActiveValue::Set(false),
            is_broadcast: ActiveValue::Set(broadcast),
            is_persistent: ActiveValue::Set(self.persistent),
            dismissed_by: ActiveValue::Set(serde_json::json!([])),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Send a notification to one profile
    pub async fn send(&self, profile_id: Uuid, new: NewNotification) -> Result<notification::Model> {
        let new = new.validated()?;
        ProfileRepository::new(self.db.clone()).find_by_id(profile_id).await?;

        let notification = new.to_active_model(profile_id, false).insert(&self.db).await?;
        Ok(notification)
    }

    /// Fire-and-forget variant used by the ledger flows. Failures are logged.
    pub async fn notify(&self, profile_id: Uuid, title: &str, message: String, kind: NotificationKind) {
        if let Err(e) = self.send(profile_id, NewNotification::new(title, message, kind)).await {
            tracing::warn!("Failed to notify profile {}: {}", profile_id, e);
        }
    }

    /// Fan a notification out to every existing profile. Returns rows written.
    pub async fn broadcast(&self, new: NewNotification) -> Result<u64> {
        let new = new.validated()?;
        let txn = self.db.begin().await?;

        let profile_ids = ProfileRepository::all_ids(&txn).await?;

        for chunk in profile_ids.chunks(BROADCAST_CHUNK_SIZE) {
            let rows = chunk.iter().map(|id| new.to_active_model(*id, true));
            Notification::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!("Broadcast '{}' delivered to {} profiles", new.title, profile_ids.len());

        Ok(profile_ids.len() as u64)
    }

    /// Notifications for a profile, newest first, without the dismissed ones
    pub async fn list_for_profile(&self, profile_id: Uuid) -> Result<Vec<notification::Model>> {
        let notifications = Notification::find()
            .filter(notification::Column::ProfileId.eq(profile_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(
            notifications
                .into_iter()
                .filter(|n| !n.is_dismissed_by(profile_id))
                .collect()
        )
    }

    pub async fn unread_count(&self, profile_id: Uuid) -> Result<u64> {
        let count = Notification::find()
            .filter(notification::Column::ProfileId.eq(profile_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db).await?;

        Ok(count)
    }

    async fn find_owned(&self, profile_id: Uuid, id: Uuid) -> Result<notification::Model> {
        Notification::find_by_id(id)
            .filter(notification::Column::ProfileId.eq(profile_id))
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Notification".to_string()))
    }

    pub async fn mark_read(&self, profile_id: Uuid, id: Uuid) -> Result<notification::Model> {
        let notification = self.find_owned(profile_id, id).await?;

        if notification.is_read {
            return Ok(notification);
        }

        let mut active: notification::ActiveModel = notification.into();
        active.is_read = ActiveValue::Set(true);
        active.updated_at = ActiveValue::Set(Utc::now());
        let updated = active.update(&self.db).await?;

        Ok(updated)
    }

    pub async fn mark_all_read(&self, profile_id: Uuid) -> Result<u64> {
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .col_expr(notification::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification::Column::ProfileId.eq(profile_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db).await?;

        Ok(result.rows_affected)
    }

    /// Hide a notification for the caller, which also marks it read.
    /// Persistent ones stay.
    pub async fn dismiss(&self, profile_id: Uuid, id: Uuid) -> Result<()> {
        let notification = self.find_owned(profile_id, id).await?;

        if notification.is_persistent {
            return Err(AppError::Conflict("Persistent notifications cannot be dismissed".to_string()));
        }
        if notification.is_dismissed_by(profile_id) {
            return Ok(());
        }

        let mut dismissed = notification.dismissed_by.as_array().cloned().unwrap_or_default();
        dismissed.push(serde_json::Value::String(profile_id.to_string()));

        let mut active: notification::ActiveModel = notification.into();
        active.dismissed_by = ActiveValue::Set(serde_json::Value::Array(dismissed));
        active.is_read = ActiveValue::Set(true);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.db).await?;

        Ok(())
    }
}
