mod common;

use common::*;
use invest_ledger::db::entity::{ notification, Notification };
use invest_ledger::enums::NotificationKind;
use invest_ledger::services::notification_service::NewNotification;
use invest_ledger::services::NotificationService;
use invest_ledger::AppError;
use sea_orm::{ ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter };
use uuid::Uuid;

fn maintenance(persistent: bool) -> NewNotification {
    NewNotification {
        title: "Maintenance".to_string(),
        message: "Withdrawals pause tonight at 22:00.".to_string(),
        kind: NotificationKind::Warning,
        persistent,
    }
}

#[tokio::test]
async fn test_broadcast_writes_one_row_per_profile() {
    let db = setup_db().await;
    let mut ids = Vec::new();
    for name in ["alice", "bob", "carol", "dave", "erin"] {
        ids.push(signup(&db, name).await.profile.id);
    }
    let service = NotificationService::new(db.clone());

    let count = service.broadcast(maintenance(false)).await.unwrap();

    assert_eq!(count, 5);
    let rows = Notification::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|n| n.is_broadcast && n.title == "Maintenance" && n.kind == "warning"));
    for id in ids {
        assert_eq!(rows.iter().filter(|n| n.profile_id == id).count(), 1);
    }
}

#[tokio::test]
async fn test_broadcast_with_no_profiles_is_empty() {
    let db = setup_db().await;

    let count = NotificationService::new(db.clone()).broadcast(maintenance(false)).await.unwrap();

    assert_eq!(count, 0);
    assert_eq!(Notification::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let db = setup_db().await;
    let profile = signup(&db, "frank").await.profile;

    let mut blank = maintenance(false);
    blank.title = " ".to_string();

    let result = NotificationService::new(db.clone()).send(profile.id, blank).await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_read_state() {
    let db = setup_db().await;
    let profile = signup(&db, "grace").await.profile;
    let service = NotificationService::new(db.clone());

    let first = service.send(profile.id, maintenance(false)).await.unwrap();
    service.send(profile.id, maintenance(false)).await.unwrap();
    service.send(profile.id, maintenance(false)).await.unwrap();
    assert_eq!(service.unread_count(profile.id).await.unwrap(), 3);

    let read = service.mark_read(profile.id, first.id).await.unwrap();
    assert!(read.is_read);
    assert_eq!(service.unread_count(profile.id).await.unwrap(), 2);

    assert_eq!(service.mark_all_read(profile.id).await.unwrap(), 2);
    assert_eq!(service.unread_count(profile.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_other_profiles_notifications_are_not_found() {
    let db = setup_db().await;
    let owner = signup(&db, "heidi").await.profile;
    let stranger = signup(&db, "ivan").await.profile;
    let service = NotificationService::new(db.clone());

    let sent = service.send(owner.id, maintenance(false)).await.unwrap();

    assert!(matches!(service.mark_read(stranger.id, sent.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(service.dismiss(stranger.id, sent.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        service.mark_read(owner.id, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_dismiss_hides_only_non_persistent() {
    let db = setup_db().await;
    let profile = signup(&db, "judy").await.profile;
    let service = NotificationService::new(db.clone());

    let regular = service.send(profile.id, maintenance(false)).await.unwrap();
    let pinned = service.send(profile.id, maintenance(true)).await.unwrap();

    service.dismiss(profile.id, regular.id).await.unwrap();
    // Dismissing twice is harmless
    service.dismiss(profile.id, regular.id).await.unwrap();

    assert!(matches!(service.dismiss(profile.id, pinned.id).await, Err(AppError::Conflict(_))));

    let visible = service.list_for_profile(profile.id).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, pinned.id);

    // The row itself stays
    let stored = Notification::find()
        .filter(notification::Column::ProfileId.eq(profile.id))
        .count(&db).await
        .unwrap();
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn test_send_to_unknown_profile_is_not_found() {
    let db = setup_db().await;
    let service = NotificationService::new(db.clone());

    let result = service.send(Uuid::new_v4(), maintenance(false)).await;

    assert!(matches!(result, Err(AppError::NotFound(ref what)) if what == "Profile"));
    assert_eq!(Notification::find().count(&db).await.unwrap(), 0);
}
