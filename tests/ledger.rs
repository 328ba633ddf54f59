mod common;

use common::*;
use invest_ledger::db::entity::Transaction;
use invest_ledger::enums::{ TransactionKind, TransactionStatus };
use invest_ledger::services::settings_service::WithdrawalSettingsInput;
use invest_ledger::services::transaction_service::{ DepositRequest, WithdrawalRequest };
use invest_ledger::services::{ NotificationService, SettingsService, TransactionService };
use invest_ledger::AppError;
use sea_orm::{ DatabaseConnection, EntityTrait, PaginatorTrait };
use uuid::Uuid;

fn deposit(amount: i64) -> DepositRequest {
    DepositRequest {
        account_name: "Alice Doe".to_string(),
        email: "alice@example.com".to_string(),
        phone: "0712345678".to_string(),
        transaction_ref: "MPESA-QX12".to_string(),
        amount: dec(amount),
        network: None,
    }
}

fn withdrawal(network: &str, amount: i64) -> WithdrawalRequest {
    WithdrawalRequest {
        phone: "0712345678".to_string(),
        network: network.to_string(),
        account_name: "Alice Doe".to_string(),
        amount: dec(amount),
    }
}

async fn add_network(db: &DatabaseConnection, network: &str, minimum: i64, is_active: bool) {
    SettingsService::new(db.clone())
        .create_withdrawal_settings(WithdrawalSettingsInput {
            network: network.to_string(),
            minimum_amount: dec(minimum),
            is_active,
        }).await
        .unwrap();
}

async fn transaction_count(db: &DatabaseConnection) -> u64 {
    Transaction::find().count(db).await.unwrap()
}

#[tokio::test]
async fn test_deposit_request_is_pending_and_leaves_balance() {
    let db = setup_db().await;
    let profile = signup(&db, "alice").await.profile;
    let service = TransactionService::new(db.clone());

    let tx = service.request_deposit(profile.id, deposit(250)).await.unwrap();

    assert_eq!(tx.kind, TransactionKind::Deposit.as_str());
    assert_eq!(tx.status, TransactionStatus::Pending.as_str());
    assert_eq!(tx.transaction_ref.as_deref(), Some("MPESA-QX12"));
    assert_eq!(balance_of(&db, profile.id).await, dec(0));
}

#[tokio::test]
async fn test_deposit_must_be_a_package() {
    let db = setup_db().await;
    let profile = signup(&db, "bob").await.profile;
    let service = TransactionService::new(db.clone());

    assert!(matches!(
        service.request_deposit(profile.id, deposit(75)).await,
        Err(AppError::InvalidInput(_))
    ));

    let mut blank_ref = deposit(100);
    blank_ref.transaction_ref = "  ".to_string();
    assert!(service.request_deposit(profile.id, blank_ref).await.is_err());

    assert_eq!(transaction_count(&db).await, 0);
}

#[tokio::test]
async fn test_withdrawal_validation_order() {
    let db = setup_db().await;
    let profile = signup(&db, "carol").await.profile;
    set_balance(&db, profile.id, 100).await;
    add_network(&db, "M-Pesa", 50, true).await;
    add_network(&db, "Airtel", 10, false).await;
    let service = TransactionService::new(db.clone());

    // Unknown and inactive networks are rejected before anything else
    assert!(matches!(
        service.request_withdrawal(profile.id, withdrawal("Bank", 1000)).await,
        Err(AppError::NetworkUnavailable)
    ));
    assert!(matches!(
        service.request_withdrawal(profile.id, withdrawal("Airtel", 1000)).await,
        Err(AppError::NetworkUnavailable)
    ));

    match service.request_withdrawal(profile.id, withdrawal("M-Pesa", 40)).await {
        Err(AppError::BelowMinimum { minimum }) => assert_eq!(minimum, dec(50)),
        other => panic!("expected below minimum, got {:?}", other.map(|t| t.id)),
    }

    assert!(matches!(
        service.request_withdrawal(profile.id, withdrawal("M-Pesa", 150)).await,
        Err(AppError::InsufficientBalance)
    ));

    assert_eq!(transaction_count(&db).await, 0);

    let tx = service.request_withdrawal(profile.id, withdrawal("M-Pesa", 100)).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending.as_str());
    assert_eq!(tx.network.as_deref(), Some("M-Pesa"));
    assert_eq!(balance_of(&db, profile.id).await, dec(100));
}

#[tokio::test]
async fn test_approving_deposit_credits_balance_and_notifies() {
    let db = setup_db().await;
    let profile = signup(&db, "dave").await.profile;
    let service = TransactionService::new(db.clone());

    let tx = service.request_deposit(profile.id, deposit(500)).await.unwrap();
    let approved = service.approve(tx.id).await.unwrap();

    assert_eq!(approved.status, TransactionStatus::Approved.as_str());
    assert_eq!(balance_of(&db, profile.id).await, dec(500));

    let notifications = NotificationService::new(db.clone()).list_for_profile(profile.id).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "success");
}

#[tokio::test]
async fn test_resolved_transactions_cannot_change_again() {
    let db = setup_db().await;
    let profile = signup(&db, "erin").await.profile;
    let service = TransactionService::new(db.clone());

    let tx = service.request_deposit(profile.id, deposit(100)).await.unwrap();
    service.approve(tx.id).await.unwrap();

    assert!(matches!(service.approve(tx.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(service.reject(tx.id).await, Err(AppError::Conflict(_))));
    assert_eq!(balance_of(&db, profile.id).await, dec(100));

    assert!(matches!(service.approve(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_rejecting_leaves_balance_untouched() {
    let db = setup_db().await;
    let profile = signup(&db, "frank").await.profile;
    let service = TransactionService::new(db.clone());

    let tx = service.request_deposit(profile.id, deposit(1000)).await.unwrap();
    let rejected = service.reject(tx.id).await.unwrap();

    assert_eq!(rejected.status, TransactionStatus::Rejected.as_str());
    assert_eq!(balance_of(&db, profile.id).await, dec(0));
}

#[tokio::test]
async fn test_approving_withdrawal_debits_balance() {
    let db = setup_db().await;
    let profile = signup(&db, "grace").await.profile;
    set_balance(&db, profile.id, 300).await;
    add_network(&db, "M-Pesa", 50, true).await;
    let service = TransactionService::new(db.clone());

    let tx = service.request_withdrawal(profile.id, withdrawal("M-Pesa", 200)).await.unwrap();
    service.approve(tx.id).await.unwrap();

    assert_eq!(balance_of(&db, profile.id).await, dec(100));
}

#[tokio::test]
async fn test_withdrawal_approval_with_spent_balance_stays_pending() {
    let db = setup_db().await;
    let profile = signup(&db, "heidi").await.profile;
    set_balance(&db, profile.id, 300).await;
    add_network(&db, "M-Pesa", 50, true).await;
    let service = TransactionService::new(db.clone());

    let tx = service.request_withdrawal(profile.id, withdrawal("M-Pesa", 250)).await.unwrap();
    set_balance(&db, profile.id, 100).await;

    assert!(matches!(service.approve(tx.id).await, Err(AppError::InsufficientBalance)));

    let still = service.get_transaction(tx.id).await.unwrap();
    assert_eq!(still.status, TransactionStatus::Pending.as_str());
    assert_eq!(balance_of(&db, profile.id).await, dec(100));
}

#[tokio::test]
async fn test_history_is_filtered_and_paged() {
    let db = setup_db().await;
    let profile = signup(&db, "ivan").await.profile;
    let other = signup(&db, "judy").await.profile;
    set_balance(&db, profile.id, 1000).await;
    add_network(&db, "M-Pesa", 50, true).await;
    let service = TransactionService::new(db.clone());

    service.request_deposit(profile.id, deposit(100)).await.unwrap();
    service.request_deposit(profile.id, deposit(250)).await.unwrap();
    service.request_withdrawal(profile.id, withdrawal("M-Pesa", 60)).await.unwrap();
    service.request_deposit(other.id, deposit(50)).await.unwrap();

    let all = service.list_for_profile(profile.id, None, None, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|t| t.profile_id == profile.id));
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let deposits = service
        .list_for_profile(profile.id, Some(TransactionKind::Deposit), None, None).await
        .unwrap();
    assert_eq!(deposits.len(), 2);

    let page = service.list_for_profile(profile.id, None, Some(2), Some(2)).await.unwrap();
    assert_eq!(page.len(), 1);

    let pending = service.list_all(Some(TransactionStatus::Pending), None).await.unwrap();
    assert_eq!(pending.len(), 4);
}
