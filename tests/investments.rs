mod common;

use std::sync::Arc;

use chrono::{ DateTime, Duration, Utc };
use common::*;
use invest_ledger::config::InvestmentTerms;
use invest_ledger::db::entity::{ investment, transaction, Investment, Transaction };
use invest_ledger::enums::{ InvestmentStatus, TransactionKind, TransactionStatus };
use invest_ledger::services::{ InvestmentService, NotificationService, SettlementService };
use invest_ledger::settlement::SettlementWorker;
use invest_ledger::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{ ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter };
use uuid::Uuid;

fn investments(db: &DatabaseConnection) -> InvestmentService {
    InvestmentService::new(db.clone(), InvestmentTerms::default())
}

/// Moves an investment's start back by `days`, keeping its 14-day term.
async fn backdate(db: &DatabaseConnection, id: Uuid, days: i64) -> DateTime<Utc> {
    let inv = Investment::find_by_id(id).one(db).await.unwrap().unwrap();
    let start = inv.start_date - Duration::days(days);

    Investment::update_many()
        .col_expr(investment::Column::StartDate, Expr::value(start))
        .col_expr(investment::Column::EndDate, Expr::value(start + Duration::days(14)))
        .filter(investment::Column::Id.eq(id))
        .exec(db).await
        .unwrap();

    start
}

async fn reload(db: &DatabaseConnection, id: Uuid) -> investment::Model {
    Investment::find_by_id(id).one(db).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_purchase_with_exact_balance() {
    let db = setup_db().await;
    let profile = signup(&db, "alice").await.profile;
    set_balance(&db, profile.id, 100).await;

    let inv = investments(&db).purchase(profile.id, dec(100)).await.unwrap();

    assert_eq!(balance_of(&db, profile.id).await, dec(0));
    assert_eq!(inv.status, InvestmentStatus::Active.as_str());
    assert_eq!(inv.amount, dec(100));
    assert_eq!(inv.daily_interest, dec(10));
    assert_eq!(inv.end_date - inv.start_date, Duration::days(14));
    assert_eq!(inv.total_returns, dec(0));

    let ledger = Transaction::find()
        .filter(transaction::Column::ProfileId.eq(profile.id))
        .all(&db).await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, TransactionKind::Investment.as_str());
    assert_eq!(ledger[0].status, TransactionStatus::Approved.as_str());
    assert_eq!(ledger[0].amount, dec(100));
}

#[tokio::test]
async fn test_purchase_with_short_balance_writes_nothing() {
    let db = setup_db().await;
    let profile = signup(&db, "bob").await.profile;
    set_balance(&db, profile.id, 99).await;

    let result = investments(&db).purchase(profile.id, dec(100)).await;

    assert!(matches!(result, Err(AppError::InsufficientBalance)));
    assert_eq!(balance_of(&db, profile.id).await, dec(99));
    assert_eq!(Investment::find().count(&db).await.unwrap(), 0);
    assert_eq!(Transaction::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_purchase_rejects_non_package_amounts() {
    let db = setup_db().await;
    let profile = signup(&db, "carol").await.profile;
    set_balance(&db, profile.id, 1000).await;

    assert!(matches!(
        investments(&db).purchase(profile.id, dec(120)).await,
        Err(AppError::InvalidInput(_))
    ));
    assert_eq!(balance_of(&db, profile.id).await, dec(1000));
}

#[tokio::test]
async fn test_second_purchase_cannot_overspend() {
    let db = setup_db().await;
    let profile = signup(&db, "dave").await.profile;
    set_balance(&db, profile.id, 150).await;
    let service = investments(&db);

    service.purchase(profile.id, dec(100)).await.unwrap();
    assert!(matches!(
        service.purchase(profile.id, dec(100)).await,
        Err(AppError::InsufficientBalance)
    ));

    assert_eq!(balance_of(&db, profile.id).await, dec(50));
    assert_eq!(service.list_for_profile(profile.id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_daily_returns_are_credited_once_per_day() {
    let db = setup_db().await;
    let profile = signup(&db, "erin").await.profile;
    set_balance(&db, profile.id, 100).await;
    let inv = investments(&db).purchase(profile.id, dec(100)).await.unwrap();
    let start = backdate(&db, inv.id, 3).await;
    let settlement = SettlementService::new(db.clone());

    let now = start + Duration::days(3) + Duration::hours(1);
    assert_eq!(settlement.calculate_daily_investment_returns(now).await.unwrap(), 1);

    assert_eq!(balance_of(&db, profile.id).await, dec(30));
    let settled = reload(&db, inv.id).await;
    assert_eq!(settled.total_returns, dec(30));
    assert_eq!(settled.last_return_at, Some(start + Duration::days(3)));

    // A repeated run in the same day pays nothing
    assert_eq!(settlement.calculate_daily_investment_returns(now).await.unwrap(), 0);
    assert_eq!(balance_of(&db, profile.id).await, dec(30));

    // The next day pays exactly one more day
    let tomorrow = now + Duration::days(1);
    assert_eq!(settlement.calculate_daily_investment_returns(tomorrow).await.unwrap(), 1);
    assert_eq!(balance_of(&db, profile.id).await, dec(40));
}

#[tokio::test]
async fn test_completion_pays_remaining_returns_and_principal() {
    let db = setup_db().await;
    let profile = signup(&db, "frank").await.profile;
    set_balance(&db, profile.id, 100).await;
    let inv = investments(&db).purchase(profile.id, dec(100)).await.unwrap();
    let start = backdate(&db, inv.id, 20).await;
    let settlement = SettlementService::new(db.clone());

    // Five days were already paid out earlier
    let now = start + Duration::days(5);
    settlement.calculate_daily_investment_returns(now).await.unwrap();
    assert_eq!(balance_of(&db, profile.id).await, dec(50));

    let now = start + Duration::days(20);
    assert_eq!(settlement.update_completed_investments(now).await.unwrap(), 1);

    // 14 days at 10 plus the principal
    assert_eq!(balance_of(&db, profile.id).await, dec(240));
    let done = reload(&db, inv.id).await;
    assert_eq!(done.status, InvestmentStatus::Completed.as_str());
    assert_eq!(done.total_returns, dec(140));

    // Completed investments are left alone afterwards
    assert_eq!(settlement.update_completed_investments(now).await.unwrap(), 0);
    assert_eq!(settlement.calculate_daily_investment_returns(now).await.unwrap(), 0);
    assert_eq!(balance_of(&db, profile.id).await, dec(240));

    let notifications = NotificationService::new(db.clone()).list_for_profile(profile.id).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Investment completed");
}

#[tokio::test]
async fn test_immature_investments_are_not_completed() {
    let db = setup_db().await;
    let profile = signup(&db, "grace").await.profile;
    set_balance(&db, profile.id, 250).await;
    let inv = investments(&db).purchase(profile.id, dec(250)).await.unwrap();
    let settlement = SettlementService::new(db.clone());

    let now = inv.start_date + Duration::days(13);
    assert_eq!(settlement.update_completed_investments(now).await.unwrap(), 0);
    assert_eq!(reload(&db, inv.id).await.status, InvestmentStatus::Active.as_str());

    let active = investments(&db)
        .list_for_profile(profile.id, Some(InvestmentStatus::Active)).await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_credit_balance() {
    let db = setup_db().await;
    let profile = signup(&db, "heidi").await.profile;
    let settlement = SettlementService::new(db.clone());

    settlement.credit_balance(profile.id, dec(75)).await.unwrap();
    settlement.credit_balance(profile.id, dec(25)).await.unwrap();
    assert_eq!(balance_of(&db, profile.id).await, dec(100));

    assert!(matches!(
        settlement.credit_balance(profile.id, dec(-5)).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        settlement.credit_balance(Uuid::new_v4(), dec(5)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_worker_pass_settles_matured_investments() {
    let db = setup_db().await;
    let profile = signup(&db, "ivan").await.profile;
    set_balance(&db, profile.id, 500).await;
    let inv = investments(&db).purchase(profile.id, dec(500)).await.unwrap();
    backdate(&db, inv.id, 15).await;

    let worker = SettlementWorker::new(
        Arc::new(SettlementService::new(db.clone())),
        Arc::new(auth_service(&db)),
        3600
    );
    worker.run_once().await;

    // 14 days at 50 plus the principal
    assert_eq!(balance_of(&db, profile.id).await, dec(1200));
    assert_eq!(reload(&db, inv.id).await.status, InvestmentStatus::Completed.as_str());

    worker.run_once().await;
    assert_eq!(balance_of(&db, profile.id).await, dec(1200));
}
