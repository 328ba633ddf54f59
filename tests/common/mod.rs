#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use invest_ledger::db::entity::{ profile, Profile };
use invest_ledger::services::auth_service::{ AuthResponse, SignupInput };
use invest_ledger::services::AuthService;
use invest_ledger::Config;
use migration::{ Migrator, MigratorTrait };
use sea_orm::sea_query::Expr;
use sea_orm::{
    prelude::Decimal,
    ColumnTrait,
    ConnectOptions,
    Database,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Fresh in-memory database with every migration applied. A single pooled
/// connection keeps the whole test on one SQLite database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn test_config() -> Config {
    let mut config = Config::new("sqlite::memory:");
    config.admin_emails = vec![ADMIN_EMAIL.to_string()];
    config
}

pub fn auth_service(db: &DatabaseConnection) -> AuthService {
    AuthService::new(db.clone(), Arc::new(test_config()))
}

pub fn signup_input(username: &str, referral_code: Option<&str>) -> SignupInput {
    SignupInput {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        phone: "0712345678".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        referral_code: referral_code.map(String::from),
    }
}

pub async fn signup(db: &DatabaseConnection, username: &str) -> AuthResponse {
    auth_service(db).signup(signup_input(username, None)).await.expect("signup")
}

pub async fn set_balance(db: &DatabaseConnection, profile_id: Uuid, balance: i64) {
    Profile::update_many()
        .col_expr(profile::Column::Balance, Expr::value(Decimal::from(balance)))
        .col_expr(profile::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(profile::Column::Id.eq(profile_id))
        .exec(db).await
        .expect("set balance");
}

pub async fn balance_of(db: &DatabaseConnection, profile_id: Uuid) -> Decimal {
    Profile::find_by_id(profile_id)
        .one(db).await
        .expect("load profile")
        .expect("profile exists")
        .balance
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}
