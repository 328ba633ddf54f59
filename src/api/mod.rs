use std::sync::Arc;
use std::time::Duration;

use axum::{ routing::{ get, post, put }, Router };
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod json;
pub mod session;
pub mod auth;
pub mod profile;
pub mod transaction;
pub mod investment;
pub mod notification;
pub mod admin;
pub mod functions;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::services::{
    AuthService,
    InvestmentService,
    NotificationService,
    ProfileService,
    ReferralService,
    SettingsService,
    SettlementService,
    TransactionService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: QueryCache,
    pub auth_service: Arc<AuthService>,
    pub referral_service: Arc<ReferralService>,
    pub profile_service: Arc<ProfileService>,
    pub transaction_service: Arc<TransactionService>,
    pub investment_service: Arc<InvestmentService>,
    pub notification_service: Arc<NotificationService>,
    pub settings_service: Arc<SettingsService>,
    pub settlement_service: Arc<SettlementService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let config = Arc::new(config);

        Self {
            cache: QueryCache::new(),
            auth_service: Arc::new(AuthService::new(db.clone(), config.clone())),
            referral_service: Arc::new(ReferralService::new(db.clone())),
            profile_service: Arc::new(ProfileService::new(db.clone())),
            transaction_service: Arc::new(TransactionService::new(db.clone())),
            investment_service: Arc::new(
                InvestmentService::new(db.clone(), config.investment_terms)
            ),
            notification_service: Arc::new(NotificationService::new(db.clone())),
            settings_service: Arc::new(SettingsService::new(db.clone())),
            settlement_service: Arc::new(SettlementService::new(db)),
            config,
        }
    }

    /// How long admin list queries may be served from the cache.
    pub fn admin_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.admin_poll_interval_secs)
    }
}

pub fn router(state: AppState) -> Router {
    let functions = Router::new()
        .route("/calculate-daily-returns", post(functions::calculate_daily_returns))
        .route("/update-completed-investments", post(functions::update_completed_investments))
        .route("/credit-balance", post(functions::credit_balance))
        .layer(CorsLayer::permissive());

    let admin = Router::new()
        .route("/transactions", get(admin::list_transactions))
        .route("/transactions/{id}/approve", post(admin::approve_transaction))
        .route("/transactions/{id}/reject", post(admin::reject_transaction))
        .route("/users", get(admin::list_users))
        .route("/stats", get(admin::stats))
        .route("/notifications", post(admin::send_notification))
        .route("/notifications/broadcast", post(admin::broadcast_notification))
        .route(
            "/payment-settings",
            get(admin::list_payment_settings).post(admin::create_payment_settings)
        )
        .route(
            "/payment-settings/{id}",
            put(admin::update_payment_settings).delete(admin::delete_payment_settings)
        )
        .route(
            "/withdrawal-settings",
            get(admin::list_withdrawal_settings).post(admin::create_withdrawal_settings)
        )
        .route(
            "/withdrawal-settings/{id}",
            put(admin::update_withdrawal_settings).delete(admin::delete_withdrawal_settings)
        )
        .route(
            "/signup-settings",
            get(admin::get_signup_settings).put(admin::update_signup_settings)
        );

    let api = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route("/referrals/validate/{code}", get(profile::validate_referral_code))
        .route("/referrals/stats", get(profile::referral_statistics))
        .route("/dashboard", get(profile::dashboard))
        .route("/profile", get(profile::get_profile).patch(profile::update_profile))
        .route("/deposits/accounts", get(transaction::list_deposit_accounts))
        .route("/deposits", post(transaction::request_deposit))
        .route("/withdrawals/networks", get(transaction::list_withdrawal_networks))
        .route("/withdrawals", post(transaction::request_withdrawal))
        .route("/transactions", get(transaction::history))
        .route("/investments/packages", get(investment::list_packages))
        .route("/investments", get(investment::list_investments).post(investment::purchase))
        .route("/messages", get(notification::list_notifications))
        .route("/messages/read-all", post(notification::mark_all_read))
        .route("/messages/{id}/read", post(notification::mark_read))
        .route("/messages/{id}/dismiss", post(notification::dismiss))
        .nest("/admin", admin);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .nest("/functions", functions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
