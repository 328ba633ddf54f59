pub mod validation;
pub mod auth_service;
pub mod referral_service;
pub mod profile_service;
pub mod transaction_service;
pub mod investment_service;
pub mod notification_service;
pub mod settings_service;
pub mod settlement_service;

pub use auth_service::{ AuthService, Session };
pub use referral_service::ReferralService;
pub use profile_service::ProfileService;
pub use transaction_service::TransactionService;
pub use investment_service::InvestmentService;
pub use notification_service::NotificationService;
pub use settings_service::SettingsService;
pub use settlement_service::SettlementService;
