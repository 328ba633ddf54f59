pub mod config;
pub mod enums;
pub mod error;
pub mod cache;
pub mod db;
pub mod services;
pub mod api;
pub mod settlement;

pub use config::Config;
pub use enums::{ InvestmentStatus, NotificationKind, TransactionKind, TransactionStatus };
pub use error::{ AppError, Result };
