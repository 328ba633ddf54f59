use sea_orm::prelude::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Invalid referral code.")]
    InvalidReferralCode,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Selected network is not available")]
    NetworkUnavailable,

    #[error("Amount is below the network minimum of {minimum}")] BelowMinimum {
        minimum: Decimal,
    },

    #[error("Not found: {0}")] NotFound(String),

    #[error("Conflict: {0}")] Conflict(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            // Cause is logged in into_response; the client gets a generic notice
            AppError::Database(_) =>
                ("DATABASE_ERROR", "Something went wrong, please try again".to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::InvalidReferralCode =>
                (
                    "INVALID_REFERRAL_CODE",
                    "Invalid referral code.".to_string(),
                    Some("referral_code".to_string()),
                ),
            AppError::InsufficientBalance =>
                ("INSUFFICIENT_BALANCE", "Insufficient balance".to_string(), Some("amount".to_string())),
            AppError::NetworkUnavailable =>
                (
                    "NETWORK_UNAVAILABLE",
                    "Selected network is not available".to_string(),
                    Some("network".to_string()),
                ),
            AppError::BelowMinimum { minimum } =>
                (
                    "BELOW_MINIMUM",
                    format!("Minimum withdrawal amount for this network is {}", minimum),
                    Some("amount".to_string()),
                ),
            AppError::NotFound(what) => ("NOT_FOUND", format!("{} not found", what), None),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone(), None),
            AppError::Unauthorized =>
                ("UNAUTHORIZED", "Authentication required".to_string(), None),
            AppError::Forbidden => ("FORBIDDEN", "Admin access required".to_string(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            | AppError::InvalidInput(_)
            | AppError::InvalidReferralCode
            | AppError::InsufficientBalance
            | AppError::NetworkUnavailable
            | AppError::BelowMinimum { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
