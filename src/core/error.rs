use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
///
/// Expected rejections (`NotFound`, `Forbidden`, `Domain`, `InsufficientFunds`)
/// are surfaced to the caller as-is and are never retried. Infrastructure
/// failures (`Database`, `Internal`) abort the whole operation; callers that
/// already performed a ledger movement must compensate before propagating.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Loan, user, wallet, or installment lookup missed
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ownership or role violation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Business-rule violation (ineligible amount, no pending EMI, bad state)
    #[error("Domain rule violated: {0}")]
    Domain(String),

    /// Wallet balance too low, propagated from the ledger gateway
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Domain(_) => "DOMAIN_RULE",
            AppError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            AppError::Configuration(_) => "CONFIGURATION",
            AppError::Database(_) | AppError::Internal(_) => "INFRASTRUCTURE",
        }
    }

    fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_)
        )
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // Raw internals never reach the caller
        let message = if self.is_infrastructure() {
            tracing::error!(error = %self, "request failed with infrastructure error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": message,
                "status": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientFunds(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        AppError::Domain(msg.into())
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        AppError::InsufficientFunds(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
