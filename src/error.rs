use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    gateway::signature::SignatureError,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Checkout session has no buyer identity")]
    MissingBuyerIdentity,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    InvalidStatus(String),

    #[error("Update failed")]
    UpdateFailed(#[source] sea_orm::DbErr),

    #[error("Database error")]
    Db(#[from] sea_orm::DbErr),

    #[error("Database error")]
    Sqlx(#[from] sqlx::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable, localizable code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Signature(_) => "invalid_signature",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingBuyerIdentity => "missing_buyer_identity",
            AppError::NotAuthenticated => "not_authenticated",
            AppError::NotAuthorized => "not_authorized",
            AppError::NotFound => "not_found",
            AppError::InvalidStatus(_) => "invalid_status",
            AppError::UpdateFailed(_) => "update_failed",
            AppError::Db(_) | AppError::Sqlx(_) => "store_unavailable",
            AppError::Internal(_) => "unexpected",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Signature(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::MissingBuyerIdentity => StatusCode::BAD_REQUEST,
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotAuthorized => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidStatus(_) => StatusCode::CONFLICT,
            AppError::UpdateFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Db(_) | AppError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the gateway should redeliver the event that produced this error.
    pub fn is_retryable(&self) -> bool {
        self.status_code().is_server_error()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    pub error: String,
    pub code: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::UpdateFailed(source) => {
                tracing::error!(error = %source, "order item update failed")
            }
            AppError::Db(source) => tracing::error!(error = %source, "database error"),
            AppError::Sqlx(source) => tracing::error!(error = %source, "database error"),
            AppError::Internal(source) => tracing::error!(error = %source, "unexpected error"),
            _ => tracing::debug!(error = %self, code = self.code(), "request rejected"),
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                code: self.code().to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
