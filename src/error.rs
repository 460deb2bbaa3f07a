//! Error handling module
//!
//! Maps service errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::{AccountError, TransferError};
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ErrorParts = (StatusCode, &'static str, Option<String>);

fn store_error_parts(e: &StoreError) -> ErrorParts {
    if e.is_timeout() {
        tracing::error!("Database timeout: {:?}", e);
        return (StatusCode::GATEWAY_TIMEOUT, "database_timeout", None);
    }
    tracing::error!("Database error: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
}

fn account_error_parts(e: &AccountError) -> ErrorParts {
    match e {
        AccountError::AccountNotFound(id) => {
            (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
        }
        AccountError::InvalidAccount(msg) => {
            (StatusCode::BAD_REQUEST, "invalid_account", Some(msg.clone()))
        }
        AccountError::Store(e) => store_error_parts(e),
    }
}

fn transfer_error_parts(e: &TransferError) -> ErrorParts {
    match e {
        TransferError::InvalidTransferId(id) => {
            (StatusCode::NOT_FOUND, "invalid_transfer_id", Some(id.to_string()))
        }
        TransferError::SameAccountTransfer => {
            (StatusCode::BAD_REQUEST, "same_account_transfer", None)
        }
        TransferError::InsufficientBalance { .. } => {
            (StatusCode::BAD_REQUEST, "insufficient_balance", Some(e.to_string()))
        }
        TransferError::BalanceOverflow(id) => {
            (StatusCode::BAD_REQUEST, "balance_overflow", Some(id.to_string()))
        }
        TransferError::InvalidAmount(reason) => {
            (StatusCode::BAD_REQUEST, "invalid_amount", Some(reason.to_string()))
        }
        TransferError::Timeout(_) => {
            (StatusCode::GATEWAY_TIMEOUT, "transfer_timeout", None)
        }
        TransferError::Account(e) => account_error_parts(e),
        TransferError::Store(e) => store_error_parts(e),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::Account(e) => account_error_parts(e),
            AppError::Transfer(e) => transfer_error_parts(e),
        };

        // Server-side failures keep their cause in the logs only
        let error = if status.is_server_error() {
            status
                .canonical_reason()
                .unwrap_or("Internal error")
                .to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
