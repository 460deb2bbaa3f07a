//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::{Account, AccountProfile, NewAccount, OperationContext, Transfer, TransferRequest};
use crate::error::AppError;

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub pin: i32,
    /// Opening balance as a decimal string; zero when absent
    #[serde(default)]
    pub balance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub pin: Option<i32>,
}

/// Account as returned to clients (the PIN never leaves the service)
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub balance: Decimal,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone_number: account.phone_number,
            balance: account.balance,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferHistoryResponse {
    pub account_id: i64,
    pub transfers: Vec<Transfer>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/account/create", post(create_account))
        .route("/account/:account_id", get(get_account).put(update_account))
        .route("/account/:account_id/transfers", get(get_account_transfers))
        // Transfers
        .route("/transfers", post(create_transfer))
        .route(
            "/transfers/:transfer_id",
            get(get_transfer).delete(delete_transfer),
        )
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(value.trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid {}: {}", field, e)))
}

// =========================================================================
// POST /account/create
// =========================================================================

/// Create a new account
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let balance = match request.balance {
        Some(ref value) => parse_decimal("balance", value)?,
        None => Decimal::ZERO,
    };

    let account = NewAccount::new(
        request.first_name,
        request.last_name,
        request.email,
        request.phone_number,
        request.pin,
    )
    .with_balance(balance);

    let account = state.accounts.create_account(account).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

// =========================================================================
// GET /account/:account_id
// =========================================================================

/// Get account by ID
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.accounts.get_account_by_id(account_id).await?;
    Ok(Json(account.into()))
}

// =========================================================================
// PUT /account/:account_id
// =========================================================================

/// Update account profile (never the balance)
async fn update_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let profile = AccountProfile {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone_number: request.phone_number,
        pin: request.pin,
    };

    let account = state
        .accounts
        .update_account_profile(account_id, profile)
        .await?;

    Ok(Json(account.into()))
}

// =========================================================================
// GET /account/:account_id/transfers
// =========================================================================

/// Transfer history of an account
async fn get_account_transfers(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<TransferHistoryResponse>, AppError> {
    let transfers = state.transfers.transfers_for_account(account_id).await?;

    Ok(Json(TransferHistoryResponse {
        account_id,
        transfers,
    }))
}

// =========================================================================
// POST /transfers
// =========================================================================

/// Transfer money between two accounts
async fn create_transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<Transfer>), AppError> {
    let amount = parse_decimal("amount", &request.amount)?;

    tracing::debug!(
        correlation_id = %context.correlation_id,
        sender_id = request.sender_id,
        receiver_id = request.receiver_id,
        "Transfer requested"
    );

    let transfer = state
        .transfers
        .transfer_money(
            TransferRequest::new(request.sender_id, request.receiver_id, amount)
                .with_reason(request.reason),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(transfer)))
}

// =========================================================================
// GET /transfers/:transfer_id
// =========================================================================

/// Get transfer details
async fn get_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
) -> Result<Json<Transfer>, AppError> {
    let transfer = state.transfers.get_transfer_by_id(transfer_id).await?;
    Ok(Json(transfer))
}

// =========================================================================
// DELETE /transfers/:transfer_id
// =========================================================================

/// Delete a transfer record
async fn delete_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.transfers.delete_by_id(transfer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_account_request_deserialize() {
        let json = r#"{
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "phone_number": "555-0100",
            "pin": 1234
        }"#;

        let request: CreateAccountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.first_name, "Jane");
        assert_eq!(request.pin, 1234);
        assert!(request.balance.is_none());
    }

    #[test]
    fn test_transfer_request_deserialize() {
        let json = r#"{
            "sender_id": 1,
            "receiver_id": 2,
            "amount": "40.00"
        }"#;

        let request: CreateTransferRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.amount, "40.00");
        assert_eq!(request.reason, "");
    }

    #[test]
    fn test_account_response_has_no_pin() {
        let account = NewAccount::new("Jane", "Doe", "jane@example.com", "555-0100", 9876)
            .with_balance(dec!(12.5))
            .into_account(4);

        let json = serde_json::to_value(AccountResponse::from(account)).unwrap();
        assert!(json.get("pin").is_none());
        assert_eq!(json["id"], 4);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("amount", " 40.5 ").unwrap(), dec!(40.5));
        assert!(matches!(
            parse_decimal("amount", "forty"),
            Err(AppError::InvalidRequest(msg)) if msg.starts_with("Invalid amount")
        ));
    }
}
