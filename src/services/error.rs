//! Service Error Types
//!
//! Two families: account lookups and transfer legality. Both carry a fixed
//! reason kind; the HTTP layer maps kinds to status codes.

use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

use crate::domain::AmountError;
use crate::store::StoreError;

/// Account failures
#[derive(Debug, Error)]
pub enum AccountError {
    /// Lookup by id found nothing
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    /// Account fields rejected before reaching the store
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Transfer failures
#[derive(Debug, Error)]
pub enum TransferError {
    /// Lookup by id found nothing
    #[error("Transfer not found: {0}")]
    InvalidTransferId(i64),

    /// Sender and receiver are the same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// Sender balance is below the requested amount
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    /// The account's balance would leave the storable range
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(i64),

    /// Zero, negative, over-precise or oversized amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The transfer did not finish within its time bound and was rolled back
    #[error("Transfer timed out after {0:?}")]
    Timeout(Duration),

    /// Sender or receiver lookup failed
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::InvalidAccount(_)
        )
    }
}

impl TransferError {
    /// Create an insufficient balance error
    pub fn insufficient_balance(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidTransferId(_)
            | Self::SameAccountTransfer
            | Self::InsufficientBalance { .. }
            | Self::BalanceOverflow(_)
            | Self::InvalidAmount(_) => true,
            Self::Account(e) => e.is_client_error(),
            Self::Timeout(_) | Self::Store(_) => false,
        }
    }
}
