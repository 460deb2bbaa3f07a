//! Services module
//!
//! Business operations over the ledger store: account lookups and balance
//! mutation, and the transfer orchestration built on top of them.

mod account_service;
mod error;
mod transfer_service;

pub use account_service::AccountService;
pub use error::{AccountError, TransferError};
pub use transfer_service::{validate_transfer, TransferService, DEFAULT_TRANSFER_TIMEOUT};
