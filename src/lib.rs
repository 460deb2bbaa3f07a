//! money-transfer Library
//!
//! Account ledger with atomic peer-to-peer transfers.
//! Re-exports modules for the server binary and integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod services;
pub mod store;

mod error;

pub use config::Config;
pub use error::{AppError, ErrorResponse};
pub use domain::{Account, Amount, AmountError, OperationContext, Transfer, TransferStatus};
pub use services::{AccountError, AccountService, TransferError, TransferService};
pub use store::{LedgerStore, MemoryLedgerStore, PgLedgerStore, StoreError};
