//! Domain module
//!
//! Core domain types: accounts, transfers and the amounts moved between them.

pub mod account;
pub mod amount;
pub mod context;
pub mod transfer;

pub use account::{Account, AccountProfile, AccountSnapshot, NewAccount};
pub use amount::{Amount, AmountError};
pub use context::{OperationContext, CORRELATION_ID_HEADER};
pub use transfer::{NewTransfer, Transfer, TransferRequest, TransferStatus};
