//! Ledger store
//!
//! Persistence for accounts and transfers behind one abstraction:
//! - `LedgerStore` for single-statement reads and writes
//! - `LedgerTx` for the multi-row unit of work a transfer needs
//!
//! Dropping a `LedgerTx` without calling `commit` discards everything it did.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Account, AccountProfile, NewAccount, NewTransfer, Transfer};

/// Storage for accounts and transfers
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Start an atomic unit of work
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;

    /// Insert an account and return it with its assigned id
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Get an account by id
    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Apply profile changes; `None` when the account does not exist
    async fn update_account_profile(
        &self,
        id: i64,
        profile: &AccountProfile,
    ) -> Result<Option<Account>, StoreError>;

    /// Get a transfer by id
    async fn find_transfer(&self, id: i64) -> Result<Option<Transfer>, StoreError>;

    /// Delete a transfer; `false` when nothing matched
    async fn delete_transfer(&self, id: i64) -> Result<bool, StoreError>;

    /// Transfers sent or received by an account, newest first
    async fn transfers_for_account(&self, account_id: i64) -> Result<Vec<Transfer>, StoreError>;
}

/// Atomic unit of work over the ledger
#[async_trait]
pub trait LedgerTx: Send {
    /// Fetch and lock accounts for the rest of the transaction.
    ///
    /// Rows are locked in ascending id order. Ids with no row are absent
    /// from the result.
    async fn lock_accounts(&mut self, ids: &[i64]) -> Result<Vec<Account>, StoreError>;

    /// Overwrite a balance; `None` when the account does not exist
    async fn update_balance(
        &mut self,
        id: i64,
        balance: Decimal,
    ) -> Result<Option<Account>, StoreError>;

    /// Insert a transfer record and return it with its assigned id
    async fn insert_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, StoreError>;

    /// Make every change of this unit of work visible
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
