//! Transfer Service
//!
//! The only authority for moving money between two accounts.
//!
//! A transfer runs as one store transaction:
//! 1. lock both accounts (lowest id first)
//! 2. check distinctness, then amount, then sufficiency
//! 3. write both balances
//! 4. insert the transfer record
//! 5. commit
//!
//! The whole sequence is bounded by a timeout. Any failure before commit
//! drops the transaction, so either everything is applied or nothing is.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Account, Amount, NewTransfer, Transfer, TransferRequest};
use crate::store::LedgerStore;

use super::{AccountError, AccountService, TransferError};

/// Default bound for one transfer transaction
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates transfers, lookups and deletions of transfer records
#[derive(Clone)]
pub struct TransferService {
    accounts: AccountService,
    store: Arc<dyn LedgerStore>,
    timeout: Duration,
}

impl TransferService {
    pub fn new(accounts: AccountService, store: Arc<dyn LedgerStore>) -> Self {
        Self {
            accounts,
            store,
            timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get a transfer or fail with `InvalidTransferId`
    pub async fn get_transfer_by_id(&self, id: i64) -> Result<Transfer, TransferError> {
        self.store
            .find_transfer(id)
            .await?
            .ok_or(TransferError::InvalidTransferId(id))
    }

    /// Move `amount` from sender to receiver and record the transfer.
    ///
    /// Errors, in precedence order:
    /// - `Account(AccountNotFound)` for the sender, then the receiver
    /// - `SameAccountTransfer`
    /// - `InvalidAmount`
    /// - `InsufficientBalance` (a balance equal to the amount is enough)
    /// - `BalanceOverflow` when the receiver cannot hold the credit
    /// - `Timeout` when the transaction does not finish in time
    pub async fn transfer_money(&self, request: TransferRequest) -> Result<Transfer, TransferError> {
        let result = match tokio::time::timeout(self.timeout, self.execute_transfer(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(TransferError::Timeout(self.timeout)),
        };

        match &result {
            Ok(transfer) => tracing::info!(
                transfer_id = transfer.id,
                sender_id = request.sender_id,
                receiver_id = request.receiver_id,
                amount = %transfer.amount,
                "Transfer completed"
            ),
            Err(e) if e.is_client_error() => tracing::info!(
                sender_id = request.sender_id,
                receiver_id = request.receiver_id,
                amount = %request.amount,
                error = %e,
                "Transfer rejected"
            ),
            Err(e) => tracing::error!(
                sender_id = request.sender_id,
                receiver_id = request.receiver_id,
                amount = %request.amount,
                error = %e,
                "Transfer failed"
            ),
        }

        result
    }

    async fn execute_transfer(&self, request: &TransferRequest) -> Result<Transfer, TransferError> {
        let mut tx = self.store.begin().await?;

        let locked = self
            .accounts
            .lock_accounts(tx.as_mut(), &[request.sender_id, request.receiver_id])
            .await?;
        let sender = find_locked(&locked, request.sender_id)?;
        let receiver = find_locked(&locked, request.receiver_id)?;

        let amount = validate_transfer(sender, receiver, request.amount)?;

        let sender_balance = amount
            .debit(sender.balance)
            .ok_or(TransferError::BalanceOverflow(sender.id))?;
        let receiver_balance = amount
            .credit(receiver.balance)
            .ok_or(TransferError::BalanceOverflow(receiver.id))?;

        let updated_sender = self
            .accounts
            .update_account_balance(tx.as_mut(), sender, sender_balance)
            .await?;
        let updated_receiver = self
            .accounts
            .update_account_balance(tx.as_mut(), receiver, receiver_balance)
            .await?;

        let transfer = tx
            .insert_transfer(NewTransfer::successful(
                &updated_sender,
                &updated_receiver,
                amount.value(),
                request.reason.clone(),
            ))
            .await?;

        tx.commit().await?;

        Ok(transfer)
    }

    /// Delete a transfer record.
    ///
    /// `InvalidTransferId` when no record matched, `Store` when the
    /// database failed. Nothing is swallowed.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), TransferError> {
        match self.store.delete_transfer(id).await {
            Ok(true) => {
                tracing::info!(transfer_id = id, "Transfer deleted");
                Ok(())
            }
            Ok(false) => Err(TransferError::InvalidTransferId(id)),
            Err(e) => {
                tracing::error!(transfer_id = id, error = %e, "Transfer deletion failed");
                Err(e.into())
            }
        }
    }

    /// Transfers an account sent or received, newest first
    pub async fn transfers_for_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<Transfer>, TransferError> {
        self.accounts.get_account_by_id(account_id).await?;
        Ok(self.store.transfers_for_account(account_id).await?)
    }
}

fn find_locked(locked: &[Account], id: i64) -> Result<&Account, AccountError> {
    locked
        .iter()
        .find(|account| account.id == id)
        .ok_or(AccountError::AccountNotFound(id))
}

/// Check transfer legality before any balance moves.
///
/// Ids are compared by value: the two lookups may return separate copies of
/// the same row.
pub fn validate_transfer(
    sender: &Account,
    receiver: &Account,
    amount: Decimal,
) -> Result<Amount, TransferError> {
    if sender.id == receiver.id {
        return Err(TransferError::SameAccountTransfer);
    }

    let amount = Amount::new(amount)?;

    if !amount.is_covered_by(sender.balance) {
        return Err(TransferError::insufficient_balance(
            amount.value(),
            sender.balance,
        ));
    }

    Ok(amount)
}
