//! In-memory ledger store
//!
//! One mutex guards the whole ledger. A transaction holds the lock for its
//! lifetime and stages only what it writes (touched accounts and new
//! transfers), applied to the live state on commit. Transactions are
//! serializable and a dropped one leaves no trace.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{Account, AccountProfile, NewAccount, NewTransfer, Transfer};

use super::{LedgerStore, LedgerTx, StoreError};

#[derive(Debug, Default)]
struct LedgerState {
    accounts: BTreeMap<i64, Account>,
    transfers: BTreeMap<i64, Transfer>,
    last_account_id: i64,
    last_transfer_id: i64,
}

impl LedgerState {
    /// Refresh identity fields from the live account rows, keeping the
    /// recorded balances (the same view the SQL join produces).
    fn hydrate(&self, transfer: &Transfer) -> Transfer {
        let mut transfer = transfer.clone();
        for snapshot in [&mut transfer.sender, &mut transfer.receiver] {
            if let Some(account) = self.accounts.get(&snapshot.id) {
                snapshot.first_name = account.first_name.clone();
                snapshot.last_name = account.last_name.clone();
                snapshot.email = account.email.clone();
            }
        }
        transfer
    }
}

/// Ledger store kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn begin_tx(&self) -> MemoryLedgerTx {
        MemoryLedgerTx {
            guard: self.state.clone().lock_owned().await,
            accounts: BTreeMap::new(),
            transfers: Vec::new(),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        Ok(Box::new(self.begin_tx().await))
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        state.last_account_id += 1;
        let account = account.into_account(state.last_account_id);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn update_account_profile(
        &self,
        id: i64,
        profile: &AccountProfile,
    ) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.accounts.get_mut(&id).map(|account| {
            profile.apply_to(account);
            account.clone()
        }))
    }

    async fn find_transfer(&self, id: i64) -> Result<Option<Transfer>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.transfers.get(&id).map(|t| state.hydrate(t)))
    }

    async fn delete_transfer(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.transfers.remove(&id).is_some())
    }

    async fn transfers_for_account(&self, account_id: i64) -> Result<Vec<Transfer>, StoreError> {
        let state = self.state.lock().await;
        let mut transfers: Vec<Transfer> = state
            .transfers
            .values()
            .filter(|t| t.involves(account_id))
            .map(|t| state.hydrate(t))
            .collect();
        transfers.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(transfers)
    }
}

struct MemoryLedgerTx {
    guard: OwnedMutexGuard<LedgerState>,
    /// Accounts written by this transaction, by id
    accounts: BTreeMap<i64, Account>,
    /// Transfers inserted by this transaction, in insertion order
    transfers: Vec<Transfer>,
}

impl MemoryLedgerTx {
    fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.get(&id).or_else(|| self.guard.accounts.get(&id))
    }
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn lock_accounts(&mut self, ids: &[i64]) -> Result<Vec<Account>, StoreError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids
            .iter()
            .filter_map(|id| self.account(*id).cloned())
            .collect())
    }

    async fn update_balance(
        &mut self,
        id: i64,
        balance: Decimal,
    ) -> Result<Option<Account>, StoreError> {
        let Some(mut account) = self.account(id).cloned() else {
            return Ok(None);
        };
        account.balance = balance;
        self.accounts.insert(id, account.clone());
        Ok(Some(account))
    }

    async fn insert_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, StoreError> {
        let id = self.guard.last_transfer_id + self.transfers.len() as i64 + 1;
        let transfer = transfer.into_transfer(id);
        self.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryLedgerTx {
            mut guard,
            accounts,
            transfers,
        } = *self;

        guard.accounts.extend(accounts);
        for transfer in transfers {
            guard.last_transfer_id = transfer.id;
            guard.transfers.insert(transfer.id, transfer);
        }
        Ok(())
    }
}
