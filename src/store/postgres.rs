//! PostgreSQL ledger store
//!
//! Transfers lock account rows with `SELECT ... FOR UPDATE` ordered by id,
//! so two transfers crossing the same pair of accounts in opposite
//! directions queue instead of deadlocking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    Account, AccountProfile, AccountSnapshot, NewAccount, NewTransfer, Transfer, TransferStatus,
};

use super::{LedgerStore, LedgerTx, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    pin: i32,
    balance: Decimal,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            pin: row.pin,
            balance: row.balance,
        }
    }
}

/// Transfer row joined with both accounts' identity columns
#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: i64,
    amount: Decimal,
    reason: String,
    status: String,
    date: DateTime<Utc>,
    sender_id: i64,
    sender_first_name: String,
    sender_last_name: String,
    sender_email: String,
    sender_balance: Decimal,
    receiver_id: i64,
    receiver_first_name: String,
    receiver_last_name: String,
    receiver_email: String,
    receiver_balance: Decimal,
}

impl TryFrom<TransferRow> for Transfer {
    type Error = StoreError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        let status: TransferStatus = row.status.parse().map_err(StoreError::Corrupt)?;

        Ok(Transfer {
            id: row.id,
            sender: AccountSnapshot {
                id: row.sender_id,
                first_name: row.sender_first_name,
                last_name: row.sender_last_name,
                email: row.sender_email,
                balance: row.sender_balance,
            },
            receiver: AccountSnapshot {
                id: row.receiver_id,
                first_name: row.receiver_first_name,
                last_name: row.receiver_last_name,
                email: row.receiver_email,
                balance: row.receiver_balance,
            },
            amount: row.amount,
            reason: row.reason,
            date: row.date,
            status,
        })
    }
}

/// Ledger store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a new PgLedgerStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO accounts (first_name, last_name, email, phone_number, pin, balance)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, phone_number, pin, balance
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.phone_number)
        .bind(account.pin)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(account_id = row.id, "Account inserted");

        Ok(row.into())
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, phone_number, pin, balance
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn update_account_profile(
        &self,
        id: i64,
        profile: &AccountProfile,
    ) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone_number = COALESCE($5, phone_number),
                pin = COALESCE($6, pin),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone_number, pin, balance
            "#,
        )
        .bind(id)
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.email.as_deref())
        .bind(profile.phone_number.as_deref())
        .bind(profile.pin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn find_transfer(&self, id: i64) -> Result<Option<Transfer>, StoreError> {
        let row: Option<TransferRow> = sqlx::query_as(
            r#"
            SELECT
                t.id, t.amount, t.reason, t.status, t.date,
                s.id AS sender_id,
                s.first_name AS sender_first_name,
                s.last_name AS sender_last_name,
                s.email AS sender_email,
                t.sender_balance,
                r.id AS receiver_id,
                r.first_name AS receiver_first_name,
                r.last_name AS receiver_last_name,
                r.email AS receiver_email,
                t.receiver_balance
            FROM transfers t
            JOIN accounts s ON s.id = t.sender_id
            JOIN accounts r ON r.id = t.receiver_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transfer::try_from).transpose()
    }

    async fn delete_transfer(&self, id: i64) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM transfers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn transfers_for_account(&self, account_id: i64) -> Result<Vec<Transfer>, StoreError> {
        let rows: Vec<TransferRow> = sqlx::query_as(
            r#"
            SELECT
                t.id, t.amount, t.reason, t.status, t.date,
                s.id AS sender_id,
                s.first_name AS sender_first_name,
                s.last_name AS sender_last_name,
                s.email AS sender_email,
                t.sender_balance,
                r.id AS receiver_id,
                r.first_name AS receiver_first_name,
                r.last_name AS receiver_last_name,
                r.email AS receiver_email,
                t.receiver_balance
            FROM transfers t
            JOIN accounts s ON s.id = t.sender_id
            JOIN accounts r ON r.id = t.receiver_id
            WHERE t.sender_id = $1 OR t.receiver_id = $1
            ORDER BY t.date DESC, t.id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transfer::try_from).collect()
    }
}

/// One PostgreSQL transaction. Dropped without commit, sqlx rolls it back.
struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn lock_accounts(&mut self, ids: &[i64]) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, phone_number, pin, balance
            FROM accounts
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn update_balance(
        &mut self,
        id: i64,
        balance: Decimal,
    ) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET balance = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone_number, pin, balance
            "#,
        )
        .bind(id)
        .bind(balance)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn insert_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transfers
                (sender_id, receiver_id, amount, reason, sender_balance, receiver_balance, status, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(transfer.sender.id)
        .bind(transfer.receiver.id)
        .bind(transfer.amount)
        .bind(&transfer.reason)
        .bind(transfer.sender.balance)
        .bind(transfer.receiver.balance)
        .bind(transfer.status.as_str())
        .bind(transfer.date)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(transfer.into_transfer(id))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
