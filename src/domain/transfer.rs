//! Transfer records
//!
//! A transfer is written once, after both balances have moved, and never
//! changes afterwards (it may only be deleted).

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::{Account, AccountSnapshot};

/// Outcome recorded on a transfer.
///
/// Only completed transfers are stored, so there is no pending or failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Successful,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Successful => "SUCCESSFUL",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESSFUL" => Ok(TransferStatus::Successful),
            other => Err(format!("unknown transfer status '{}'", other)),
        }
    }
}

/// A stored transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub sender: AccountSnapshot,
    pub receiver: AccountSnapshot,
    pub amount: Decimal,
    pub reason: String,
    pub date: DateTime<Utc>,
    pub status: TransferStatus,
}

impl Transfer {
    /// Whether `account_id` took part in this transfer
    pub fn involves(&self, account_id: i64) -> bool {
        self.sender.id == account_id || self.receiver.id == account_id
    }
}

/// A transfer ready to be inserted (the store assigns the id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransfer {
    pub sender: AccountSnapshot,
    pub receiver: AccountSnapshot,
    pub amount: Decimal,
    pub reason: String,
    pub date: DateTime<Utc>,
    pub status: TransferStatus,
}

impl NewTransfer {
    /// Record a completed transfer from the post-transfer account states.
    ///
    /// The timestamp is truncated to microseconds, the precision of TIMESTAMPTZ.
    pub fn successful(sender: &Account, receiver: &Account, amount: Decimal, reason: String) -> Self {
        Self {
            sender: AccountSnapshot::from(sender),
            receiver: AccountSnapshot::from(receiver),
            amount,
            reason,
            date: Utc::now().trunc_subsecs(6),
            status: TransferStatus::Successful,
        }
    }

    pub fn into_transfer(self, id: i64) -> Transfer {
        Transfer {
            id,
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
            reason: self.reason,
            date: self.date,
            status: self.status,
        }
    }
}

/// Input to a money transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: Decimal,
    pub reason: String,
}

impl TransferRequest {
    pub fn new(sender_id: i64, receiver_id: i64, amount: Decimal) -> Self {
        Self {
            sender_id,
            receiver_id,
            amount,
            reason: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}
