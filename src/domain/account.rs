//! Account records
//!
//! An account is identified by a store-assigned id. Its balance only changes
//! inside a transfer transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Store-assigned id, immutable once assigned
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Numeric PIN. Kept out of every serialized view.
    pub pin: i32,
    /// Signed balance, may be fractional
    pub balance: Decimal,
}

/// Fields for a new account (the store assigns the id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub pin: i32,
    pub balance: Decimal,
}

impl NewAccount {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
        pin: i32,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            pin,
            balance: Decimal::ZERO,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// Build the stored record once the store has picked an id
    pub fn into_account(self, id: i64) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            pin: self.pin,
            balance: self.balance,
        }
    }
}

/// Profile changes. `None` leaves the field untouched; balance is not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub pin: Option<i32>,
}

impl AccountProfile {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.pin.is_none()
    }

    pub(crate) fn apply_to(&self, account: &mut Account) {
        if let Some(ref first_name) = self.first_name {
            account.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            account.last_name = last_name.clone();
        }
        if let Some(ref email) = self.email {
            account.email = email.clone();
        }
        if let Some(ref phone_number) = self.phone_number {
            account.phone_number = phone_number.clone();
        }
        if let Some(pin) = self.pin {
            account.pin = pin;
        }
    }
}

/// Account state captured on a transfer record (balance after the transfer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub balance: Decimal,
}

impl From<&Account> for AccountSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            balance: account.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_account_defaults_to_zero_balance() {
        let account = NewAccount::new("Jane", "Doe", "jane@example.com", "555-0100", 1234);
        assert_eq!(account.balance, Decimal::ZERO);

        let stored = account.with_balance(dec!(100.0)).into_account(7);
        assert_eq!(stored.id, 7);
        assert_eq!(stored.first_name, "Jane");
        assert_eq!(stored.balance, dec!(100.0));
    }

    #[test]
    fn test_profile_apply_only_touches_set_fields() {
        let mut account =
            NewAccount::new("Jane", "Doe", "jane@example.com", "555-0100", 1234).into_account(1);

        let profile = AccountProfile {
            email: Some("jane.doe@example.com".to_string()),
            pin: Some(4321),
            ..Default::default()
        };
        assert!(!profile.is_empty());
        profile.apply_to(&mut account);

        assert_eq!(account.first_name, "Jane");
        assert_eq!(account.email, "jane.doe@example.com");
        assert_eq!(account.pin, 4321);
        assert!(AccountProfile::default().is_empty());
    }

    #[test]
    fn test_snapshot_omits_pin() {
        let account = NewAccount::new("Jane", "Doe", "jane@example.com", "555-0100", 1234)
            .with_balance(dec!(60))
            .into_account(3);
        let snapshot = AccountSnapshot::from(&account);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("pin"));
        assert!(!json.contains("1234"));
        assert_eq!(snapshot.balance, dec!(60));
    }
}
