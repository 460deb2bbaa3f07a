//! Account Service
//!
//! Fetch-or-fail lookups and the only sanctioned path to change a balance.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::amount::{is_storable_balance, MAX_SCALE};
use crate::domain::{Account, AccountProfile, NewAccount};
use crate::store::{LedgerStore, LedgerTx};

use super::AccountError;

/// Facade over the account half of the ledger store
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Create an account; the store assigns its id
    pub async fn create_account(&self, account: NewAccount) -> Result<Account, AccountError> {
        validate_new_account(&account)?;

        let account = self.store.insert_account(account).await?;
        tracing::info!(account_id = account.id, "Account created");
        Ok(account)
    }

    /// Get an account or fail with `AccountNotFound`. No side effects.
    pub async fn get_account_by_id(&self, id: i64) -> Result<Account, AccountError> {
        self.store
            .find_account(id)
            .await?
            .ok_or(AccountError::AccountNotFound(id))
    }

    /// Update name, contact details or PIN. Never touches the balance.
    pub async fn update_account_profile(
        &self,
        id: i64,
        profile: AccountProfile,
    ) -> Result<Account, AccountError> {
        validate_profile(&profile)?;

        if profile.is_empty() {
            return self.get_account_by_id(id).await;
        }

        self.store
            .update_account_profile(id, &profile)
            .await?
            .ok_or(AccountError::AccountNotFound(id))
    }

    /// Fetch and lock accounts inside `tx`, lowest id first.
    ///
    /// Missing ids are simply absent from the result; callers decide which
    /// one to report.
    pub async fn lock_accounts(
        &self,
        tx: &mut dyn LedgerTx,
        ids: &[i64],
    ) -> Result<Vec<Account>, AccountError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        Ok(tx.lock_accounts(&ids).await?)
    }

    /// Persist a new balance for `account` inside `tx` and return the stored row.
    ///
    /// No sign check here: legality is the transfer's job.
    pub async fn update_account_balance(
        &self,
        tx: &mut dyn LedgerTx,
        account: &Account,
        new_balance: Decimal,
    ) -> Result<Account, AccountError> {
        let updated = tx
            .update_balance(account.id, new_balance)
            .await?
            .ok_or(AccountError::AccountNotFound(account.id))?;

        tracing::debug!(
            account_id = updated.id,
            old_balance = %account.balance,
            new_balance = %updated.balance,
            "Balance updated"
        );

        Ok(updated)
    }
}

fn validate_new_account(account: &NewAccount) -> Result<(), AccountError> {
    require_name("first_name", &account.first_name)?;
    require_name("last_name", &account.last_name)?;
    require_email(&account.email)?;

    if account.balance < Decimal::ZERO {
        return Err(AccountError::InvalidAccount(
            "initial balance cannot be negative".to_string(),
        ));
    }

    if !is_storable_balance(account.balance) {
        return Err(AccountError::InvalidAccount(format!(
            "initial balance {} must be below 10^20 with at most {} decimal places",
            account.balance, MAX_SCALE
        )));
    }

    Ok(())
}

fn validate_profile(profile: &AccountProfile) -> Result<(), AccountError> {
    if let Some(ref first_name) = profile.first_name {
        require_name("first_name", first_name)?;
    }
    if let Some(ref last_name) = profile.last_name {
        require_name("last_name", last_name)?;
    }
    if let Some(ref email) = profile.email {
        require_email(email)?;
    }
    Ok(())
}

fn require_name(field: &str, value: &str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        return Err(AccountError::InvalidAccount(format!("{} is required", field)));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), AccountError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AccountError::InvalidAccount(format!(
            "invalid email '{}'",
            email
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use rust_decimal_macros::dec;

    fn service() -> (AccountService, Arc<MemoryLedgerStore>) {
        let store = Arc::new(MemoryLedgerStore::new());
        (AccountService::new(store.clone()), store)
    }

    fn jane() -> NewAccount {
        NewAccount::new("Jane", "Doe", "jane@example.com", "555-0100", 1234)
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let (service, _) = service();

        let created = service
            .create_account(jane().with_balance(dec!(100.0)))
            .await
            .unwrap();
        let fetched = service.get_account_by_id(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.first_name, "Jane");
        assert_eq!(fetched.last_name, "Doe");
        assert_eq!(fetched.balance, dec!(100.0));
    }

    #[tokio::test]
    async fn test_get_missing_account() {
        let (service, _) = service();
        let result = service.get_account_by_id(404).await;
        assert!(matches!(result, Err(AccountError::AccountNotFound(404))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_fields() {
        let (service, _) = service();

        let mut blank = jane();
        blank.first_name = "  ".to_string();
        assert!(matches!(
            service.create_account(blank).await,
            Err(AccountError::InvalidAccount(_))
        ));

        let mut bad_email = jane();
        bad_email.email = "jane.example.com".to_string();
        assert!(matches!(
            service.create_account(bad_email).await,
            Err(AccountError::InvalidAccount(_))
        ));

        let negative = jane().with_balance(dec!(-1));
        assert!(matches!(
            service.create_account(negative).await,
            Err(AccountError::InvalidAccount(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_unstorable_balance() {
        let (service, store) = service();

        for balance in [
            Decimal::MAX,
            dec!(100000000000000000000),
            dec!(0.123456789012),
        ] {
            let result = service.create_account(jane().with_balance(balance)).await;
            assert!(
                matches!(result, Err(AccountError::InvalidAccount(_))),
                "balance {} gave {:?}",
                balance,
                result
            );
        }
        assert_eq!(store.find_account(1).await.unwrap(), None);

        // Trailing zeros past the eighth place are not extra precision
        let created = service
            .create_account(jane().with_balance(dec!(0.12345678000)))
            .await
            .unwrap();
        assert_eq!(created.balance, dec!(0.12345678));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_balance() {
        let (service, _) = service();
        let created = service
            .create_account(jane().with_balance(dec!(75)))
            .await
            .unwrap();

        let updated = service
            .update_account_profile(
                created.id,
                AccountProfile {
                    phone_number: Some("555-0199".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone_number, "555-0199");
        assert_eq!(updated.balance, dec!(75));

        let missing = service
            .update_account_profile(99, AccountProfile::default())
            .await;
        assert!(matches!(missing, Err(AccountError::AccountNotFound(99))));
    }

    #[tokio::test]
    async fn test_update_balance_inside_transaction() {
        let (service, store) = service();
        let created = service.create_account(jane()).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let updated = service
            .update_account_balance(tx.as_mut(), &created, dec!(-5.5))
            .await
            .unwrap();
        assert_eq!(updated.balance, dec!(-5.5));
        tx.commit().await.unwrap();

        let reloaded = service.get_account_by_id(created.id).await.unwrap();
        assert_eq!(reloaded.balance, dec!(-5.5));
    }

    #[tokio::test]
    async fn test_update_balance_of_missing_account() {
        let (service, store) = service();
        let ghost = jane().into_account(77);

        let mut tx = store.begin().await.unwrap();
        let result = service
            .update_account_balance(tx.as_mut(), &ghost, dec!(1))
            .await;
        assert!(matches!(result, Err(AccountError::AccountNotFound(77))));
    }
}
