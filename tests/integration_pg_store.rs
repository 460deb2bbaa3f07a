//! PostgreSQL Store Integration Tests
//!
//! Require DATABASE_URL and share one database, so run them serially:
//! cargo test --test integration_pg_store -- --ignored --test-threads=1

use std::sync::Arc;
use std::time::Duration;

use money_transfer::domain::{NewAccount, TransferRequest};
use money_transfer::store::LedgerStore;
use money_transfer::{AccountService, PgLedgerStore, TransferError, TransferService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod common;

use common::setup_test_db;

async fn services() -> (Arc<PgLedgerStore>, AccountService, TransferService) {
    let pool = setup_test_db().await;
    let store = Arc::new(PgLedgerStore::new(pool));
    let accounts = AccountService::new(store.clone());
    let transfers = TransferService::new(accounts.clone(), store.clone())
        .with_timeout(Duration::from_secs(5));
    (store, accounts, transfers)
}

fn new_account(name: &str, balance: Decimal) -> NewAccount {
    NewAccount::new(name, "Doe", format!("{}@example.com", name), "555-0100", 1234)
        .with_balance(balance)
}

#[tokio::test]
#[ignore]
async fn test_pg_transfer_round_trip() {
    let (_store, accounts, transfers) = services().await;

    let alice = accounts.create_account(new_account("alice", dec!(100))).await.unwrap();
    let bob = accounts.create_account(new_account("bob", dec!(10))).await.unwrap();

    // Creation reports the stored row
    let stored = accounts.get_account_by_id(alice.id).await.unwrap();
    assert_eq!(stored, alice);
    assert_eq!(stored.balance.to_string(), alice.balance.to_string());

    let transfer = transfers
        .transfer_money(TransferRequest::new(alice.id, bob.id, dec!(40)).with_reason("rent"))
        .await
        .unwrap();

    assert_eq!(transfer.sender.balance, dec!(60));
    assert_eq!(transfer.receiver.balance, dec!(50));
    assert_eq!(accounts.get_account_by_id(alice.id).await.unwrap().balance, dec!(60));
    assert_eq!(accounts.get_account_by_id(bob.id).await.unwrap().balance, dec!(50));

    let fetched = transfers.get_transfer_by_id(transfer.id).await.unwrap();
    assert_eq!(fetched, transfer);

    let history = transfers.transfers_for_account(bob.id).await.unwrap();
    assert_eq!(history.len(), 1);

    transfers.delete_by_id(transfer.id).await.unwrap();
    assert!(matches!(
        transfers.delete_by_id(transfer.id).await,
        Err(TransferError::InvalidTransferId(id)) if id == transfer.id
    ));
}

#[tokio::test]
#[ignore]
async fn test_pg_rejected_transfer_changes_nothing() {
    let (store, accounts, transfers) = services().await;

    let alice = accounts.create_account(new_account("alice", dec!(20))).await.unwrap();
    let bob = accounts.create_account(new_account("bob", dec!(5))).await.unwrap();

    let result = transfers
        .transfer_money(TransferRequest::new(alice.id, bob.id, dec!(50)))
        .await;
    assert!(matches!(result, Err(TransferError::InsufficientBalance { .. })));

    assert_eq!(accounts.get_account_by_id(alice.id).await.unwrap().balance, dec!(20));
    assert_eq!(accounts.get_account_by_id(bob.id).await.unwrap().balance, dec!(5));
    assert!(store.transfers_for_account(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_pg_concurrent_transfers_conserve_money() {
    let (_store, accounts, transfers) = services().await;

    let a = accounts.create_account(new_account("a", dec!(1000))).await.unwrap();
    let b = accounts.create_account(new_account("b", dec!(1000))).await.unwrap();

    // Opposite directions at once: ordered locking keeps this deadlock-free
    let mut handles = Vec::new();
    for i in 0..40 {
        let transfers = transfers.clone();
        let (from, to) = if i % 2 == 0 { (a.id, b.id) } else { (b.id, a.id) };
        handles.push(tokio::spawn(async move {
            transfers
                .transfer_money(TransferRequest::new(from, to, dec!(7.5)))
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let total = accounts.get_account_by_id(a.id).await.unwrap().balance
        + accounts.get_account_by_id(b.id).await.unwrap().balance;
    assert_eq!(total, dec!(2000));
    assert_eq!(transfers.transfers_for_account(a.id).await.unwrap().len(), 40);
}
