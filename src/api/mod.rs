//! API module
//!
//! HTTP API endpoints, shared state and middleware.

pub mod middleware;
pub mod routes;

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::services::{AccountService, TransferService};
use crate::store::LedgerStore;

pub use routes::create_router;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub transfers: TransferService,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, transfer_timeout: Duration) -> Self {
        let accounts = AccountService::new(store.clone());
        let transfers =
            TransferService::new(accounts.clone(), store).with_timeout(transfer_timeout);
        Self {
            accounts,
            transfers,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Axum layers run in reverse order: context -> logging -> handler
    let api_routes = create_router()
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
