//! Application router configuration.

use axum::{
    Router,
    routing::{get, patch},
};

use crate::{
    AppState, endpoints,
    routes::{
        create_transaction, delete_transaction, get_metrics, get_transactions, update_transaction,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions).post(create_transaction),
        )
        .route(
            endpoints::TRANSACTION,
            patch(update_transaction).delete(delete_transaction),
        )
        .route(endpoints::METRICS, get(get_metrics))
        .with_state(state)
}
