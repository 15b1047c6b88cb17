//! AdLedger is a JSON HTTP service for tracking advertising spend, expenses,
//! and revenue, and for serving the aggregate metrics (profit, ROI, ROAS,
//! margin, daily series) a dashboard renders over a selectable date range.
//!
//! Persistence goes through one of two interchangeable stores chosen at
//! startup: a flat JSON file whose reads are best effort and never fail, or
//! a SQLite table that surfaces storage errors. See
//! [stores::TransactionStore] for the contract and the trade-off.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod dashboard;
mod error;
mod routes;
mod routing;
mod state;

pub mod endpoints;
pub mod models;
pub mod stores;

pub use dashboard::{DailyBucket, Metrics, TypeSlice, aggregate};
pub use error::Error;
pub use routing::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
