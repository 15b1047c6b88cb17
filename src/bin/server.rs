//! The AdLedger API server.

use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use adledger::{
    AppState, build_router, graceful_shutdown,
    stores::{JsonFileTransactionStore, SqliteTransactionStore},
};

/// The JSON API server for AdLedger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON data file. Reads are best effort: a missing or
    /// corrupt file is served as an empty collection.
    #[arg(long, default_value = "data/transactions.json", conflicts_with = "db_path")]
    data_file: PathBuf,

    /// File path to a SQLite database to use instead of the JSON data file.
    /// Storage errors are surfaced to clients rather than swallowed.
    #[arg(long)]
    db_path: Option<String>,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let state = match args.db_path {
        Some(db_path) => {
            let connection =
                Connection::open(&db_path).expect("Could not open the SQLite database.");
            let store = SqliteTransactionStore::new(connection)
                .expect("Could not initialize the transactions table.");

            tracing::info!("Using the SQLite store at {db_path}");
            AppState::new(store)
        }
        None => {
            tracing::info!("Using the JSON file store at {}", args.data_file.display());
            AppState::new(JsonFileTransactionStore::new(args.data_file))
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // The handlers log their own errors, so the default 5xx logging is
        // disabled.
        .on_failure(());

    router.layer(tracing_layer)
}
