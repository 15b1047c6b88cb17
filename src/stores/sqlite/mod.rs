//! Contains the SQLite backed transaction store.

pub mod transaction;

pub use transaction::SqliteTransactionStore;
