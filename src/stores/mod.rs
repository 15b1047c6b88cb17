//! Contains the trait and implementations for objects that store the domain
//! [models](crate::models).

mod json;
mod transaction;

pub mod sqlite;

pub use json::JsonFileTransactionStore;
pub use sqlite::SqliteTransactionStore;
pub use transaction::{TransactionQuery, TransactionStore};
