//! Defines the transaction store trait.

use time::Date;

use crate::{
    Error,
    models::{NewTransaction, Transaction, TransactionPatch},
};

/// Handles the persistence of transactions.
///
/// Two implementations exist with deliberately different failure policies:
/// [JsonFileTransactionStore](crate::stores::JsonFileTransactionStore) never
/// fails a read (missing or corrupt data reads as an empty collection),
/// while [SqliteTransactionStore](crate::stores::SqliteTransactionStore)
/// surfaces storage errors to the caller.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    ///
    /// The store assigns the identity fields (`id`, `createdAt`) and keeps
    /// the collection ordered newest first.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Merge `patch` over the transaction with `id` and persist the result.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` is not in the store.
    fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<Transaction, Error>;

    /// Remove the transaction with `id` from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` is not in the store.
    fn delete(&mut self, id: &str) -> Result<(), Error>;

    /// Retrieve the transactions within `query`'s date range, newest first.
    ///
    /// There is no pagination: the full matching set is returned.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Get the total number of transactions in the store.
    fn count(&self) -> Result<usize, Error>;
}

/// Defines which transactions [TransactionStore::get_query] should return.
///
/// Both bounds are inclusive; a missing bound imposes no constraint on that
/// side.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionQuery {
    /// Include transactions dated on or after this date.
    pub from: Option<Date>,
    /// Include transactions dated on or before this date.
    pub to: Option<Date>,
}

impl TransactionQuery {
    /// Whether `transaction` falls within the date range.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(from) = self.from {
            if transaction.date() < from {
                return false;
            }
        }

        if let Some(to) = self.to {
            if transaction.date() > to {
                return false;
            }
        }

        true
    }
}
