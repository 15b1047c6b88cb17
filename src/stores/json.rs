//! Implements a transaction store backed by a flat JSON file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{
    Error,
    models::{NewTransaction, Transaction, TransactionPatch, sort_newest_first},
    stores::{TransactionQuery, TransactionStore},
};

/// Stores transactions as a pretty-printed JSON array in a single file.
///
/// Reads are best effort and never fail: a missing or unparseable file reads
/// as an empty collection, and records that do not match the transaction
/// shape are dropped with a logged warning. Writes rewrite the whole file
/// through a temporary file and a rename, so an interrupted write cannot
/// truncate the data.
///
/// This is the fail-soft counterpart to
/// [SqliteTransactionStore](crate::stores::SqliteTransactionStore).
#[derive(Debug, Clone)]
pub struct JsonFileTransactionStore {
    path: PathBuf,
}

impl JsonFileTransactionStore {
    /// Create a store that persists to the JSON file at `path`.
    ///
    /// The file and its parent directories are created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every valid transaction from the data file, in stored order.
    ///
    /// Entries that fail validation are dropped so the collection keeps
    /// serving whatever part of it still conforms; the drop count is logged
    /// as a warning.
    fn read_all(&self) -> Vec<Transaction> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };

        let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(&raw) else {
            tracing::warn!(
                "{} does not contain a JSON array, reading it as empty",
                self.path.display()
            );
            return Vec::new();
        };

        let total = entries.len();
        let transactions: Vec<Transaction> = entries
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value::<Transaction>(entry)
                    .ok()
                    .filter(Transaction::is_valid_record)
            })
            .collect();

        let dropped = total - transactions.len();
        if dropped > 0 {
            tracing::warn!(
                "dropped {dropped} invalid record(s) while reading {}",
                self.path.display()
            );
        }

        transactions
    }

    /// Replace the data file contents with `transactions`.
    fn write_all(&self, transactions: &[Transaction]) -> Result<(), Error> {
        self.try_write_all(transactions)
            .map_err(|error| Error::DataFile(error.to_string()))
    }

    fn try_write_all(&self, transactions: &[Transaction]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|path| !path.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(transactions)?;
        let temp_path = temp_path_for(&self.path);
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}

impl TransactionStore for JsonFileTransactionStore {
    /// Create a new transaction in the data file.
    ///
    /// The whole collection is re-sorted newest first before it is written
    /// back; [JsonFileTransactionStore::get_query] returns transactions in
    /// stored order and relies on this.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let transaction = new_transaction.into_transaction();

        let mut transactions = self.read_all();
        transactions.push(transaction.clone());
        sort_newest_first(&mut transactions);
        self.write_all(&transactions)?;

        Ok(transaction)
    }

    fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<Transaction, Error> {
        let mut transactions = self.read_all();
        let transaction = transactions
            .iter_mut()
            .find(|transaction| transaction.id() == id)
            .ok_or(Error::NotFound)?;

        transaction.apply(patch);
        let updated = transaction.clone();
        self.write_all(&transactions)?;

        Ok(updated)
    }

    fn delete(&mut self, id: &str) -> Result<(), Error> {
        let mut transactions = self.read_all();
        let count_before = transactions.len();
        transactions.retain(|transaction| transaction.id() != id);

        if transactions.len() == count_before {
            return Err(Error::NotFound);
        }

        self.write_all(&transactions)
    }

    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error> {
        Ok(self
            .read_all()
            .into_iter()
            .filter(|transaction| query.matches(transaction))
            .collect())
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(self.read_all().len())
    }
}
