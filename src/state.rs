//! Implements a struct that holds the state of the HTTP server.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::stores::TransactionStore;

/// The state of the HTTP server: the transaction store chosen at startup.
///
/// Every store access goes through one lock, so mutations are serialized and
/// the file store's read-modify-write cycle cannot lose an update within the
/// process.
#[derive(Clone)]
pub struct AppState {
    transaction_store: Arc<Mutex<Box<dyn TransactionStore + Send>>>,
}

impl AppState {
    /// Create a new [AppState] for the store selected by configuration.
    pub fn new(transaction_store: impl TransactionStore + Send + 'static) -> Self {
        Self {
            transaction_store: Arc::new(Mutex::new(Box::new(transaction_store))),
        }
    }

    /// Lock and return the transaction store.
    pub(crate) fn transaction_store(&self) -> MutexGuard<'_, Box<dyn TransactionStore + Send>> {
        self.transaction_store.lock().unwrap()
    }
}
