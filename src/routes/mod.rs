//! The HTTP route handlers for the JSON API.

mod metrics;
mod transaction;
mod transactions;

pub use metrics::get_metrics;
pub use transaction::{delete_transaction, update_transaction};
pub use transactions::{create_transaction, get_transactions};
