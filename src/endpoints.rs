//! The API endpoint URIs.

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to fetch the aggregated metrics for a date range.
pub const METRICS: &str = "/api/metrics";
