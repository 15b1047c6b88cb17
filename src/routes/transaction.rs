//! Endpoints for updating and deleting a single transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    AppState, Error,
    models::{Transaction, TransactionPatch},
};

/// The body returned after a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always true; failures are reported through the error taxonomy instead.
    pub success: bool,
    /// The ID of the deleted transaction.
    pub id: String,
}

/// Handles PATCH requests that merge partial fields over a transaction.
///
/// Responds with 200 and the merged record, 400 if a provided field does not
/// validate, or 404 if the ID is unknown.
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Transaction>, Error> {
    let patch = TransactionPatch::parse(&payload)?;
    let transaction = state.transaction_store().update(&transaction_id, patch)?;

    Ok(Json(transaction))
}

/// Handles DELETE requests for a transaction by ID.
///
/// Responds with 200 and `{"success": true, "id": …}`, or 404 if the ID is
/// unknown.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<DeleteResponse>, Error> {
    state.transaction_store().delete(&transaction_id)?;

    Ok(Json(DeleteResponse {
        success: true,
        id: transaction_id,
    }))
}
