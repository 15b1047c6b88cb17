//! Endpoint serving the aggregated dashboard metrics.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState, Error,
    dashboard::{Metrics, aggregate},
};

use super::transactions::DateRangeParams;

/// Handles GET requests for the metrics over an optional date range.
///
/// The metrics are a pure function of the filtered transaction set; nothing
/// is cached or persisted.
pub async fn get_metrics(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Metrics>, Error> {
    let transactions = state.transaction_store().get_query(params.into_query())?;

    Ok(Json(aggregate(&transactions)))
}
