//! Endpoints for listing and creating transactions.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState, Error,
    models::{NewTransaction, Transaction, parse_iso_date},
    stores::TransactionQuery,
};

/// The date range accepted by the list and metrics endpoints.
///
/// The bounds arrive as raw strings: a value that is not a valid
/// `YYYY-MM-DD` date simply imposes no constraint on that side.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    from: Option<String>,
    to: Option<String>,
}

impl DateRangeParams {
    pub(super) fn into_query(self) -> TransactionQuery {
        TransactionQuery {
            from: self
                .from
                .as_deref()
                .and_then(|text| parse_iso_date(text).ok()),
            to: self.to.as_deref().and_then(|text| parse_iso_date(text).ok()),
        }
    }
}

/// Handles GET requests for the transactions in an optional date range,
/// newest first.
pub async fn get_transactions(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = state.transaction_store().get_query(params.into_query())?;

    Ok(Json(transactions))
}

/// Handles POST requests to create a transaction.
///
/// Responds with 201 and the created record, or 400 with a per-field report
/// if the payload does not validate.
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = NewTransaction::parse(&payload)?;
    let transaction = state.transaction_store().create(new_transaction)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}


#[cfg(test)]
mod transactions_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::endpoints;

    use super::test_utils::get_test_server;

    #[tokio::test]
    async fn create_returns_created_record_with_assigned_identity() {
        let (server, _temp_dir) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "date": "2024-01-01",
                "type": "revenue",
                "amount": 59.9,
                "category": "store",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["date"], json!("2024-01-01"));
        assert_eq!(body["type"], json!("revenue"));
        assert_eq!(body["amount"], json!(59.9));
        assert_eq!(body["category"], json!("store"));
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(body["createdAt"].is_string());
    }

    #[tokio::test]
    async fn create_with_missing_fields_returns_field_errors() {
        let (server, _temp_dir) = get_test_server();

        let response = server.post(endpoints::TRANSACTIONS).json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        let field_errors = &body["error"]["fieldErrors"];
        assert!(field_errors["date"].is_array());
        assert!(field_errors["type"].is_array());
        assert!(field_errors["amount"].is_array());
    }

    #[tokio::test]
    async fn create_with_negative_amount_is_rejected() {
        let (server, _temp_dir) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "date": "2024-01-01",
                "type": "ads",
                "amount": -100,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(
            body["error"]["fieldErrors"]["amount"],
            json!(["must not be negative"])
        );
    }

    #[tokio::test]
    async fn create_with_unknown_type_is_rejected() {
        let (server, _temp_dir) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "date": "2024-01-01",
                "type": "refund",
                "amount": 100,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert!(body["error"]["fieldErrors"]["type"].is_array());
    }

    #[tokio::test]
    async fn get_filters_inclusively_and_orders_newest_first() {
        let (server, _temp_dir) = get_test_server();

        for date in ["2023-12-31", "2024-01-01", "2024-01-02", "2024-01-03"] {
            server
                .post(endpoints::TRANSACTIONS)
                .json(&json!({"date": date, "type": "revenue", "amount": 1}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("from", "2024-01-01")
            .add_query_param("to", "2024-01-02")
            .await;

        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        let dates: Vec<&str> = body
            .iter()
            .map(|transaction| transaction["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-01"]);
    }

    #[tokio::test]
    async fn get_with_malformed_bounds_imposes_no_constraint() {
        let (server, _temp_dir) = get_test_server();

        for date in ["2024-01-01", "2024-01-02"] {
            server
                .post(endpoints::TRANSACTIONS)
                .json(&json!({"date": date, "type": "ads", "amount": 1}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("from", "banana")
            .await;

        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 2, "want 2 transactions, got {}", body.len());
    }
}
