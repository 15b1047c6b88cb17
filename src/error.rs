//! Defines the app level error type and its mapping onto JSON HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::ValidationErrors;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A creation or patch payload failed validation.
    ///
    /// Carries the per-field report returned to the client, who can correct
    /// the input and retry.
    #[error("invalid transaction payload: {0}")]
    InvalidTransaction(ValidationErrors),

    /// The requested transaction could not be found.
    ///
    /// The client should check that the ID is correct and that the
    /// transaction has not already been deleted.
    #[error("the requested transaction could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error from the table-backed store.
    ///
    /// Surfaced to the client as a generic internal error; the details are
    /// only logged on the server.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The file-backed store could not persist the data file.
    ///
    /// Reads from the data file never fail, but a write that cannot complete
    /// must be surfaced so the client does not believe its mutation stuck.
    #[error("could not write the transaction data file: {0}")]
    DataFile(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::InvalidTransaction(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTransaction(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": errors }))).into_response()
            }
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Transaction not found" })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
