//! Implements a SQLite backed transaction store.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use rust_decimal::Decimal;
use time::{
    OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{
    Error,
    models::{NewTransaction, Transaction, TransactionPatch, TransactionType, parse_iso_date},
    stores::{TransactionQuery, TransactionStore},
};

// Fixed-width subseconds keep the text ordering of the column chronological.
const CREATED_AT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

/// Stores transactions in a SQLite database, one row per transaction.
///
/// Filtering and ordering are delegated to the SQL engine, and engine errors
/// are surfaced as [Error::SqlError] rather than swallowed; this is the
/// fail-loud counterpart to
/// [JsonFileTransactionStore](crate::stores::JsonFileTransactionStore).
///
/// Amounts are stored as exact decimal text; dates and creation timestamps
/// as fixed-width UTC text whose lexicographic order matches chronological
/// order.
#[derive(Debug)]
pub struct SqliteTransactionStore {
    connection: Connection,
}

impl SqliteTransactionStore {
    /// Create a store for the SQLite `connection`, creating the transactions
    /// table if it does not exist.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the table cannot be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                    id TEXT PRIMARY KEY,
                    date TEXT NOT NULL,
                    type TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    category TEXT,
                    note TEXT,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(Self { connection })
    }

    fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
        let id: String = row.get(0)?;
        let date: String = row.get(1)?;
        let transaction_type: String = row.get(2)?;
        let amount: String = row.get(3)?;
        let category: Option<String> = row.get(4)?;
        let note: Option<String> = row.get(5)?;
        let created_at: String = row.get(6)?;

        let date = parse_iso_date(&date).map_err(|error| text_conversion_error(1, error))?;
        let transaction_type = TransactionType::parse(&transaction_type).ok_or_else(|| {
            text_conversion_error(2, format!("unknown transaction type \"{transaction_type}\""))
        })?;
        let amount = amount
            .parse::<Decimal>()
            .map_err(|error| text_conversion_error(3, error))?;
        let created_at = OffsetDateTime::parse(&created_at, &Rfc3339)
            .map_err(|error| text_conversion_error(6, error))?;

        Ok(Transaction::new_unchecked(
            id,
            date,
            transaction_type,
            amount,
            category,
            note,
            created_at,
        ))
    }
}

fn text_conversion_error(
    column: usize,
    error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, error.into())
}

impl TransactionStore for SqliteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the insert fails.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let transaction = new_transaction.into_transaction();
        let created_at = transaction
            .created_at()
            .format(CREATED_AT_FORMAT)
            .expect("formatting a UTC timestamp with a fixed format cannot fail");

        self.connection.execute(
            "INSERT INTO transactions (id, date, type, amount, category, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                transaction.id(),
                transaction.date().to_string(),
                transaction.transaction_type().as_str(),
                transaction.amount().to_string(),
                transaction.category(),
                transaction.note(),
                created_at,
            ),
        )?;

        Ok(transaction)
    }

    /// Merge `patch` over the row with `id` and write it back.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<Transaction, Error> {
        let mut transaction = self
            .connection
            .prepare(
                "SELECT id, date, type, amount, category, note, created_at
                 FROM transactions WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        transaction.apply(patch);

        self.connection.execute(
            "UPDATE transactions
             SET date = ?1, type = ?2, amount = ?3, category = ?4, note = ?5
             WHERE id = ?6",
            (
                transaction.date().to_string(),
                transaction.transaction_type().as_str(),
                transaction.amount().to_string(),
                transaction.category(),
                transaction.note(),
                id,
            ),
        )?;

        Ok(transaction)
    }

    /// Delete the row with `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: &str) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Query for transactions in the database.
    ///
    /// The newest-first order is re-asserted on every query rather than
    /// relied on from storage.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![
            "SELECT id, date, type, amount, category, note, created_at FROM transactions"
                .to_string(),
        ];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(from) = query.from {
            where_clause_parts.push(format!("date >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(from.to_string()));
        }

        if let Some(to) = query.to {
            where_clause_parts.push(format!("date <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(to.to_string()));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY date DESC, created_at DESC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Get the total number of transactions in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn count(&self) -> Result<usize, Error> {
        self.connection
            .query_row("SELECT COUNT(id) FROM transactions", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as usize)
            .map_err(|error| error.into())
    }
}
