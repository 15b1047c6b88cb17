//! This file defines the type `Transaction`, the core type of the ledger,
//! along with the validated payloads accepted by the mutation endpoints.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use rand::{Rng, distributions::Alphanumeric};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a calendar date in the `YYYY-MM-DD` encoding used on the wire and on
/// disk. Lexicographic order of this fixed-width encoding matches
/// chronological order.
pub(crate) fn parse_iso_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, DATE_FORMAT)
}

/// Serde helpers for the `YYYY-MM-DD` date encoding.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = date
            .format(super::DATE_FORMAT)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        super::parse_iso_date(&text).map_err(de::Error::custom)
    }
}

/// The closed set of money event kinds tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Advertising spend.
    Ads,
    /// An operating expense.
    Expense,
    /// Money earned.
    Revenue,
}

impl TransactionType {
    /// The encoding of the type on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Ads => "ads",
            TransactionType::Expense => "expense",
            TransactionType::Revenue => "revenue",
        }
    }

    pub(crate) fn parse(text: &str) -> Option<Self> {
        match text {
            "ads" => Some(TransactionType::Ads),
            "expense" => Some(TransactionType::Expense),
            "revenue" => Some(TransactionType::Revenue),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dated money event: advertising spend, an expense, or revenue.
///
/// To create a new `Transaction`, build a [NewTransaction] and pass it to a
/// store, which assigns the identity fields (`id`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    #[serde(with = "iso_date")]
    date: Date,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Transaction {
    /// The opaque unique ID of the transaction, assigned at creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The calendar date the money event happened on.
    pub fn date(&self) -> Date {
        self.date
    }

    /// Which kind of money event this is.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// The amount of money spent or earned, always non-negative.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// An optional free-text label grouping related transactions.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// An optional free-text annotation.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// When the transaction was inserted, used as the ordering tie-break for
    /// transactions sharing a date.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub(crate) fn new_unchecked(
        id: String,
        date: Date,
        transaction_type: TransactionType,
        amount: Decimal,
        category: Option<String>,
        note: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            date,
            transaction_type,
            amount,
            category,
            note,
            created_at,
        }
    }

    /// Whether a record read back from storage still satisfies the amount
    /// invariant. The type and date invariants are enforced by deserialization.
    pub(crate) fn is_valid_record(&self) -> bool {
        self.amount >= Decimal::ZERO
    }

    /// Merge `patch` over this record. Absent fields keep their values; the
    /// identity fields are never touched.
    pub(crate) fn apply(&mut self, patch: TransactionPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }

        if let Some(transaction_type) = patch.transaction_type {
            self.transaction_type = transaction_type;
        }

        if let Some(amount) = patch.amount {
            self.amount = amount;
        }

        if let Some(category) = patch.category {
            self.category = Some(category);
        }

        if let Some(note) = patch.note {
            self.note = Some(note);
        }
    }
}

/// Order `transactions` newest first: date descending, tie-broken by creation
/// time descending. Inserts re-assert this order over the full collection.
pub(crate) fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// A validated creation payload: the fields a client may supply when
/// inserting a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    date: Date,
    transaction_type: TransactionType,
    amount: Decimal,
    category: Option<String>,
    note: Option<String>,
}

impl NewTransaction {
    /// Create a payload programmatically.
    ///
    /// The HTTP layer goes through [NewTransaction::parse] instead, which
    /// validates untrusted input; callers of this constructor are expected to
    /// pass a non-negative amount.
    pub fn new(date: Date, transaction_type: TransactionType, amount: Decimal) -> Self {
        Self {
            date,
            transaction_type,
            amount,
            category: None,
            note: None,
        }
    }

    /// Set the free-text category label.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the free-text note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Validate an untrusted creation payload.
    ///
    /// `date`, `type`, and `amount` are required; `category` and `note` are
    /// optional strings. Acceptance is all-or-nothing: any problem rejects
    /// the whole payload with a per-field report.
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let Some(object) = payload.as_object() else {
            errors.push("body", "expected a JSON object");
            return Err(errors);
        };

        let date = match object.get("date") {
            Some(Value::String(text)) => parse_date_field(text, &mut errors),
            Some(_) => {
                errors.push("date", "expected a string");
                None
            }
            None => {
                errors.push("date", "required");
                None
            }
        };

        let transaction_type = match object.get("type") {
            Some(Value::String(text)) => parse_type_field(text, &mut errors),
            Some(_) => {
                errors.push("type", "expected a string");
                None
            }
            None => {
                errors.push("type", "required");
                None
            }
        };

        let amount = match object.get("amount") {
            Some(Value::Number(number)) => parse_amount_field(number, &mut errors),
            Some(_) => {
                errors.push("amount", "expected a number");
                None
            }
            None => {
                errors.push("amount", "required");
                None
            }
        };

        let category = optional_text_field(object, "category", &mut errors);
        let note = optional_text_field(object, "note", &mut errors);

        match (date, transaction_type, amount) {
            (Some(date), Some(transaction_type), Some(amount)) if errors.is_empty() => Ok(Self {
                date,
                transaction_type,
                amount,
                category,
                note,
            }),
            _ => Err(errors),
        }
    }

    /// Assign the server-side identity fields and produce the record to
    /// store. The ID embeds the transaction date, the current time in
    /// milliseconds, and a random suffix that makes collisions within one
    /// process practically impossible.
    pub(crate) fn into_transaction(self) -> Transaction {
        let created_at = OffsetDateTime::now_utc();

        Transaction {
            id: generate_id(self.date, created_at),
            date: self.date,
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            note: self.note,
            created_at,
        }
    }
}

fn generate_id(date: Date, created_at: OffsetDateTime) -> String {
    let millis = created_at.unix_timestamp_nanos() / 1_000_000;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();

    format!("{date}-{millis}-{suffix}")
}

/// A partial update for an existing transaction.
///
/// Every field is optional; absent fields keep their prior values. The
/// identity fields (`id`, `createdAt`) cannot be patched and are ignored if
/// present in a payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    date: Option<Date>,
    transaction_type: Option<TransactionType>,
    amount: Option<Decimal>,
    category: Option<String>,
    note: Option<String>,
}

impl TransactionPatch {
    /// Set the date to merge over the existing record.
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the type to merge over the existing record.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    /// Set the amount to merge over the existing record.
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the category to merge over the existing record.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the note to merge over the existing record.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Validate an untrusted patch payload.
    ///
    /// Fields that are present must be well-typed and satisfy the same
    /// constraints as at creation; fields that are absent impose no change.
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let Some(object) = payload.as_object() else {
            errors.push("body", "expected a JSON object");
            return Err(errors);
        };

        let date = match object.get("date") {
            Some(Value::String(text)) => parse_date_field(text, &mut errors),
            Some(_) => {
                errors.push("date", "expected a string");
                None
            }
            None => None,
        };

        let transaction_type = match object.get("type") {
            Some(Value::String(text)) => parse_type_field(text, &mut errors),
            Some(_) => {
                errors.push("type", "expected a string");
                None
            }
            None => None,
        };

        let amount = match object.get("amount") {
            Some(Value::Number(number)) => parse_amount_field(number, &mut errors),
            Some(_) => {
                errors.push("amount", "expected a number");
                None
            }
            None => None,
        };

        let category = optional_text_field(object, "category", &mut errors);
        let note = optional_text_field(object, "note", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            date,
            transaction_type,
            amount,
            category,
            note,
        })
    }
}

fn parse_date_field(text: &str, errors: &mut ValidationErrors) -> Option<Date> {
    match parse_iso_date(text) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("date", format!("\"{text}\" is not a valid YYYY-MM-DD date"));
            None
        }
    }
}

fn parse_type_field(text: &str, errors: &mut ValidationErrors) -> Option<TransactionType> {
    match TransactionType::parse(text) {
        Some(transaction_type) => Some(transaction_type),
        None => {
            errors.push(
                "type",
                format!("\"{text}\" is not one of ads, expense, revenue"),
            );
            None
        }
    }
}

fn parse_amount_field(number: &serde_json::Number, errors: &mut ValidationErrors) -> Option<Decimal> {
    let Ok(amount) = number.to_string().parse::<Decimal>() else {
        errors.push("amount", format!("{number} is out of range"));
        return None;
    };

    if amount < Decimal::ZERO {
        errors.push("amount", "must not be negative");
        return None;
    }

    Some(amount)
}

fn optional_text_field(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match object.get(field) {
        Some(Value::String(text)) => Some(text.clone()),
        None | Some(Value::Null) => None,
        Some(_) => {
            errors.push(field, "expected a string");
            None
        }
    }
}

/// A machine-readable, per-field report of what was wrong with a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    #[serde(rename = "fieldErrors")]
    field_errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub(crate) fn new() -> Self {
        Self {
            field_errors: BTreeMap::new(),
        }
    }

    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.field_errors
            .entry(field)
            .or_default()
            .push(message.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// The fields that failed validation and why.
    pub fn field_errors(&self) -> &BTreeMap<&'static str, Vec<String>> {
        &self.field_errors
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let summary: Vec<String> = self
            .field_errors
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();

        write!(f, "{}", summary.join("; "))
    }
}
