//! This module defines the domain data types and their validation.

mod transaction;

pub use transaction::{
    NewTransaction, Transaction, TransactionPatch, TransactionType, ValidationErrors,
};

pub(crate) use transaction::{iso_date, parse_iso_date, sort_newest_first};
