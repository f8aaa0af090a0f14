use crate::month::Month;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

/// Which way money moved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A single recorded movement of money.
///
/// `Transaction`s are immutable once created. The only thing that can happen to one
/// afterwards is removal from the `Ledger` that holds it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    id: String,
    date: NaiveDate,
    amount: Decimal,
    kind: TransactionKind,
    category: String,
    note: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum TransactionError {
    #[error("transaction amounts must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
}

// Unvalidated shape of a stored transaction. Deserialisation goes through this so that
// a bad record can never become a `Transaction`.
#[derive(Deserialize)]
struct TransactionRecord {
    id: String,
    date: NaiveDate,
    amount: Decimal,
    kind: TransactionKind,
    #[serde(default)]
    category: String,
    #[serde(default)]
    note: String,
}

impl Transaction {
    pub fn new<I, C, N>(
        id: I,
        date: NaiveDate,
        amount: Decimal,
        kind: TransactionKind,
        category: C,
        note: N,
    ) -> Result<Self, TransactionError>
    where
        I: Into<String>,
        C: Into<String>,
        N: Into<String>,
    {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveAmount(amount));
        }

        Ok(Transaction {
            id: id.into(),
            date,
            amount,
            kind,
            category: category.into(),
            note: note.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The free-text category label as the user typed it
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn month(&self) -> Month {
        Month::of(self.date)
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = TransactionError;

    fn try_from(r: TransactionRecord) -> Result<Self, Self::Error> {
        Transaction::new(r.id, r.date, r.amount, r.kind, r.category, r.note)
    }
}
