use crate::{
    category::BudgetCategory,
    month::Month,
    normalise_label,
    report::{
        budget_report, monthly_summary, unbudgeted_spending, BudgetReport, CategoryTotal,
        MonthlySummary, ReportOptions,
    },
    transaction::Transaction,
};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, convert::TryFrom};
use thiserror::Error;

/// The working set of transactions and budgets for one user.
///
/// This mirrors whatever the storage backend last delivered. Transactions can be added
/// or removed but never edited, and budgets are replaced wholesale by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LedgerRecord")]
pub struct Ledger {
    transactions: Vec<Transaction>,
    #[serde(rename = "budgets")]
    categories: Vec<BudgetCategory>,
}

// Snapshot document as stored. It only becomes a `Ledger` via `from_parts`, so
// duplicate ids are caught however the snapshot is deserialised.
#[derive(Deserialize)]
struct LedgerRecord {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    budgets: Vec<BudgetCategory>,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("a transaction with id '{0}' already exists")]
    DuplicateTransaction(String),
    #[error("no transaction with id '{0}'")]
    TransactionNotFound(String),
    #[error("no budget category with id '{0}'")]
    CategoryNotFound(String),
    #[error("could not read or write the ledger snapshot")]
    Snapshot(#[from] serde_json::Error),
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Build a ledger from collections that have already been loaded elsewhere
    pub fn from_parts(
        transactions: Vec<Transaction>,
        categories: Vec<BudgetCategory>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Ledger::new();

        for t in transactions {
            ledger.add_transaction(t)?;
        }

        for c in categories {
            ledger.upsert_category(c);
        }

        Ok(ledger)
    }

    /// Load a guest-mode snapshot
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let raw: LedgerRecord = serde_json::from_str(json)?;

        debug!(
            "loaded snapshot with {} transactions and {} budgets",
            raw.transactions.len(),
            raw.budgets.len()
        );

        Ledger::try_from(raw)
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    pub fn transactions_in(&self, month: Month) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| month.contains(t.date()))
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        if self.transactions.iter().any(|t| t.id() == transaction.id()) {
            warn!("rejected duplicate transaction '{}'", transaction.id());
            return Err(LedgerError::DuplicateTransaction(
                transaction.id().to_owned(),
            ));
        }

        self.transactions.push(transaction);
        Ok(())
    }

    pub fn remove_transaction(&mut self, id: &str) -> Result<Transaction, LedgerError> {
        match self.transactions.iter().position(|t| t.id() == id) {
            Some(i) => Ok(self.transactions.remove(i)),
            None => {
                warn!("cannot remove unknown transaction '{}'", id);
                Err(LedgerError::TransactionNotFound(id.to_owned()))
            }
        }
    }

    /// Insert a category, replacing any existing category with the same id. Returns
    /// the category that was replaced.
    pub fn upsert_category(&mut self, category: BudgetCategory) -> Option<BudgetCategory> {
        match self.categories.iter_mut().find(|c| c.id() == category.id()) {
            Some(existing) => Some(std::mem::replace(existing, category)),
            None => {
                self.categories.push(category);
                None
            }
        }
    }

    pub fn remove_category(&mut self, id: &str) -> Result<BudgetCategory, LedgerError> {
        match self.categories.iter().position(|c| c.id() == id) {
            Some(i) => Ok(self.categories.remove(i)),
            None => {
                warn!("cannot remove unknown budget category '{}'", id);
                Err(LedgerError::CategoryNotFound(id.to_owned()))
            }
        }
    }

    pub fn report(&self, reference_date: NaiveDate, options: &ReportOptions) -> BudgetReport {
        budget_report(
            &self.categories,
            &self.transactions,
            reference_date,
            options,
        )
    }

    pub fn summary(&self, month: Month) -> MonthlySummary {
        monthly_summary(&self.transactions, month)
    }

    pub fn unbudgeted(&self, month: Month) -> Vec<CategoryTotal> {
        unbudgeted_spending(&self.categories, &self.transactions, month)
    }

    /// Every distinct transaction label, spelled as first seen, for category suggestions
    pub fn labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();

        for t in self.transactions.iter() {
            let label = t.category().trim();
            if !label.is_empty() && seen.insert(normalise_label(label)) {
                labels.push(label.to_owned());
            }
        }

        labels
    }
}

impl TryFrom<LedgerRecord> for Ledger {
    type Error = LedgerError;

    fn try_from(r: LedgerRecord) -> Result<Self, Self::Error> {
        Ledger::from_parts(r.transactions, r.budgets)
    }
}
