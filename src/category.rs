use crate::{transaction::Transaction, TransactionMatcher};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

/// What a budget is tracking. Expense budgets are ceilings, investment budgets are
/// targets that the user is trying to reach each month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetKind {
    Expense,
    Investment,
}

impl Default for BudgetKind {
    fn default() -> Self {
        BudgetKind::Expense
    }
}

/// A named monthly allowance that expense transactions are matched against by label
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoryRecord")]
pub struct BudgetCategory {
    id: String,
    name: String,
    #[serde(rename = "limit")]
    monthly_limit: Decimal,
    kind: BudgetKind,
}

#[derive(Error, Debug, PartialEq)]
pub enum CategoryError {
    #[error("monthly limits cannot be negative, got {0}")]
    NegativeLimit(Decimal),
}

#[derive(Deserialize)]
struct CategoryRecord {
    id: String,
    name: String,
    #[serde(alias = "monthly_limit")]
    limit: Decimal,
    #[serde(default)]
    kind: BudgetKind,
}

impl BudgetCategory {
    pub fn new<I, N>(
        id: I,
        name: N,
        monthly_limit: Decimal,
        kind: BudgetKind,
    ) -> Result<Self, CategoryError>
    where
        I: Into<String>,
        N: Into<String>,
    {
        if monthly_limit < Decimal::ZERO {
            return Err(CategoryError::NegativeLimit(monthly_limit));
        }

        Ok(BudgetCategory {
            id: id.into(),
            name: name.into(),
            monthly_limit,
            kind,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn monthly_limit(&self) -> Decimal {
        self.monthly_limit
    }

    pub fn kind(&self) -> BudgetKind {
        self.kind
    }

    /// The matcher for transactions that count against this budget. Only expenses are
    /// ever counted, whatever the budget kind.
    pub fn matcher(&self) -> TransactionMatcher {
        let mut matcher = TransactionMatcher::default();
        matcher.with_category(self.name.as_str()).expenses_only();
        matcher
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matcher().matches(transaction)
    }
}

impl TryFrom<CategoryRecord> for BudgetCategory {
    type Error = CategoryError;

    fn try_from(r: CategoryRecord) -> Result<Self, Self::Error> {
        BudgetCategory::new(r.id, r.name, r.limit, r.kind)
    }
}
