mod category;
mod ledger;
mod month;
mod report;
mod rollover;
mod transaction;

pub use category::{BudgetCategory, BudgetKind, CategoryError};
pub use ledger::{Ledger, LedgerError};
pub use month::{Month, MonthParseError};
pub use report::{
    budget_report, monthly_summary, unbudgeted_spending, BudgetReport, CategoryTotal,
    MonthlySummary, ReportOptions,
};
pub use rollover::{calculate_rollover, category_status, spent_in_month, CategoryStatus};
pub use transaction::{Transaction, TransactionError, TransactionKind};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// This represents the number of decimal places that percentages and ratios are rounded
// to before they are handed back to callers.
const CURRENCY_PRECISION: u32 = 2;

/// Matches one or more transactions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionMatcher {
    category: Option<String>,
    kind: Option<TransactionKind>,
}

impl TransactionMatcher {
    pub fn with_category<S: AsRef<str>>(&mut self, category: S) -> &mut Self {
        self.category = Some(normalise_label(category.as_ref()));
        self
    }

    pub fn with_kind(&mut self, kind: TransactionKind) -> &mut Self {
        self.kind = Some(kind);
        self
    }

    pub fn expenses_only(&mut self) -> &mut Self {
        self.with_kind(TransactionKind::Expense)
    }

    /// Test whether a transaction satisfies every criterion set on this matcher. An
    /// empty matcher matches everything.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if transaction.kind() != kind {
                return false;
            }
        }

        match self.category {
            Some(ref category) => *category == normalise_label(transaction.category()),
            None => true,
        }
    }
}

/// Canonical form of a free-text category label: trimmed, then lower-cased.
pub fn normalise_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// `part / whole` as a percentage, rounded to `CURRENCY_PRECISION` places.
///
/// Amounts are unbounded user input, so the ratio can exceed what a `Decimal` holds.
/// Such results saturate to `Decimal::MAX` (or `Decimal::MIN` when the signs differ)
/// instead of panicking. Callers guard against a zero `whole`.
pub(crate) fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    match part
        .checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
    {
        Some(p) => p.round_dp(CURRENCY_PRECISION),
        None if part.is_sign_negative() != whole.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    }
}

// Sum amounts, saturating at the bounds of `Decimal`
pub(crate) fn saturating_sum<I: Iterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Today's date in UTC, for callers that don't carry their own reference date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
