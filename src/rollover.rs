use crate::{
    category::{BudgetCategory, BudgetKind},
    month::Month,
    percentage,
    report::ReportOptions,
    saturating_sum,
    transaction::Transaction,
};
use chrono::NaiveDate;
use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Where a budget category stands for one month
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryStatus {
    pub category_id: String,
    pub name: String,
    pub kind: BudgetKind,
    pub monthly_limit: Decimal,
    pub spent: Decimal,
    pub rollover: Decimal,
    // Nominal limit plus rollover. A negative value is a deficit carried forward.
    pub effective_limit: Decimal,
}

impl CategoryStatus {
    pub fn remaining(&self) -> Decimal {
        self.effective_limit.saturating_sub(self.spent)
    }

    /// Share of the effective limit that has been spent, as a percentage.
    ///
    /// A zero or negative effective limit has nothing meaningful to divide by. In that
    /// case any spending at all reads as 100%, and no spending reads as 0%. A ratio too
    /// large to represent saturates to `Decimal::MAX`.
    pub fn percent_used(&self) -> Decimal {
        if self.effective_limit <= Decimal::ZERO {
            return if self.spent > Decimal::ZERO {
                dec!(100)
            } else {
                Decimal::ZERO
            };
        }

        percentage(self.spent, self.effective_limit)
    }

    pub fn is_overspent(&self) -> bool {
        self.spent > self.effective_limit
    }

    /// For investment budgets the limit is a goal rather than a ceiling
    pub fn is_target_met(&self) -> bool {
        self.spent >= self.effective_limit
    }
}

/// Returns the unspent (positive) or overspent (negative) budget carried into
/// `current` from every earlier month.
///
/// Totals saturate at the bounds of `Decimal` rather than overflowing, so an enormous
/// limit or history yields `Decimal::MAX`-sized figures instead of a panic.
///
/// Tracking is assumed to have started in the month of the earliest matching expense,
/// as categories carry no creation date. Every month from then until the month before
/// `current` contributes one `monthly_limit`, and every matching expense before
/// `current` is deducted from that allocation.
pub fn calculate_rollover(
    category: &BudgetCategory,
    transactions: &[Transaction],
    current: Month,
) -> Decimal {
    let matcher = category.matcher();
    let cutoff = current.first_day();

    let mut start: Option<NaiveDate> = None;
    let mut total_spent = Decimal::ZERO;

    for t in transactions
        .iter()
        .filter(|t| t.date() < cutoff && matcher.matches(t))
    {
        trace!(
            "historical expense for '{}': {} on {}",
            category.name(),
            t.amount(),
            t.date()
        );

        total_spent = total_spent.saturating_add(t.amount());
        start = Some(match start {
            Some(s) if s <= t.date() => s,
            _ => t.date(),
        });
    }

    // No history means there is nothing to carry forward
    let start_month = match start {
        Some(date) => Month::of(date),
        None => {
            debug!(
                "no expenses for '{}' before {} - rollover is zero",
                category.name(),
                current
            );
            return Decimal::ZERO;
        }
    };

    let months_passed = current.months_since(start_month);
    if months_passed <= 0 {
        debug!(
            "tracking for '{}' starts in {}, which is not before {} - rollover is zero",
            category.name(),
            start_month,
            current
        );
        return Decimal::ZERO;
    }

    let total_allocated =
        Decimal::from(months_passed).saturating_mul(category.monthly_limit());
    let rollover = total_allocated.saturating_sub(total_spent);

    debug!(
        "rollover for '{}' into {}: {} months since {} * {} - {} spent = {}",
        category.name(),
        current,
        months_passed,
        start_month,
        category.monthly_limit(),
        total_spent,
        rollover
    );

    rollover
}

/// Total of the expenses matching `category` that fall inside `month`
pub fn spent_in_month(
    category: &BudgetCategory,
    transactions: &[Transaction],
    month: Month,
) -> Decimal {
    let matcher = category.matcher();

    saturating_sum(
        transactions
            .iter()
            .filter(|t| month.contains(t.date()) && matcher.matches(t))
            .map(Transaction::amount),
    )
}

/// Build the status of a single category for the month containing `reference_date`
pub fn category_status(
    category: &BudgetCategory,
    transactions: &[Transaction],
    reference_date: NaiveDate,
    options: &ReportOptions,
) -> CategoryStatus {
    let month = Month::of(reference_date);
    let spent = spent_in_month(category, transactions, month);
    let rollover = if options.rollover {
        calculate_rollover(category, transactions, month)
    } else {
        Decimal::ZERO
    };

    CategoryStatus {
        category_id: category.id().to_owned(),
        name: category.name().to_owned(),
        kind: category.kind(),
        monthly_limit: category.monthly_limit(),
        spent,
        rollover,
        effective_limit: category.monthly_limit().saturating_add(rollover),
    }
}
