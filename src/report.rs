use crate::{
    category::{BudgetCategory, BudgetKind},
    month::Month,
    normalise_label, percentage,
    rollover::{category_status, CategoryStatus},
    saturating_sum,
    transaction::Transaction,
};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Options that change how a budget report is put together
#[derive(Clone, Debug, PartialEq)]
pub struct ReportOptions {
    /// Carry unspent or overspent budget forward from earlier months
    pub rollover: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions { rollover: true }
    }
}

/// Every budget category's status for a single month
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetReport {
    pub month: Month,
    pub statuses: Vec<CategoryStatus>,
}

/// Expense total for one category label
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub amount: Decimal,
}

/// Income and spending for a single month
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlySummary {
    pub month: Month,
    pub income: Decimal,
    pub expense: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

impl BudgetReport {
    pub fn total_limit(&self) -> Decimal {
        saturating_sum(self.statuses.iter().map(|s| s.monthly_limit))
    }

    pub fn total_spent(&self) -> Decimal {
        saturating_sum(self.statuses.iter().map(|s| s.spent))
    }

    pub fn total_effective_limit(&self) -> Decimal {
        saturating_sum(self.statuses.iter().map(|s| s.effective_limit))
    }

    /// Expense budgets that have gone past their effective limit
    pub fn overspent(&self) -> impl Iterator<Item = &CategoryStatus> {
        self.statuses
            .iter()
            .filter(|s| s.kind == BudgetKind::Expense && s.is_overspent())
    }

    pub fn by_kind(&self, kind: BudgetKind) -> impl Iterator<Item = &CategoryStatus> {
        self.statuses.iter().filter(move |s| s.kind == kind)
    }
}

impl MonthlySummary {
    pub fn net(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }

    /// Share of income left over after expenses, as a percentage. Zero when there was
    /// no income, and saturated to `Decimal::MIN` or `Decimal::MAX` when the ratio is
    /// too large to represent.
    pub fn savings_rate(&self) -> Decimal {
        if self.income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        percentage(self.net(), self.income)
    }
}

/// Build the status of every category, in the order given, for the month containing
/// `reference_date`
pub fn budget_report(
    categories: &[BudgetCategory],
    transactions: &[Transaction],
    reference_date: NaiveDate,
    options: &ReportOptions,
) -> BudgetReport {
    let month = Month::of(reference_date);

    debug!(
        "building budget report for {} over {} categories and {} transactions (rollover: {})",
        month,
        categories.len(),
        transactions.len(),
        options.rollover
    );

    let statuses = categories
        .iter()
        .map(|c| category_status(c, transactions, reference_date, options))
        .collect();

    BudgetReport { month, statuses }
}

pub fn monthly_summary(transactions: &[Transaction], month: Month) -> MonthlySummary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let in_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| month.contains(t.date()))
        .collect();

    for t in in_month.iter() {
        if t.is_income() {
            income = income.saturating_add(t.amount());
        } else {
            expense = expense.saturating_add(t.amount());
        }
    }

    MonthlySummary {
        month,
        income,
        expense,
        by_category: group_expenses(in_month.into_iter()),
    }
}

/// Expense groups in `month` whose label matches none of `categories`
pub fn unbudgeted_spending(
    categories: &[BudgetCategory],
    transactions: &[Transaction],
    month: Month,
) -> Vec<CategoryTotal> {
    let unmatched = transactions
        .iter()
        .filter(|t| month.contains(t.date()) && t.is_expense())
        .filter(|t| !categories.iter().any(|c| c.matches(t)));

    group_expenses(unmatched)
}

// Sum expenses by normalised label. Each group is displayed with the first label seen
// for it, trimmed. Output is largest first, with ties broken alphabetically so the
// ordering is stable.
fn group_expenses<'a, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: Iterator<Item = &'a Transaction>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for t in transactions.filter(|t| t.is_expense()) {
        let key = normalise_label(t.category());
        match index.get(&key) {
            Some(&i) => totals[i].amount = totals[i].amount.saturating_add(t.amount()),
            None => {
                index.insert(key, totals.len());
                totals.push(CategoryTotal {
                    label: t.category().trim().to_owned(),
                    amount: t.amount(),
                });
            }
        }
    }

    totals.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.label.cmp(&b.label)));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionKind;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(
        id: &str,
        date: NaiveDate,
        amount: Decimal,
        kind: TransactionKind,
        category: &str,
    ) -> Transaction {
        Transaction::new(id, date, amount, kind, category, "").unwrap()
    }

    fn fixtures() -> (Vec<BudgetCategory>, Vec<Transaction>) {
        let categories = vec![
            BudgetCategory::new("food", "Food", dec!(300), BudgetKind::Expense).unwrap(),
            BudgetCategory::new("fun", "Fun", dec!(50), BudgetKind::Expense).unwrap(),
            BudgetCategory::new("inv", "Index fund", dec!(200), BudgetKind::Investment).unwrap(),
        ];
        let transactions = vec![
            txn("1", ymd(2024, 1, 5), dec!(250), TransactionKind::Expense, "food"),
            txn("2", ymd(2024, 2, 1), dec!(3000), TransactionKind::Income, "Salary"),
            txn("3", ymd(2024, 2, 3), dec!(120), TransactionKind::Expense, "Food "),
            txn("4", ymd(2024, 2, 9), dec!(80), TransactionKind::Expense, "fun"),
            txn("5", ymd(2024, 2, 11), dec!(200), TransactionKind::Expense, "index fund"),
            txn("6", ymd(2024, 2, 14), dec!(45), TransactionKind::Expense, "Gifts"),
            txn("7", ymd(2024, 2, 20), dec!(15), TransactionKind::Expense, " gifts"),
            txn("8", ymd(2024, 2, 21), dec!(60), TransactionKind::Expense, "Taxi"),
        ];
        (categories, transactions)
    }

    #[test]
    fn report_statuses_in_category_order() {
        let (categories, transactions) = fixtures();
        let report = budget_report(
            &categories,
            &transactions,
            ymd(2024, 2, 15),
            &ReportOptions::default(),
        );

        assert_eq!(report.month, Month::new(2024, 2).unwrap());
        let ids: Vec<&str> = report
            .statuses
            .iter()
            .map(|s| s.category_id.as_str())
            .collect();
        assert_eq!(ids, vec!["food", "fun", "inv"]);

        // Food rolled 50 over from January
        assert_eq!(report.statuses[0].rollover, dec!(50));
        assert_eq!(report.statuses[0].effective_limit, dec!(350));
    }

    #[test]
    fn report_totals() {
        let (categories, transactions) = fixtures();
        let report = budget_report(
            &categories,
            &transactions,
            ymd(2024, 2, 15),
            &ReportOptions::default(),
        );

        assert_eq!(report.total_limit(), dec!(550));
        assert_eq!(report.total_spent(), dec!(400));
        assert_eq!(report.total_effective_limit(), dec!(600));
    }

    #[test]
    fn report_overspent_and_kinds() {
        let (categories, transactions) = fixtures();
        let report = budget_report(
            &categories,
            &transactions,
            ymd(2024, 2, 15),
            &ReportOptions::default(),
        );

        let overspent: Vec<&str> = report.overspent().map(|s| s.name.as_str()).collect();
        assert_eq!(overspent, vec!["Fun"]);

        let investments: Vec<&CategoryStatus> =
            report.by_kind(BudgetKind::Investment).collect();
        assert_eq!(investments.len(), 1);
        assert!(investments[0].is_target_met());
    }

    #[test]
    fn report_no_rollover() {
        let (categories, transactions) = fixtures();
        let report = budget_report(
            &categories,
            &transactions,
            ymd(2024, 2, 15),
            &ReportOptions { rollover: false },
        );
        assert_eq!(report.total_effective_limit(), report.total_limit());
    }

    #[test]
    fn summary_totals() {
        let (_, transactions) = fixtures();
        let summary = monthly_summary(&transactions, Month::new(2024, 2).unwrap());

        assert_eq!(summary.income, dec!(3000));
        assert_eq!(summary.expense, dec!(520));
        assert_eq!(summary.net(), dec!(2480));
        assert_eq!(summary.savings_rate(), dec!(82.67));
    }

    #[test]
    fn summary_groups_by_label() {
        let (_, transactions) = fixtures();
        let summary = monthly_summary(&transactions, Month::new(2024, 2).unwrap());

        assert_eq!(
            summary.by_category,
            vec![
                CategoryTotal {
                    label: "index fund".into(),
                    amount: dec!(200)
                },
                CategoryTotal {
                    label: "Food".into(),
                    amount: dec!(120)
                },
                CategoryTotal {
                    label: "fun".into(),
                    amount: dec!(80)
                },
                CategoryTotal {
                    label: "Gifts".into(),
                    amount: dec!(60)
                },
                CategoryTotal {
                    label: "Taxi".into(),
                    amount: dec!(60)
                },
            ]
        );
    }

    #[test]
    fn summary_no_income() {
        let summary = monthly_summary(&[], Month::new(2024, 2).unwrap());
        assert_eq!(summary.savings_rate(), Decimal::ZERO);
        assert!(summary.by_category.is_empty());
    }

    #[test]
    fn summary_saturates() {
        let transactions = vec![
            txn(
                "1",
                ymd(2024, 2, 1),
                dec!(0.0000000000000000000001),
                TransactionKind::Income,
                "Interest",
            ),
            txn("2", ymd(2024, 2, 2), Decimal::MAX, TransactionKind::Expense, "Rent"),
            txn("3", ymd(2024, 2, 3), Decimal::MAX, TransactionKind::Expense, "rent"),
        ];
        let summary = monthly_summary(&transactions, Month::new(2024, 2).unwrap());

        assert_eq!(summary.expense, Decimal::MAX);
        assert_eq!(summary.by_category[0].amount, Decimal::MAX);
        assert_eq!(summary.net(), Decimal::MIN);
        assert_eq!(summary.savings_rate(), Decimal::MIN);
    }

    #[test]
    fn report_totals_saturate() {
        let categories = vec![
            BudgetCategory::new("a", "A", Decimal::MAX, BudgetKind::Expense).unwrap(),
            BudgetCategory::new("b", "B", Decimal::MAX, BudgetKind::Expense).unwrap(),
        ];
        let report = budget_report(
            &categories,
            &[],
            ymd(2024, 2, 1),
            &ReportOptions::default(),
        );

        assert_eq!(report.total_limit(), Decimal::MAX);
        assert_eq!(report.total_effective_limit(), Decimal::MAX);
        assert_eq!(report.total_spent(), Decimal::ZERO);
    }

    #[test]
    fn unbudgeted_groups() {
        let (categories, transactions) = fixtures();
        let unbudgeted =
            unbudgeted_spending(&categories, &transactions, Month::new(2024, 2).unwrap());

        assert_eq!(
            unbudgeted,
            vec![
                CategoryTotal {
                    label: "Gifts".into(),
                    amount: dec!(60)
                },
                CategoryTotal {
                    label: "Taxi".into(),
                    amount: dec!(60)
                },
            ]
        );
    }
}
