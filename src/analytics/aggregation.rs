//! Expense aggregation for the analytics engine.
//!
//! Provides functions to sum the filtered view by category, build the
//! month-keyed trend series over full history, and derive the summary
//! statistics shown on the dashboard.

use std::collections::HashMap;

use serde::Serialize;
use time::{Date, Month};

use crate::{
    category::{Category, CategoryId},
    expense::Expense,
};

use super::filter::Period;

/// The number of trailing months included in the trend series.
pub const TREND_MONTHS: usize = 6;

/// A category's share of the filtered view, with its display tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The id of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: String,
    /// The display color of the category.
    pub color: String,
    /// The display icon of the category.
    pub icon: String,
    /// The sum of matching expense amounts.
    pub total: f64,
}

/// One month of the trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// The month being summed, as a date with the day set to 1.
    pub month: Date,
    /// The display label for the month, e.g. "Jan 2024".
    pub label: String,
    /// The sum of expense amounts in the month.
    pub total: f64,
}

/// Sums the expenses in each known category.
///
/// # Returns
/// One [CategoryTotal] per category with a positive sum, in the order of the
/// `categories` reference list. Amounts whose category id matches no known
/// category contribute to no bucket; this is deliberate leniency towards
/// dangling references, not validation.
pub fn aggregate_by_category(expenses: &[Expense], categories: &[Category]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&CategoryId, f64> = HashMap::new();

    for expense in expenses.iter().filter(|e| e.amount.is_finite()) {
        *totals.entry(&expense.category).or_insert(0.0) += expense.amount;
    }

    categories
        .iter()
        .filter_map(|category| {
            let total = totals.get(&category.id).copied().unwrap_or(0.0);

            (total > 0.0).then(|| CategoryTotal {
                id: category.id.clone(),
                name: category.name.clone(),
                color: category.color.clone(),
                icon: category.icon.clone(),
                total,
            })
        })
        .collect()
}

/// Aggregates expense amounts by calendar month over the full history.
///
/// Callers must pass the unfiltered expense set: the trend spans history
/// independently of the active period and category filters.
///
/// # Returns
/// One [TrendPoint] per month with at least one expense, sorted ascending by
/// month and truncated to the most recent [TREND_MONTHS] months.
pub fn monthly_trend(expenses: &[Expense]) -> Vec<TrendPoint> {
    let mut totals: HashMap<Date, f64> = HashMap::new();

    for expense in expenses.iter().filter(|e| e.amount.is_finite()) {
        let month = expense.date.replace_day(1).unwrap();
        *totals.entry(month).or_insert(0.0) += expense.amount;
    }

    let mut months: Vec<Date> = totals.keys().copied().collect();
    months.sort();

    let skip = months.len().saturating_sub(TREND_MONTHS);

    months
        .into_iter()
        .skip(skip)
        .map(|month| TrendPoint {
            month,
            label: format_month_label(month),
            total: totals[&month],
        })
        .collect()
}

/// The sum of expense amounts in the filtered view.
pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses
        .iter()
        .filter(|e| e.amount.is_finite())
        .map(|e| e.amount)
        .sum()
}

/// The total of the filtered view divided by the period's nominal day count.
///
/// Returns exactly 0.0 when the view is empty or the period is
/// [Period::All], which has no defined length; a `NaN` is never produced.
pub fn average_daily_spend(expenses: &[Expense], period: Period) -> f64 {
    if expenses.is_empty() {
        return 0.0;
    }

    match period.nominal_days() {
        Some(days) => total_spent(expenses) / days,
        None => 0.0,
    }
}

/// The number of categories with a positive aggregate in the filtered view.
pub fn active_category_count(expenses: &[Expense], categories: &[Category]) -> usize {
    aggregate_by_category(expenses, categories).len()
}

/// Formats a month date as a three-letter abbreviation followed by the year,
/// e.g. "Jan 2024".
fn format_month_label(month: Date) -> String {
    let name = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{name} {}", month.year())
}

#[cfg(test)]
mod aggregate_by_category_tests {
    use time::{Date, macros::date};

    use crate::{
        category::{Category, CategoryId},
        expense::Expense,
    };

    use super::{aggregate_by_category, total_spent};

    fn create_test_expense(amount: f64, date: Date, category: &str) -> Expense {
        Expense {
            id: 0,
            amount,
            description: "Test expense".to_string(),
            category: CategoryId::new_unchecked(category),
            date,
        }
    }

    fn create_test_category(id: &str, name: &str) -> Category {
        Category {
            id: CategoryId::new_unchecked(id),
            name: name.to_string(),
            color: "#FF6B6B".to_string(),
            icon: "🍽️".to_string(),
        }
    }

    #[test]
    fn sums_expenses_per_category() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(30.0, date!(2024 - 02 - 10), "food"),
            create_test_expense(20.0, date!(2024 - 02 - 15), "transport"),
        ];
        let categories = vec![
            create_test_category("food", "Food"),
            create_test_category("transport", "Transport"),
        ];

        let result = aggregate_by_category(&expenses, &categories);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Food");
        assert_eq!(result[0].total, 80.0);
        assert_eq!(result[1].name, "Transport");
        assert_eq!(result[1].total, 20.0);
    }

    #[test]
    fn output_follows_reference_order_not_expense_order() {
        let expenses = vec![
            create_test_expense(20.0, date!(2024 - 02 - 15), "transport"),
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
        ];
        let categories = vec![
            create_test_category("food", "Food"),
            create_test_category("transport", "Transport"),
        ];

        let result = aggregate_by_category(&expenses, &categories);

        assert_eq!(result[0].name, "Food");
        assert_eq!(result[1].name, "Transport");
    }

    #[test]
    fn omits_categories_with_a_zero_sum() {
        let expenses = vec![create_test_expense(50.0, date!(2024 - 01 - 05), "food")];
        let categories = vec![
            create_test_category("food", "Food"),
            create_test_category("transport", "Transport"),
        ];

        let result = aggregate_by_category(&expenses, &categories);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Food");
    }

    #[test]
    fn drops_amounts_with_dangling_category_references() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(99.0, date!(2024 - 01 - 05), "deleted-category"),
        ];
        let categories = vec![create_test_category("food", "Food")];

        let result = aggregate_by_category(&expenses, &categories);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total, 50.0);
    }

    #[test]
    fn bucket_sum_never_exceeds_the_filtered_total() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(99.0, date!(2024 - 01 - 05), "deleted-category"),
        ];
        let categories = vec![create_test_category("food", "Food")];

        let bucket_sum: f64 = aggregate_by_category(&expenses, &categories)
            .iter()
            .map(|bucket| bucket.total)
            .sum();

        assert!(bucket_sum <= total_spent(&expenses));
    }

    #[test]
    fn handles_empty_input() {
        let result = aggregate_by_category(&[], &[create_test_category("food", "Food")]);

        assert!(result.is_empty());
    }
}
