//! Heuristic insight rules for the analytics engine.
//!
//! Each rule is independent and yields nothing when its precondition does
//! not hold; no rule ever raises an error for missing data. The engine
//! exposes structured records (kind plus parameters) and leaves wording to
//! the presentation layer.

use std::iter;

use serde::Serialize;
use time::Weekday;

use crate::{
    category::{Category, CategoryId},
    expense::Expense,
};

use super::{
    aggregation::{aggregate_by_category, average_daily_spend, monthly_trend, total_spent},
    filter::Period,
};

/// The fraction of spending the savings suggestion proposes to cut.
const SAVINGS_RATE: f64 = 0.1;

/// The nominal number of days per month used for the savings projection.
const DAYS_PER_MONTH: f64 = 30.0;

/// A derived observation about spending, with the parameters a presentation
/// layer needs to word it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    /// The category with the largest share of the filtered spending.
    TopCategory {
        /// The id of the top category.
        category: CategoryId,
        /// The display name of the top category.
        name: String,
        /// The amount spent in the top category.
        total: f64,
        /// The category's share of the filtered total, as a percentage.
        share: f64,
    },
    /// How the latest trend month compares to the month before it.
    MonthOverMonth {
        /// The prior month's total.
        previous: f64,
        /// The latest month's total.
        latest: f64,
        /// The percentage change from `previous` to `latest`. Positive for
        /// an increase; zero and negative values are not increases.
        percent_change: f64,
    },
    /// The projected monthly saving from trimming spending by 10%.
    SavingsSuggestion {
        /// The average daily spend over the filtered period.
        daily_average: f64,
        /// The projected saving per month.
        projected_monthly_saving: f64,
    },
    /// The weekday with the highest spending across all history.
    DominantWeekday {
        /// The weekday with the highest total.
        weekday: Weekday,
        /// The total spent on that weekday.
        total: f64,
    },
}

/// Evaluates every insight rule lazily, in a fixed order: top category,
/// month-over-month change, savings suggestion, dominant weekday.
///
/// `expenses` is the full history; `filtered` is the active filtered view
/// over the same records. The trend and weekday rules read the history, the
/// other rules read the view.
pub fn generate_insights<'a>(
    expenses: &'a [Expense],
    filtered: &'a [Expense],
    categories: &'a [Category],
    period: Period,
) -> impl Iterator<Item = Insight> + 'a {
    iter::once_with(move || top_category(filtered, categories))
        .chain(iter::once_with(move || month_over_month(expenses)))
        .chain(iter::once_with(move || savings_suggestion(filtered, period)))
        .chain(iter::once_with(move || dominant_weekday(expenses)))
        .flatten()
}

/// The single largest category bucket and its share of the filtered total.
///
/// Yields nothing when no category has positive spend or the filtered total
/// is not positive. Ties keep the bucket that appears first in the
/// categories reference order.
pub fn top_category(filtered: &[Expense], categories: &[Category]) -> Option<Insight> {
    let total = total_spent(filtered);

    if total <= 0.0 {
        return None;
    }

    aggregate_by_category(filtered, categories)
        .into_iter()
        // Strict comparison keeps the earliest bucket on ties.
        .reduce(|max, bucket| if bucket.total > max.total { bucket } else { max })
        .map(|bucket| Insight::TopCategory {
            share: 100.0 * bucket.total / total,
            category: bucket.id,
            name: bucket.name,
            total: bucket.total,
        })
}

/// The change between the two most recent trend months.
///
/// Yields nothing when the trend has fewer than two months, or when the
/// prior month's total is zero and the change is undefined.
pub fn month_over_month(expenses: &[Expense]) -> Option<Insight> {
    let trend = monthly_trend(expenses);
    let [.., previous, latest] = trend.as_slice() else {
        return None;
    };

    if previous.total == 0.0 {
        return None;
    }

    Some(Insight::MonthOverMonth {
        previous: previous.total,
        latest: latest.total,
        percent_change: 100.0 * (latest.total - previous.total) / previous.total,
    })
}

/// A projected monthly saving from cutting the filtered daily average by
/// [SAVINGS_RATE].
///
/// Yields nothing when the daily average is not positive.
pub fn savings_suggestion(filtered: &[Expense], period: Period) -> Option<Insight> {
    let daily_average = average_daily_spend(filtered, period);

    (daily_average > 0.0).then(|| Insight::SavingsSuggestion {
        daily_average,
        projected_monthly_saving: daily_average * DAYS_PER_MONTH * SAVINGS_RATE,
    })
}

/// The weekday with the highest total across all history.
///
/// Yields nothing when the history is empty. Ties keep the earliest weekday,
/// counting from Sunday.
pub fn dominant_weekday(expenses: &[Expense]) -> Option<Insight> {
    let mut totals = [0.0_f64; 7];
    let mut any_expense = false;

    for expense in expenses.iter().filter(|e| e.amount.is_finite()) {
        totals[expense.date.weekday().number_days_from_sunday() as usize] += expense.amount;
        any_expense = true;
    }

    if !any_expense {
        return None;
    }

    let (index, total) = totals
        .iter()
        .enumerate()
        .reduce(|max, bucket| if bucket.1 > max.1 { bucket } else { max })?;

    Some(Insight::DominantWeekday {
        weekday: Weekday::Sunday.nth_next(index as u8),
        total: *total,
    })
}

#[cfg(test)]
mod insight_rule_tests {
    use time::{Date, Weekday, macros::date};

    use crate::{
        category::{Category, CategoryId},
        expense::Expense,
    };

    use super::{
        super::filter::Period, Insight, dominant_weekday, month_over_month, savings_suggestion,
        top_category,
    };

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
    fn top_category_reports_the_largest_share() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(30.0, date!(2024 - 02 - 10), "food"),
            create_test_expense(20.0, date!(2024 - 02 - 15), "transport"),
        ];
        let categories = vec![
            create_test_category("food", "Food"),
            create_test_category("transport", "Transport"),
        ];

        let insight = top_category(&expenses, &categories);

        assert_eq!(
            insight,
            Some(Insight::TopCategory {
                category: CategoryId::new_unchecked("food"),
                name: "Food".to_string(),
                total: 80.0,
                share: 80.0,
            })
        );
    }

    #[test]
    fn top_category_ties_keep_the_reference_order() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "transport"),
            create_test_expense(50.0, date!(2024 - 01 - 06), "food"),
        ];
        let categories = vec![
            create_test_category("food", "Food"),
            create_test_category("transport", "Transport"),
        ];

        let Some(Insight::TopCategory { name, .. }) = top_category(&expenses, &categories) else {
            panic!("Expected a top category insight");
        };

        assert_eq!(name, "Food");
    }

    #[test]
    fn top_category_is_skipped_without_positive_spend() {
        let categories = vec![create_test_category("food", "Food")];

        assert_eq!(top_category(&[], &categories), None);
    }

    #[test]
    fn month_over_month_reports_a_flat_change_as_zero() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(30.0, date!(2024 - 02 - 10), "food"),
            create_test_expense(20.0, date!(2024 - 02 - 15), "transport"),
        ];

        let Some(Insight::MonthOverMonth {
            previous,
            latest,
            percent_change,
        }) = month_over_month(&expenses)
        else {
            panic!("Expected a month-over-month insight");
        };

        assert_eq!(previous, 50.0);
        assert_eq!(latest, 50.0);
        assert_eq!(percent_change, 0.0);
        assert!(percent_change <= 0.0, "a flat change is not an increase");
    }

    #[test]
    fn month_over_month_reports_an_increase() {
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(75.0, date!(2024 - 02 - 10), "food"),
        ];

        let Some(Insight::MonthOverMonth { percent_change, .. }) = month_over_month(&expenses)
        else {
            panic!("Expected a month-over-month insight");
        };

        assert_eq!(percent_change, 50.0);
    }

    #[test]
    fn month_over_month_requires_two_months() {
        let expenses = vec![create_test_expense(50.0, date!(2024 - 01 - 05), "food")];

        assert_eq!(month_over_month(&expenses), None);
    }

    #[test]
    fn month_over_month_is_skipped_when_the_prior_month_is_zero() {
        let expenses = vec![
            create_test_expense(0.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(75.0, date!(2024 - 02 - 10), "food"),
        ];

        assert_eq!(month_over_month(&expenses), None);
    }

    #[test]
    fn savings_suggestion_projects_ten_percent_of_a_month() {
        let expenses = vec![create_test_expense(70.0, date!(2024 - 01 - 05), "food")];

        let insight = savings_suggestion(&expenses, Period::Week);

        assert_eq!(
            insight,
            Some(Insight::SavingsSuggestion {
                daily_average: 10.0,
                projected_monthly_saving: 30.0,
            })
        );
    }

    #[test]
    fn savings_suggestion_is_skipped_without_spending() {
        assert_eq!(savings_suggestion(&[], Period::Week), None);
        // The "all" period has no daily average, so there is nothing to trim.
        let expenses = vec![create_test_expense(70.0, date!(2024 - 01 - 05), "food")];
        assert_eq!(savings_suggestion(&expenses, Period::All), None);
    }

    #[test]
    fn dominant_weekday_picks_the_highest_total() {
        // 2024-01-05 is a Friday, 2024-01-06 a Saturday.
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 05), "food"),
            create_test_expense(20.0, date!(2024 - 01 - 06), "food"),
            create_test_expense(40.0, date!(2024 - 01 - 12), "food"),
        ];

        let insight = dominant_weekday(&expenses);

        assert_eq!(
            insight,
            Some(Insight::DominantWeekday {
                weekday: Weekday::Friday,
                total: 90.0,
            })
        );
    }

    #[test]
    fn dominant_weekday_ties_keep_the_earliest_weekday() {
        // 2024-01-07 is a Sunday, 2024-01-06 a Saturday.
        let expenses = vec![
            create_test_expense(50.0, date!(2024 - 01 - 06), "food"),
            create_test_expense(50.0, date!(2024 - 01 - 07), "food"),
        ];

        let insight = dominant_weekday(&expenses);

        assert_eq!(
            insight,
            Some(Insight::DominantWeekday {
                weekday: Weekday::Sunday,
                total: 50.0,
            })
        );
    }

    #[test]
    fn dominant_weekday_fires_for_any_history() {
        let expenses = vec![create_test_expense(0.0, date!(2024 - 01 - 05), "food")];

        assert!(dominant_weekday(&expenses).is_some());
    }

    #[test]
    fn dominant_weekday_is_skipped_for_empty_history() {
        assert_eq!(dominant_weekday(&[]), None);
    }
}
