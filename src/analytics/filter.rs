//! Period and category filters that build the filtered expense view.
//!
//! Both filters are pure functions over the caller's snapshot: they return
//! subsequences of the input, preserving relative order, and the period
//! filter takes its "now" reference as an argument so results are
//! deterministic under test.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::{Error, category::CategoryId, expense::Expense};

/// The trailing time window used to filter expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The last seven days.
    Week,
    /// The last calendar month.
    #[default]
    Month,
    /// The last calendar year.
    Year,
    /// No lower bound.
    All,
}

impl Period {
    /// The inclusive lower bound of the window ending at `today`, or `None`
    /// for [Period::All].
    ///
    /// The month and year windows step back one calendar month or year,
    /// clamping the day to the length of the target month, e.g. March 31
    /// steps back to February 28 (or 29 in a leap year).
    pub fn start(self, today: Date) -> Option<Date> {
        match self {
            Period::Week => Some(today - Duration::days(7)),
            Period::Month => Some(one_month_earlier(today)),
            Period::Year => Some(one_year_earlier(today)),
            Period::All => None,
        }
    }

    /// The fixed number of days used as the denominator for daily averages,
    /// or `None` for [Period::All] which has no defined length.
    pub fn nominal_days(self) -> Option<f64> {
        match self {
            Period::Week => Some(7.0),
            Period::Month => Some(30.0),
            Period::Year => Some(365.0),
            Period::All => None,
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            unknown => Err(Error::InvalidPeriod(unknown.to_string())),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        };

        write!(f, "{keyword}")
    }
}

/// Selects expenses by category. [CategoryFilter::All] keeps every expense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Keep every expense.
    #[default]
    All,
    /// Keep only expenses in the given category.
    Only(CategoryId),
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(CategoryFilter::All)
        } else {
            CategoryId::new(s).map(CategoryFilter::Only)
        }
    }
}

/// The expenses whose date falls within the trailing `period` window ending
/// at `reference_today`, preserving relative order.
///
/// The comparison is `date >= lower bound`: future-dated expenses are never
/// excluded. Expenses with a non-finite amount are dropped.
pub fn filter_by_period(
    expenses: &[Expense],
    period: Period,
    reference_today: Date,
) -> Vec<Expense> {
    let lower_bound = period.start(reference_today);

    expenses
        .iter()
        .filter(|expense| expense.amount.is_finite())
        .filter(|expense| lower_bound.is_none_or(|start| expense.date >= start))
        .cloned()
        .collect()
}

/// The expenses matching `filter`, preserving relative order.
///
/// Expenses with a non-finite amount are dropped.
pub fn filter_by_category(expenses: &[Expense], filter: &CategoryFilter) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| expense.amount.is_finite())
        .filter(|expense| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => expense.category == *id,
        })
        .cloned()
        .collect()
}

/// The combined filtered view: the category filter followed by the period
/// filter. The two are independent predicates, so the order does not affect
/// the result.
pub fn filtered_view(
    expenses: &[Expense],
    category: &CategoryFilter,
    period: Period,
    reference_today: Date,
) -> Vec<Expense> {
    filter_by_period(&filter_by_category(expenses, category), period, reference_today)
}

fn one_month_earlier(date: Date) -> Date {
    let month = date.month().previous();
    let year = if month == Month::December {
        date.year() - 1
    } else {
        date.year()
    };
    let day = date.day().min(month.length(year));

    // The day is clamped to the target month, so the date is always valid.
    Date::from_calendar_date(year, month, day).unwrap()
}

fn one_year_earlier(date: Date) -> Date {
    let year = date.year() - 1;
    let day = date.day().min(date.month().length(year));

    Date::from_calendar_date(year, date.month(), day).unwrap()
}

#[cfg(test)]
mod period_tests {
    use std::str::FromStr;

    use time::macros::date;

    use crate::Error;

    use super::Period;

    #[test]
    fn week_starts_seven_days_earlier() {
        let start = Period::Week.start(date!(2024 - 03 - 15));

        assert_eq!(start, Some(date!(2024 - 03 - 08)));
    }

    #[test]
    fn month_steps_back_one_calendar_month() {
        let start = Period::Month.start(date!(2024 - 03 - 15));

        assert_eq!(start, Some(date!(2024 - 02 - 15)));
    }

    #[test]
    fn month_clamps_to_the_length_of_the_target_month() {
        let start = Period::Month.start(date!(2024 - 03 - 31));

        assert_eq!(start, Some(date!(2024 - 02 - 29)));
    }

    #[test]
    fn month_crosses_the_year_boundary() {
        let start = Period::Month.start(date!(2024 - 01 - 15));

        assert_eq!(start, Some(date!(2023 - 12 - 15)));
    }

    #[test]
    fn year_steps_back_one_calendar_year() {
        let start = Period::Year.start(date!(2024 - 03 - 15));

        assert_eq!(start, Some(date!(2023 - 03 - 15)));
    }

    #[test]
    fn year_clamps_leap_day() {
        let start = Period::Year.start(date!(2024 - 02 - 29));

        assert_eq!(start, Some(date!(2023 - 02 - 28)));
    }

    #[test]
    fn all_has_no_lower_bound() {
        assert_eq!(Period::All.start(date!(2024 - 03 - 15)), None);
    }

    #[test]
    fn parses_the_four_keywords() {
        assert_eq!(Period::from_str("week"), Ok(Period::Week));
        assert_eq!(Period::from_str("month"), Ok(Period::Month));
        assert_eq!(Period::from_str("year"), Ok(Period::Year));
        assert_eq!(Period::from_str("all"), Ok(Period::All));
    }

    #[test]
    fn rejects_unknown_keywords() {
        assert_eq!(
            Period::from_str("fortnight"),
            Err(Error::InvalidPeriod("fortnight".to_string()))
        );
    }
}
