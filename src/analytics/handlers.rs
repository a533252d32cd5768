//! HTTP handlers for the statistics endpoints.
//!
//! Each handler fetches an in-memory snapshot of the record store, derives
//! "today" from the configured timezone, runs the pure engine functions over
//! the snapshot, and serves the result as JSON. The engine itself performs
//! no I/O and holds no state between requests.

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    budget::get_all_budgets,
    category::{Category, CategoryId, get_all_categories},
    expense::{Expense, get_all_expenses},
    timezone::local_today,
};

use super::{
    aggregation::{
        CategoryTotal, TrendPoint, aggregate_by_category, average_daily_spend, monthly_trend,
        total_spent,
    },
    budget_status::{BudgetBand, budget_status},
    filter::{CategoryFilter, Period, filtered_view},
    insights::{Insight, generate_insights},
};

/// The display name served for a dangling category reference.
const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// The display icon served for a dangling category reference.
const UNKNOWN_CATEGORY_ICON: &str = "📦";

/// The state needed for the statistics endpoints.
#[derive(Debug, Clone)]
pub struct StatsState {
    /// The database connection the snapshot is read from.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The filter selection accepted by the statistics endpoints.
///
/// Both filters are optional and default to the view the dashboard opens
/// with: the last calendar month across all categories.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// One of "week", "month", "year" or "all".
    pub period: Option<String>,
    /// A category id, or "all" for no category filter.
    pub category: Option<String>,
}

impl StatsQuery {
    fn parse(&self) -> Result<(Period, CategoryFilter), Error> {
        let period = match self.period.as_deref() {
            Some(keyword) => Period::from_str(keyword)?,
            None => Period::default(),
        };

        let category = match self.category.as_deref() {
            Some(keyword) => CategoryFilter::from_str(keyword)?,
            None => CategoryFilter::default(),
        };

        Ok((period, category))
    }
}

/// The headline numbers for the filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// The sum of amounts in the filtered view.
    pub total: f64,
    /// The average daily spend over the filtered period.
    pub average_daily: f64,
    /// The number of expenses in the filtered view.
    pub expense_count: usize,
    /// The number of categories with a positive aggregate.
    pub active_categories: usize,
}

/// A budgeted category's utilization, with its display data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatusEntry {
    /// The id of the budgeted category.
    pub category: CategoryId,
    /// The display name of the category, or a placeholder for a dangling
    /// reference.
    pub name: String,
    /// The display icon of the category, or a placeholder for a dangling
    /// reference.
    pub icon: String,
    /// The assigned monthly limit.
    pub limit: f64,
    /// The amount spent in the filtered view.
    pub spent: f64,
    /// The percentage of the limit consumed, always finite.
    pub percentage: f64,
    /// The display band for the percentage.
    pub band: BudgetBand,
}

/// A route handler for per-category totals over the filtered view.
pub async fn get_category_stats_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let (period, category) = query.parse()?;
    let today = local_today(&state.local_timezone)?;
    let snapshot = fetch_snapshot(&state)?;

    let view = filtered_view(&snapshot.expenses, &category, period, today);

    Ok(Json(aggregate_by_category(&view, &snapshot.categories)))
}

/// A route handler for the month-keyed trend series over full history.
pub async fn get_monthly_trend_endpoint(
    State(state): State<StatsState>,
) -> Result<Json<Vec<TrendPoint>>, Error> {
    let snapshot = fetch_snapshot(&state)?;

    Ok(Json(monthly_trend(&snapshot.expenses)))
}

/// A route handler for the summary statistics of the filtered view.
pub async fn get_summary_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<SummaryStats>, Error> {
    let (period, category) = query.parse()?;
    let today = local_today(&state.local_timezone)?;
    let snapshot = fetch_snapshot(&state)?;

    let view = filtered_view(&snapshot.expenses, &category, period, today);

    Ok(Json(SummaryStats {
        total: total_spent(&view),
        average_daily: average_daily_spend(&view, period),
        expense_count: view.len(),
        active_categories: aggregate_by_category(&view, &snapshot.categories).len(),
    }))
}

/// A route handler for the heuristic insight records over the filtered view.
pub async fn get_insights_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Vec<Insight>>, Error> {
    let (period, category) = query.parse()?;
    let today = local_today(&state.local_timezone)?;
    let snapshot = fetch_snapshot(&state)?;

    let view = filtered_view(&snapshot.expenses, &category, period, today);
    let insights =
        generate_insights(&snapshot.expenses, &view, &snapshot.categories, period).collect();

    Ok(Json(insights))
}

/// A route handler for the utilization of every budgeted category over the
/// filtered view.
pub async fn get_budget_status_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Vec<BudgetStatusEntry>>, Error> {
    let (period, category) = query.parse()?;
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_all_expenses(&connection)?;
    let categories = get_all_categories(&connection)?;
    let assignments = get_all_budgets(&connection)?;
    drop(connection);

    let budgets: HashMap<CategoryId, f64> = assignments
        .iter()
        .map(|assignment| (assignment.category.clone(), assignment.amount))
        .collect();

    let view = filtered_view(&expenses, &category, period, today);

    let entries = assignments
        .into_iter()
        .filter_map(|assignment| {
            let status = budget_status(&assignment.category, &view, &budgets)?;
            let category_data = categories
                .iter()
                .find(|category| category.id == assignment.category);

            Some(BudgetStatusEntry {
                name: category_data
                    .map_or(UNKNOWN_CATEGORY_NAME.to_string(), |c| c.name.clone()),
                icon: category_data
                    .map_or(UNKNOWN_CATEGORY_ICON.to_string(), |c| c.icon.clone()),
                category: assignment.category,
                limit: status.limit,
                spent: status.spent,
                band: status.band(),
                percentage: status.percentage,
            })
        })
        .collect();

    Ok(Json(entries))
}

/// An in-memory snapshot of the record store for the analytics engine.
struct Snapshot {
    expenses: Vec<Expense>,
    categories: Vec<Category>,
}

fn fetch_snapshot(state: &StatsState) -> Result<Snapshot, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Snapshot {
        expenses: get_all_expenses(&connection)?,
        categories: get_all_categories(&connection)?,
    })
}
