//! The expense analytics engine.
//!
//! Turns a snapshot of the record store (expenses, categories, budgets) into
//! filtered views, per-category aggregates, the monthly trend series, budget
//! utilization, and structured insight records.
//!
//! Every derivation is a pure, synchronous function of its inputs: the
//! engine holds no state, performs no I/O, and takes its "now" reference as
//! an argument. Edge cases (empty views, missing budgets, dangling category
//! references, zero denominators) all have deterministic fallback values
//! rather than being errors.

mod aggregation;
mod budget_status;
mod filter;
mod handlers;
mod insights;

pub use aggregation::{
    CategoryTotal, TREND_MONTHS, TrendPoint, active_category_count, aggregate_by_category,
    average_daily_spend, monthly_trend, total_spent,
};
pub use budget_status::{
    BudgetBand, BudgetStatus, ZERO_LIMIT_OVERSPEND_PERCENTAGE, budget_status,
};
pub use filter::{CategoryFilter, Period, filter_by_category, filter_by_period, filtered_view};
pub use handlers::{
    BudgetStatusEntry, StatsQuery, StatsState, SummaryStats, get_budget_status_endpoint,
    get_category_stats_endpoint, get_insights_endpoint, get_monthly_trend_endpoint,
    get_summary_endpoint,
};
pub use insights::{
    Insight, dominant_weekday, generate_insights, month_over_month, savings_suggestion,
    top_category,
};
