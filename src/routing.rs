//! Application router configuration for the JSON API.

use axum::{
    Router, middleware,
    routing::{delete, get},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    analytics::{
        get_budget_status_endpoint, get_category_stats_endpoint, get_insights_endpoint,
        get_monthly_trend_endpoint, get_summary_endpoint,
    },
    budget::{get_budgets_endpoint, set_budget_endpoint},
    category::{create_category_endpoint, get_categories_endpoint},
    endpoints,
    expense::{create_expense_endpoint, delete_expense_endpoint, get_expenses_endpoint},
    logging::logging_middleware,
};

/// Return a router with all the app's routes.
///
/// CORS is left permissive: the API serves a presentation layer hosted on a
/// different origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSE, delete(delete_expense_endpoint))
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(set_budget_endpoint),
        )
        .route(endpoints::BUDGET_STATUS, get(get_budget_status_endpoint))
        .route(
            endpoints::STATS_BY_CATEGORY,
            get(get_category_stats_endpoint),
        )
        .route(
            endpoints::STATS_MONTHLY_TREND,
            get(get_monthly_trend_endpoint),
        )
        .route(endpoints::STATS_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::STATS_INSIGHTS, get(get_insights_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
