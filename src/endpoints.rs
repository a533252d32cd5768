//! The API endpoint URIs.

use crate::expense::ExpenseId;

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to list and assign budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route for per-category budget utilization.
pub const BUDGET_STATUS: &str = "/api/budgets/status";
/// The route for per-category spending totals over the filtered view.
pub const STATS_BY_CATEGORY: &str = "/api/stats/by-category";
/// The route for the month-keyed trend series over full history.
pub const STATS_MONTHLY_TREND: &str = "/api/stats/monthly-trend";
/// The route for the summary statistics of the filtered view.
pub const STATS_SUMMARY: &str = "/api/stats/summary";
/// The route for the heuristic insight records.
pub const STATS_INSIGHTS: &str = "/api/stats/insights";

/// The path for deleting the expense with `expense_id`.
pub fn expense_path(expense_id: ExpenseId) -> String {
    EXPENSE.replace("{expense_id}", &expense_id.to_string())
}

// These tests are here so that we know the routes will parse as URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::expense_path;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_STATUS);
        assert_endpoint_is_valid_uri(endpoints::STATS_BY_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::STATS_MONTHLY_TREND);
        assert_endpoint_is_valid_uri(endpoints::STATS_SUMMARY);
        assert_endpoint_is_valid_uri(endpoints::STATS_INSIGHTS);
    }

    #[test]
    fn expense_path_replaces_the_parameter() {
        let path = expense_path(42);

        assert_eq!(path, "/api/expenses/42");
        assert!(path.parse::<Uri>().is_ok());
    }
}
