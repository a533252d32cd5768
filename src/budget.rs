//! This file defines the `Budget` type and the API routes for assigning
//! monthly spending limits to categories.
//!
//! A category has at most one active limit; setting a new value replaces the
//! prior one and no history is kept.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, category::CategoryId};

/// A monthly spending limit assigned to a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The id of the category the limit applies to.
    pub category: CategoryId,
    /// The monthly limit, always finite and non-negative.
    pub amount: f64,
}

/// The data needed to assign a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewBudget {
    /// The id of the category the limit applies to.
    pub category: String,
    /// The monthly limit.
    pub amount: f64,
}

/// The state needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetEndpointState {
    /// The database connection for reading and assigning budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all budget assignments.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetEndpointState>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_budgets(&connection).map(Json)
}

/// A route handler for assigning a budget to a category, replacing any
/// existing limit.
pub async fn set_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Json(new_budget): Json<NewBudget>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = set_budget(new_budget, &connection)
        .inspect_err(|error| tracing::debug!("could not set budget: {error}"))?;

    Ok((StatusCode::CREATED, Json(budget)).into_response())
}

/// Assign a budget to a category in the database, replacing any existing
/// limit for that category.
///
/// # Errors
/// This function will return an error if the amount is negative or
/// non-finite, if the category id is empty, or if there is an SQL error.
pub fn set_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    if !new_budget.amount.is_finite() || new_budget.amount < 0.0 {
        return Err(Error::InvalidAmount(new_budget.amount));
    }

    let category = CategoryId::new(&new_budget.category)?;

    connection.execute(
        "INSERT INTO budget (category_id, amount) VALUES (?1, ?2)
         ON CONFLICT(category_id) DO UPDATE SET amount = excluded.amount;",
        (category.as_ref(), new_budget.amount),
    )?;

    Ok(Budget {
        category,
        amount: new_budget.amount,
    })
}

/// Retrieve all budget assignments from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare("SELECT category_id, amount FROM budget ORDER BY category_id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

pub(crate) fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            category_id TEXT PRIMARY KEY,
            amount REAL NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_category: String = row.get(0)?;

    Ok(Budget {
        category: CategoryId::new_unchecked(&raw_category),
        amount: row.get(1)?,
    })
}
