//! Expense management for the spending tracker.
//!
//! This module contains everything related to expense records:
//! - The `Expense` model and the validation applied when recording one
//! - Database functions for storing, querying, and deleting expenses
//! - The API route handlers for the expense endpoints

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Row, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    category::CategoryId,
};

/// Alias for the integer type used for expense IDs.
pub type ExpenseId = i64;

/// A recorded discretionary expense.
///
/// Expenses are never edited in place: an edit is modeled as a delete
/// followed by a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount of money spent, always finite and non-negative.
    pub amount: f64,
    /// A text description of what the expense was for.
    pub description: String,
    /// The ID of the category this expense belongs to.
    ///
    /// This may refer to a category that no longer exists; readers treat the
    /// category display data as absent in that case.
    pub category: CategoryId,
    /// When the expense happened.
    pub date: Date,
}

/// The data needed to record an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    /// The amount of money spent.
    pub amount: f64,
    /// A text description of what the expense was for.
    pub description: String,
    /// The id of the category the expense belongs to.
    pub category: String,
    /// When the expense happened.
    pub date: Date,
}

/// The state needed for the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseEndpointState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The optional filters accepted by the expense listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    /// A category id, or "all" for no category filter.
    pub category: Option<String>,
    /// The inclusive earliest date to include.
    pub start_date: Option<Date>,
    /// The inclusive latest date to include.
    pub end_date: Option<Date>,
}

/// A route handler for listing expenses, newest date first.
pub async fn get_expenses_endpoint(
    State(state): State<ExpenseEndpointState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<Expense>>, Error> {
    let category = match query.category.as_deref() {
        None | Some("all") => None,
        Some(id) => Some(CategoryId::new(id)?),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_expenses(
        category.as_ref(),
        query.start_date,
        query.end_date,
        &connection,
    )
    .map(Json)
}

/// A route handler for recording a new expense.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Json(new_expense): Json<NewExpense>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = create_expense(new_expense, &connection)
        .inspect_err(|error| tracing::debug!("could not create expense: {error}"))?;

    Ok((StatusCode::CREATED, Json(expense)).into_response())
}

/// A route handler for deleting an expense.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<ExpenseEndpointState>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_expense(expense_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Record an expense in the database.
///
/// The category id is not checked against the category table: expenses with
/// a dangling category reference are permitted and handled leniently by
/// readers.
///
/// # Errors
/// This function will return an error if the amount is negative or
/// non-finite, if the description or category id is empty, or if there is an
/// SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    if !new_expense.amount.is_finite() || new_expense.amount < 0.0 {
        return Err(Error::InvalidAmount(new_expense.amount));
    }

    let description = new_expense.description.trim();
    if description.is_empty() {
        return Err(Error::EmptyDescription);
    }

    let category = CategoryId::new(&new_expense.category)?;

    connection
        .prepare(
            "INSERT INTO expense (amount, description, category_id, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, amount, description, category_id, date",
        )?
        .query_row(
            (
                new_expense.amount,
                description,
                category.as_ref(),
                new_expense.date,
            ),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all expenses from the database, newest date first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    get_expenses(None, None, None, connection)
}

/// Retrieve expenses matching the given filters, newest date first.
///
/// All filters are optional; `None` matches every expense. The date bounds
/// are inclusive.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_expenses(
    category: Option<&CategoryId>,
    start_date: Option<Date>,
    end_date: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let mut query_parts =
        vec!["SELECT id, amount, description, category_id, date FROM expense".to_string()];
    let mut conditions: Vec<String> = Vec::new();
    let mut parameters: Vec<Value> = Vec::new();

    if let Some(category) = category {
        parameters.push(Value::Text(category.as_ref().to_string()));
        conditions.push(format!("category_id = ?{}", parameters.len()));
    }

    if let Some(start_date) = start_date {
        parameters.push(Value::Text(start_date.to_string()));
        conditions.push(format!("date >= ?{}", parameters.len()));
    }

    if let Some(end_date) = end_date {
        parameters.push(Value::Text(end_date.to_string()));
        conditions.push(format!("date <= ?{}", parameters.len()));
    }

    if !conditions.is_empty() {
        query_parts.push(format!("WHERE {}", conditions.join(" AND ")));
    }

    query_parts.push("ORDER BY date DESC, id DESC".to_string());

    connection
        .prepare(&query_parts.join(" "))?
        .query_map(params_from_iter(parameters), map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Delete an expense from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the expense doesn't exist.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

pub(crate) fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            category_id TEXT NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category: String = row.get(3)?;

    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        category: CategoryId::new_unchecked(&raw_category),
        date: row.get(4)?,
    })
}
