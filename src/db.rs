//! Database initialization for the spending tracker.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    budget::create_budget_table,
    category::{create_category_table, seed_default_categories},
    expense::create_expense_table,
};

/// Create the application tables and seed the default categories.
///
/// Table creation and seeding happen inside a single exclusive transaction,
/// so a partially initialized database is never observable.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
