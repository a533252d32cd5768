//! This file defines the `Category` type, the types needed to create a
//! category and the API routes for the category type.
//! A category is reference data used for grouping and displaying expenses.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

/// The identifier of a category, a non-empty slug such as "food".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category id.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryId] if `id` is an empty string.
    pub fn new(id: &str) -> Result<Self, Error> {
        let id = id.trim();

        if id.is_empty() {
            Err(Error::EmptyCategoryId)
        } else {
            Ok(Self(id.to_string()))
        }
    }

    /// Create a category id without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryId::new(s)
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spending category, e.g., 'Food', 'Transport'.
///
/// Categories are read-only reference data: expenses point at a category id,
/// and the color and icon are display tokens for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,

    /// The display name of the category.
    pub name: String,

    /// The display color of the category as a hex token, e.g. "#FF6B6B".
    pub color: String,

    /// The display icon of the category.
    pub icon: String,
}

/// The categories installed on first run.
const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 8] = [
    ("food", "Food", "#FF6B6B", "🍽️"),
    ("transport", "Transport", "#4ECDC4", "🚗"),
    ("housing", "Housing", "#45B7D1", "🏠"),
    ("health", "Health", "#96CEB4", "⚕️"),
    ("leisure", "Leisure", "#FFEAA7", "🎯"),
    ("shopping", "Shopping", "#DDA0DD", "🛍️"),
    ("education", "Education", "#98D8C8", "📚"),
    ("other", "Other", "#F7DC6F", "📦"),
];

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryEndpointState {
    /// The database connection for reading and creating categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data needed to create a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewCategory {
    /// The id of the new category.
    pub id: String,
    /// The display name of the new category.
    pub name: String,
    /// The display color of the new category.
    pub color: String,
    /// The display icon of the new category.
    pub icon: String,
}

/// A route handler for listing all categories.
pub async fn get_categories_endpoint(
    State(state): State<CategoryEndpointState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_categories(&connection).map(Json)
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryEndpointState>,
    Json(new_category): Json<NewCategory>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(new_category, &connection)
        .inspect_err(|error| tracing::debug!("could not create category: {error}"))?;

    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// Create a category in the database.
///
/// # Errors
/// This function will return an error if the id or name is empty, if the id
/// already exists, or if there is an SQL error.
pub fn create_category(
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let id = CategoryId::new(&new_category.id)?;

    if new_category.name.trim().is_empty() {
        return Err(Error::EmptyCategoryName);
    }

    connection.execute(
        "INSERT INTO category (id, name, color, icon) VALUES (?1, ?2, ?3, ?4);",
        (
            id.as_ref(),
            new_category.name.trim(),
            &new_category.color,
            &new_category.icon,
        ),
    )?;

    Ok(Category {
        id,
        name: new_category.name.trim().to_string(),
        color: new_category.color,
        icon: new_category.icon,
    })
}

/// Retrieve the category with `category_id` from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_category(category_id: &CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, color, icon FROM category WHERE id = :id;")?
        .query_row(&[(":id", category_id.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories from the database in reference order, i.e. the
/// order they were created in.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, color, icon FROM category ORDER BY rowid ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

pub(crate) fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

/// Insert the default categories if the category table is empty.
pub(crate) fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let category_count: i64 =
        connection.query_row("SELECT COUNT(*) FROM category;", [], |row| row.get(0))?;

    if category_count > 0 {
        return Ok(());
    }

    let mut statement = connection
        .prepare("INSERT INTO category (id, name, color, icon) VALUES (?1, ?2, ?3, ?4);")?;

    for (id, name, color, icon) in DEFAULT_CATEGORIES {
        statement.execute((id, name, color, icon))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_id: String = row.get(0)?;

    Ok(Category {
        id: CategoryId::new_unchecked(&raw_id),
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
    })
}


#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            CategoryId, DEFAULT_CATEGORIES, NewCategory, create_category, get_all_categories,
            get_category, seed_default_categories,
        },
    };

    use super::create_category_table;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    fn new_category(id: &str, name: &str) -> NewCategory {
        NewCategory {
            id: id.to_string(),
            name: name.to_string(),
            color: "#FF6B6B".to_string(),
            icon: "🍽️".to_string(),
        }
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();

        let category = create_category(new_category("groceries", "Groceries"), &connection)
            .expect("Could not create category");

        assert_eq!(category.id, CategoryId::new_unchecked("groceries"));
        assert_eq!(category.name, "Groceries");
    }

    #[test]
    fn create_category_with_duplicate_id_fails() {
        let connection = get_test_db_connection();
        create_category(new_category("food", "Food"), &connection)
            .expect("Could not create test category");

        let duplicate = create_category(new_category("food", "Nourriture"), &connection);

        assert_eq!(duplicate, Err(Error::DuplicateCategory));
    }

    #[test]
    fn create_category_with_empty_name_fails() {
        let connection = get_test_db_connection();

        let category = create_category(new_category("food", "  "), &connection);

        assert_eq!(category, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn get_category_succeeds() {
        let connection = get_test_db_connection();
        let inserted = create_category(new_category("food", "Food"), &connection)
            .expect("Could not create test category");

        let selected = get_category(&inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_category_with_unknown_id_returns_not_found() {
        let connection = get_test_db_connection();

        let selected = get_category(&CategoryId::new_unchecked("missing"), &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_all_categories_preserves_insertion_order() {
        let connection = get_test_db_connection();
        create_category(new_category("zebra", "Zebra"), &connection).unwrap();
        create_category(new_category("alpha", "Alpha"), &connection).unwrap();

        let categories = get_all_categories(&connection).expect("Could not get all categories");

        let ids: Vec<&str> = categories
            .iter()
            .map(|category| category.id.as_ref())
            .collect();
        assert_eq!(ids, vec!["zebra", "alpha"]);
    }

    #[test]
    fn seed_installs_default_categories_once() {
        let connection = get_test_db_connection();

        seed_default_categories(&connection).expect("Could not seed categories");
        seed_default_categories(&connection).expect("Could not seed categories twice");

        let categories = get_all_categories(&connection).expect("Could not get all categories");
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(categories[0].id, CategoryId::new_unchecked("food"));
    }

    #[test]
    fn seed_leaves_existing_categories_alone() {
        let connection = get_test_db_connection();
        create_category(new_category("custom", "Custom"), &connection).unwrap();

        seed_default_categories(&connection).expect("Could not seed categories");

        let categories = get_all_categories(&connection).expect("Could not get all categories");
        assert_eq!(categories.len(), 1);
    }
}
