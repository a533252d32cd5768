//! Depensier is a web service for tracking discretionary spending.
//!
//! This library provides a JSON REST API over a SQLite record store
//! (expenses, categories, monthly budgets) and a pure analytics engine that
//! derives filtered views, per-category aggregates, trend series, budget
//! utilization, and heuristic insights for a separate presentation layer.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub mod analytics;
mod app_state;
pub mod budget;
pub mod category;
mod db;
pub mod endpoints;
pub mod expense;
mod logging;
mod routing;
mod timezone;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category id.
    #[error("category id cannot be empty")]
    EmptyCategoryId,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used as an expense description.
    #[error("expense description cannot be empty")]
    EmptyDescription,

    /// A non-finite or negative amount was used to create an expense or
    /// budget.
    #[error("{0} is not a valid amount, expected a finite, non-negative number")]
    InvalidAmount(f64),

    /// An unknown keyword was used to select the period filter.
    #[error("unknown period \"{0}\", expected one of \"week\", \"month\", \"year\" or \"all\"")]
    InvalidPeriod(String),

    /// The category id used to create a category already exists in the
    /// database.
    #[error("the category id already exists in the database")]
    DuplicateCategory,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete an expense that does not exist.
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Codes 1555 and 2067 occur when a PRIMARY KEY or UNIQUE
            // constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if (sql_error.extended_code == 1555 || sql_error.extended_code == 2067)
                    && desc.contains("category.id") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match self {
            Error::EmptyCategoryId
            | Error::EmptyCategoryName
            | Error::EmptyDescription
            | Error::InvalidAmount(_)
            | Error::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategory => StatusCode::CONFLICT,
            Error::NotFound | Error::DeleteMissingExpense => StatusCode::NOT_FOUND,
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            ref error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response();
            }
        };

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
