//! Folda Finances is a web app for managing a shared household budget.
//!
//! This library provides a JSON REST API for tracking accounts, transactions,
//! per-category monthly budgets, and a derived "what can I spend?" report.
//! Multiple users can share a budget with role-based membership and
//! invitations.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

pub mod account;
mod app_state;
mod auth;
pub mod budget;
pub mod category;
pub mod category_budget;
pub mod database_id;
pub mod db;
pub mod endpoints;
pub mod income;
pub mod invitation;
mod logging;
pub mod pagination;
pub mod password;
mod responses;
mod routing;
pub mod spending;
mod timezone;
pub mod transaction;
pub mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserId, get_user_by_id};

use crate::responses::error_body;

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
    /// The request had no valid auth cookie.
    #[error("unauthorized")]
    Unauthorized,

    /// The user provided an invalid email and password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource exists but belongs to a different budget.
    #[error("access denied")]
    AccessDenied,

    /// The operation requires the user to be a member of a budget.
    #[error("user does not belong to a budget")]
    NoBudget,

    /// The email used to register already belongs to a user.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// A required request field was missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The view period was not one of weekly, biweekly, or monthly.
    #[error("invalid view_period")]
    InvalidViewPeriod,

    /// The period anchor day was not a valid day-of-month or day-of-week.
    #[error("invalid period_start_date")]
    InvalidPeriodAnchor,

    /// The account type was not one of the supported kinds.
    #[error("invalid account type")]
    InvalidAccountKind,

    /// The invitation role was not read_only or read_write.
    #[error("invalid role")]
    InvalidRole,

    /// A category budget amount was negative.
    ///
    /// Category budgets always store the monthly amount in cents, and that
    /// amount must be zero or greater.
    #[error("budget amount must not be negative")]
    NegativeBudgetAmount,

    /// A split named neither or both of an allocation amount and percentage.
    #[error("each split must have exactly one of allocation_amount or allocation_percentage")]
    InvalidAllocation,

    /// A split referenced a user outside the category budget's budget.
    #[error("all users must belong to the same budget")]
    SplitUserOutsideBudget,

    /// A pending invitation already exists for the invitee.
    #[error("invitation already exists for this email")]
    DuplicateInvitation,

    /// The invitee is already a member of the budget.
    #[error("user already has access to this budget")]
    AlreadyMember,

    /// The invitation was already accepted or declined.
    #[error("invitation has already been processed")]
    InvitationProcessed,

    /// The invitation's expiry date has passed.
    #[error("invitation has expired")]
    InvitationExpired,

    /// The invitation was addressed to a different email.
    #[error("this invitation is for a different email address")]
    InvitationEmailMismatch,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::InvalidCredentials | Error::CookieMissing => {
                StatusCode::UNAUTHORIZED
            }
            Error::AccessDenied | Error::InvitationEmailMismatch => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail | Error::DuplicateInvitation | Error::AlreadyMember => {
                StatusCode::CONFLICT
            }
            Error::TooWeak(_)
            | Error::NoBudget
            | Error::MissingField(_)
            | Error::InvalidViewPeriod
            | Error::InvalidPeriodAnchor
            | Error::InvalidAccountKind
            | Error::InvalidRole
            | Error::NegativeBudgetAmount
            | Error::InvalidAllocation
            | Error::SplitUserOutsideBudget
            | Error::InvitationProcessed
            | Error::InvitationExpired => StatusCode::BAD_REQUEST,
            Error::InvalidDateFormat(_, _)
            | Error::HashingError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are logged on the server and not shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            return error_body(status_code, "internal server error");
        }

        error_body(status_code, &self.to_string())
    }
}
