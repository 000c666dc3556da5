//! Endpoints for reading and updating the current user's profile and
//! budgeting preferences.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    responses::{data_message_response, data_response},
    user::{UserId, UserSettingsUpdate, ViewPeriod, get_user_by_id, update_user_settings},
};

/// The state needed to read or update the current user.
#[derive(Debug, Clone)]
pub struct CurrentUserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CurrentUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the logged-in user.
pub async fn get_current_user_endpoint(
    State(state): State<CurrentUserState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_user_by_id(user_id, &connection) {
        Ok(user) => data_response(StatusCode::OK, user),
        Err(error) => error.into_response(),
    }
}

/// The request body for updating the current user's settings.
///
/// `period_start_date` carries the period anchor day as a string: a
/// day-of-month (1-28) for the monthly view or a day-of-week
/// (0=Sunday..6=Saturday) for the weekly and biweekly views.
#[derive(Debug, Deserialize)]
pub struct UpdateUserData {
    pub name: Option<String>,
    pub view_period: Option<String>,
    pub period_start_date: Option<String>,
}

/// A route handler for updating the logged-in user's settings.
pub async fn update_user_endpoint(
    State(state): State<CurrentUserState>,
    Extension(user_id): Extension<UserId>,
    Json(update): Json<UpdateUserData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let current_user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    let view_period = match &update.view_period {
        Some(raw_view_period) => match ViewPeriod::parse(raw_view_period) {
            Ok(view_period) => Some(view_period),
            Err(error) => return error.into_response(),
        },
        None => None,
    };

    let effective_view_period = view_period.unwrap_or(current_user.view_period);
    let period_anchor_day = match &update.period_start_date {
        Some(raw_anchor) => {
            match parse_period_anchor_day(raw_anchor, effective_view_period) {
                Ok(anchor_day) => Some(anchor_day),
                Err(error) => return error.into_response(),
            }
        }
        None => None,
    };

    let changes = UserSettingsUpdate {
        name: update.name,
        view_period,
        period_anchor_day,
    };

    match update_user_settings(user_id, &changes, &connection) {
        Ok(user) => data_message_response(StatusCode::OK, user, "Settings updated successfully"),
        Err(error) => error.into_response(),
    }
}

/// Parse and range-check a period anchor day for the given view period.
///
/// # Errors
/// Returns [Error::InvalidPeriodAnchor] if `raw_anchor` is not an integer or
/// is outside the valid range: 1-28 for monthly, 0-6 for weekly/biweekly.
fn parse_period_anchor_day(raw_anchor: &str, view_period: ViewPeriod) -> Result<u8, Error> {
    let anchor_day: u8 = raw_anchor.parse().map_err(|_| Error::InvalidPeriodAnchor)?;

    let valid = match view_period {
        ViewPeriod::Monthly => (1..=28).contains(&anchor_day),
        ViewPeriod::Weekly | ViewPeriod::Biweekly => anchor_day <= 6,
    };

    if !valid {
        return Err(Error::InvalidPeriodAnchor);
    }

    Ok(anchor_day)
}

#[cfg(test)]
mod parse_period_anchor_day_tests {
    use crate::{Error, user::ViewPeriod};

    use super::parse_period_anchor_day;

    #[test]
    fn monthly_anchor_must_be_within_the_short_month() {
        assert_eq!(parse_period_anchor_day("1", ViewPeriod::Monthly), Ok(1));
        assert_eq!(parse_period_anchor_day("28", ViewPeriod::Monthly), Ok(28));
        assert_eq!(
            parse_period_anchor_day("0", ViewPeriod::Monthly),
            Err(Error::InvalidPeriodAnchor)
        );
        assert_eq!(
            parse_period_anchor_day("29", ViewPeriod::Monthly),
            Err(Error::InvalidPeriodAnchor)
        );
    }

    #[test]
    fn weekly_anchor_is_a_day_of_week() {
        assert_eq!(parse_period_anchor_day("0", ViewPeriod::Weekly), Ok(0));
        assert_eq!(parse_period_anchor_day("6", ViewPeriod::Biweekly), Ok(6));
        assert_eq!(
            parse_period_anchor_day("7", ViewPeriod::Weekly),
            Err(Error::InvalidPeriodAnchor)
        );
    }

    #[test]
    fn non_numeric_anchor_is_rejected() {
        assert_eq!(
            parse_period_anchor_day("monday", ViewPeriod::Weekly),
            Err(Error::InvalidPeriodAnchor)
        );
    }
}
