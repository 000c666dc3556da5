//! Defines functions for handling user authentication with cookies.

use std::{cmp::max, num::ParseIntError};

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{Error, user::UserId};

pub(crate) const COOKIE_USER_ID: &str = "user_id";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";
/// The default duration for which auth cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
///
/// Returns a [time::error::Format] if the expiry time cannot be formatted.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserId,
    duration: Duration,
) -> Result<PrivateCookieJar, time::error::Format> {
    let expiry = OffsetDateTime::now_utc() + duration;
    // Use format instead of to_string to avoid errors at midnight when the hour is printed as
    // a single digit when [DATE_TIME_FORMAT] expects two digits.
    let expiry_string = expiry.format(DATE_TIME_FORMAT)?;

    Ok(jar
        .add(
            Cookie::build((COOKIE_USER_ID, user_id.as_i64().to_string()))
                .expires(expiry)
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        )
        .add(
            Cookie::build((COOKIE_EXPIRY, expiry_string))
                .expires(expiry)
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_USER_ID, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
    .add(
        Cookie::build((COOKIE_EXPIRY, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now
/// plus `duration` and the cookie's expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] if the auth cookie or expiry cookie are not in the cookie jar.
/// - [Error::InvalidDateFormat] if the stored expiry cannot be parsed, if
///   extending the cookie by `duration` would overflow the date time, or if
///   the new expiry date time cannot be formatted.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;
    let current_expiry = extract_date_time(&expiry_cookie).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), expiry_cookie.value_trimmed().to_owned())
    })?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| {
            Error::InvalidDateFormat("date time overflow".to_owned(), duration.to_string())
        })?;

    let expiry = max(current_expiry, new_expiry);

    set_auth_cookie_expiry(jar, expiry)
}

/// Sets the expires field of the auth cookie and the expires field and
/// value of the expiry cookie in `jar` to `expiry`.
///
/// # Errors
///
/// If an error is returned, the cookie jar is not modified.
///
/// Returns a:
/// - [Error::CookieMissing] if the auth cookie or expiry cookie are not in the cookie jar.
/// - [Error::InvalidDateFormat] if the new expiry date time cannot be formatted.
pub(crate) fn set_auth_cookie_expiry(
    jar: PrivateCookieJar,
    expiry: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    let mut auth_cookie = jar.get(COOKIE_USER_ID).ok_or(Error::CookieMissing)?;
    let mut expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    auth_cookie.set_expires(expiry);
    expiry_cookie.set_expires(expiry);
    expiry_cookie.set_value(expiry_string);

    Ok(jar.add(auth_cookie).add(expiry_cookie))
}

/// Read the logged-in user's ID from the auth cookie.
pub(crate) fn get_user_id_from_auth_cookie(jar: &PrivateCookieJar) -> Result<UserId, Error> {
    match jar.get(COOKIE_USER_ID) {
        Some(user_id_cookie) => {
            extract_user_id(&user_id_cookie).map_err(|_| Error::Unauthorized)
        }
        _ => Err(Error::Unauthorized),
    }
}

/// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

pub(crate) fn extract_date_time(cookie: &Cookie) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT)
}

pub(crate) fn extract_user_id(cookie: &Cookie) -> Result<UserId, ParseIntError> {
    let id: i64 = cookie.value_trimmed().parse()?;

    Ok(UserId::new(id))
}
