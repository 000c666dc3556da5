//! The endpoint for logging out the current user.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::cookie::invalidate_auth_cookie, responses::message_response};

/// Invalidate the auth cookie so that the client forgets the session.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        message_response(StatusCode::OK, "Logged out successfully"),
    )
        .into_response()
}
