//! Authentication middleware that validates cookies and extends sessions.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::cookie::{
        COOKIE_EXPIRY, extend_auth_cookie_duration_if_needed, extract_date_time,
        get_user_id_from_auth_cookie,
    },
    user::UserId,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid authorization cookie.
/// The user ID is placed into the request and then the request executed normally if the cookie
/// is valid, otherwise a `401 {"error": "unauthorized"}` response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserId>` to receive the user ID.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}.");
            return Error::Unauthorized.into_response();
        }
    };

    let user_id = match validate_session(&jar) {
        Ok(user_id) => user_id,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Check that the cookie jar holds an unexpired session and return its user ID.
fn validate_session(jar: &PrivateCookieJar) -> Result<UserId, Error> {
    let user_id = get_user_id_from_auth_cookie(jar)?;

    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::Unauthorized)?;
    let expiry = extract_date_time(&expiry_cookie).map_err(|_| Error::Unauthorized)?;

    if expiry < OffsetDateTime::now_utc() {
        return Err(Error::Unauthorized);
    }

    Ok(user_id)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Json, Router,
        extract::State,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            AuthState, auth_guard,
            cookie::{COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        },
        user::UserId,
    };

    async fn test_handler(Extension(user_id): Extension<UserId>) -> Json<serde_json::Value> {
        Json(serde_json::json!({ "user_id": user_id.as_i64() }))
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserId::new(1), state.cookie_duration)
            .map_err(|error| Error::InvalidDateFormat(error.to_string(), "now".to_owned()))
    }

    const TEST_LOG_IN_ROUTE: &str = "/log_in";
    const TEST_PROTECTED_ROUTE: &str = "/api/protected";

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(state.clone());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_LOG_IN_ROUTE).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_USER_ID);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "user_id": 1 }));
    }

    #[tokio::test]
    async fn auth_guard_extends_valid_cookie_duration() {
        let server = get_test_server(Duration::seconds(5));
        let response = server.post(TEST_LOG_IN_ROUTE).await;

        response.assert_status_ok();
        let response_time = OffsetDateTime::now_utc();
        let jar = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        let auth_cookie = response.cookie(COOKIE_USER_ID);
        let got_expiry = auth_cookie.expires_datetime().unwrap();
        let want_expiry = response_time + Duration::seconds(5);
        assert!(
            (got_expiry - want_expiry).abs() < Duration::seconds(1),
            "got expiry {got_expiry:?}, want {want_expiry:?}"
        );
    }

    #[tokio::test]
    async fn get_protected_route_with_no_auth_cookie_returns_unauthorized() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_unauthorized();
        response.assert_json(&serde_json::json!({ "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_auth_cookie_returns_unauthorized() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_USER_ID, "FOOBAR")).build())
            .await;

        response.assert_status_unauthorized();
        response.assert_json(&serde_json::json!({ "error": "unauthorized" }));
    }
}
