//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged in full at the `debug` level. Password fields in
/// JSON request bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_json = headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"));

    if is_json {
        let display_text = redact_password(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the value of the JSON string field `field_name` with asterisks.
fn redact_password(body_text: &str, field_name: &str) -> String {
    let field_marker = format!("\"{field_name}\"");

    let Some(field_pos) = body_text.find(&field_marker) else {
        return body_text.to_string();
    };

    let value_search_start = field_pos + field_marker.len();
    let Some(colon_offset) = body_text[value_search_start..].find(':') else {
        return body_text.to_string();
    };
    let Some(open_quote_offset) = body_text[value_search_start + colon_offset..].find('"') else {
        return body_text.to_string();
    };

    let value_start = value_search_start + colon_offset + open_quote_offset + 1;
    let mut value_end = value_start;
    let bytes = body_text.as_bytes();
    while value_end < bytes.len() {
        if bytes[value_end] == b'"' && bytes[value_end - 1] != b'\\' {
            break;
        }
        value_end += 1;
    }

    format!(
        "{}********{}",
        &body_text[..value_start],
        &body_text[value_end..]
    )
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redact_password_tests {
    use super::redact_password;

    #[test]
    fn redacts_the_password_value() {
        let body = r#"{"email":"foo@bar.baz","password":"hunter2"}"#;

        let redacted = redact_password(body, "password");

        assert_eq!(redacted, r#"{"email":"foo@bar.baz","password":"********"}"#);
    }

    #[test]
    fn leaves_bodies_without_the_field_unchanged() {
        let body = r#"{"amount":-1250}"#;

        assert_eq!(redact_password(body, "password"), body);
    }

    #[test]
    fn handles_spaces_around_the_colon() {
        let body = r#"{ "password" : "hunter2" }"#;

        let redacted = redact_password(body, "password");

        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("********"));
    }
}
