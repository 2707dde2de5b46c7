//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

const LOG_BODY_LENGTH_LIMIT: usize = 64;
const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with bodies
/// cut to [LOG_BODY_LENGTH_LIMIT] bytes. Longer bodies are logged in full at
/// the `debug` level. Password fields in submitted forms are always redacted
/// and multipart uploads are not logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Some(body_bytes) = read_body(body, "request").await else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let body_text = loggable_body(&parts.headers, &body_bytes);
    log_message(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &body_text,
    );

    let response = next
        .run(Request::from_parts(parts, Body::from(body_bytes)))
        .await;

    let (parts, body) = response.into_parts();
    let Some(body_bytes) = read_body(body, "response").await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let body_text = loggable_body(&parts.headers, &body_bytes);
    log_message(&format!("Sending response: {}", parts.status), &body_text);

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body, direction: &str) -> Option<Bytes> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("Could not read {direction} body: {error}"))
        .ok()
}

fn loggable_body(headers: &HeaderMap, body: &[u8]) -> String {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        return format!("<{} bytes of multipart data>", body.len());
    }

    let text = String::from_utf8_lossy(body);

    if content_type.starts_with("application/x-www-form-urlencoded") {
        redact_passwords(&text)
    } else {
        text.into_owned()
    }
}

/// Replace the value of every form field whose name contains "password".
fn redact_passwords(form_text: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name.contains("password") => format!("{name}={REDACTED}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_message(message: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{message}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body for \"{message}\": {body:?}");
    } else {
        tracing::info!("{message}\nbody: {body:?}");
    }
}
