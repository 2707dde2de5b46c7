//! Where to send the user after they log in.
//!
//! Only same-site paths are accepted so the log-in form cannot be used as an
//! open redirect.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

const REDIRECT_PARAM: &str = "redirect_url";

fn is_safe_path(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// Return the path and query of `raw_url` if it is a safe, relative redirect target.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_path(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL with `target` as the page to return to.
pub fn log_in_url_with_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([(REDIRECT_PARAM, target)])
        .inspect_err(|error| tracing::error!("Could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|param| format!("{}?{param}", endpoints::LOG_IN_VIEW))
}

/// The log-in URL that returns the user to the page behind `request`.
///
/// HTMX requests to `/api` routes come from a page, so the page in the
/// `HX-Current-URL` header is used instead of the API route.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_page(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    log_in_url_with_target(&target)
}

fn hx_current_page(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    // HX-Current-URL is absolute, so keep only the path and query.
    let path_and_query = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_owned()))
        .filter(|path_and_query| is_safe_path(path_and_query));

    if path_and_query.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    path_and_query
}
