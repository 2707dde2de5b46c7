//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    alert::Alert, endpoints, html::error_view, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Input was malformed or out of range.
    ///
    /// The string describes which field was invalid and why.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The resource exists but belongs to another user.
    #[error("the resource belongs to another user")]
    PermissionDenied,

    /// The request did not carry a valid session.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The request conflicts with the current state of a resource.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

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

    /// The username is already taken.
    #[error("the username already exists in the database")]
    DuplicateUsername,

    /// The email is already registered.
    #[error("the email already exists in the database")]
    DuplicateEmail,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded avatar has a disallowed extension or is too large.
    #[error("invalid avatar: {0}")]
    InvalidAvatar(String),

    /// A file could not be written to or read from disk.
    #[error("file error: {0}")]
    FileError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
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

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::AuthenticationRequired => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
            Error::PermissionDenied => (
                StatusCode::FORBIDDEN,
                error_view(
                    "Forbidden",
                    "403",
                    "You do not have access to this resource.",
                    "Check that the link is correct and that you are logged in as the right user.",
                ),
            )
                .into_response(),
            Error::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                error_view("Bad Request", "400", "Invalid input.", &reason),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: reason,
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::PermissionDenied => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Permission denied".to_owned(),
                    details: "You can only change items that belong to you.".to_owned(),
                },
            ),
            Error::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Not logged in".to_owned(),
                    details: "Your session has expired. Log in again and retry.".to_owned(),
                },
            ),
            Error::Conflict(reason) => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Conflict".to_owned(),
                    details: reason,
                },
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Invalid username or password".to_owned(),
                    details: "Check your username and password and try again.".to_owned(),
                },
            ),
            Error::TooWeak(feedback) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Password is too weak".to_owned(),
                    details: feedback,
                },
            ),
            Error::DuplicateUsername => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Username taken".to_owned(),
                    details: "That username is already in use. Choose a different username."
                        .to_owned(),
                },
            ),
            Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Email already registered".to_owned(),
                    details: "An account with that email already exists. \
                    Log in instead, or use a different email address."
                        .to_owned(),
                },
            ),
            Error::InvalidAvatar(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid avatar".to_owned(),
                    details: reason,
                },
            ),
            Error::MultipartError(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the form".to_owned(),
                    details: reason,
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use super::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn unique_username_maps_to_duplicate_username() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE user (username TEXT UNIQUE NOT NULL)", ())
            .unwrap();
        connection
            .execute("INSERT INTO user (username) VALUES ('alice')", ())
            .unwrap();

        let error: Error = connection
            .execute("INSERT INTO user (username) VALUES ('alice')", ())
            .unwrap_err()
            .into();

        assert_eq!(error, Error::DuplicateUsername);
    }

    #[test]
    fn permission_denied_is_forbidden() {
        let response = Error::PermissionDenied.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn authentication_required_redirects() {
        let response = Error::AuthenticationRequired.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn validation_alert_is_bad_request() {
        let response = Error::Validation("amount must be positive".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
