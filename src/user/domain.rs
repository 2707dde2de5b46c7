//! Core user types and ownership checks.

use std::fmt::Display;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, auth::PasswordHash};

/// The longest username allowed, in graphemes.
pub const MAX_USERNAME_GRAPHEMES: usize = 64;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Extracts the ID of the logged in user placed in the request by the auth middleware.
///
/// Fails with [Error::AuthenticationRequired] on routes without the middleware.
impl<S> FromRequestParts<S> for UserID
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserID>()
            .copied()
            .ok_or(Error::AuthenticationRequired)
    }
}

/// A trimmed, non-empty username of at most [MAX_USERNAME_GRAPHEMES] graphemes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Validate and trim `raw`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the name is empty or too long.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(Error::Validation("username cannot be empty".to_owned()));
        }

        if name.graphemes(true).count() > MAX_USERNAME_GRAPHEMES {
            return Err(Error::Validation(format!(
                "username cannot be longer than {MAX_USERNAME_GRAPHEMES} characters"
            )));
        }

        Ok(Self(name.to_owned()))
    }

    /// Wrap a name read from the database.
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An email address with a non-empty local part and domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Validate and trim `raw`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if `raw` is not of the form `local@domain`.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let email = raw.trim();

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email.to_owned()))
            }
            _ => Err(Error::Validation(format!(
                "\"{email}\" is not a valid email address"
            ))),
        }
    }

    /// Wrap an email read from the database.
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The unique name used to log in.
    pub username: Username,
    /// The user's unique email address.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The file name of the user's avatar in the upload directory.
    pub avatar: Option<String>,
}

/// The fields needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The unique name used to log in.
    pub username: Username,
    /// The user's unique email address.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Check that `requester` owns a resource owned by `owner`.
///
/// # Errors
///
/// Returns [Error::PermissionDenied] if the IDs differ.
pub fn check_owner(owner: UserID, requester: UserID) -> Result<(), Error> {
    if owner == requester {
        Ok(())
    } else {
        tracing::warn!("User {requester} tried to access a resource owned by user {owner}");
        Err(Error::PermissionDenied)
    }
}

#[cfg(test)]
mod user_domain_tests {
    use axum::{extract::FromRequestParts, http::Request};

    use crate::Error;

    use super::{Email, MAX_USERNAME_GRAPHEMES, UserID, Username, check_owner};

    #[test]
    fn username_is_trimmed() {
        assert_eq!(Username::new("  alice ").unwrap().as_ref(), "alice");
    }

    #[test]
    fn username_cannot_be_blank() {
        assert!(matches!(Username::new(" \t"), Err(Error::Validation(_))));
    }

    #[test]
    fn username_length_counts_graphemes() {
        let just_fits = "🦀".repeat(MAX_USERNAME_GRAPHEMES);
        let too_long = "a".repeat(MAX_USERNAME_GRAPHEMES + 1);

        assert!(Username::new(&just_fits).is_ok());
        assert!(matches!(Username::new(&too_long), Err(Error::Validation(_))));
    }

    #[test]
    fn email_needs_local_part_and_domain() {
        assert!(Email::new("alice@example.com").is_ok());
        assert!(Email::new("alice").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("alice@").is_err());
        assert!(Email::new("a@b@c").is_err());
    }

    #[test]
    fn owner_passes_check() {
        assert_eq!(check_owner(UserID::new(1), UserID::new(1)), Ok(()));
    }

    #[test]
    fn other_user_is_denied() {
        assert_eq!(
            check_owner(UserID::new(1), UserID::new(2)),
            Err(Error::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn extractor_reads_extension() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        parts.extensions.insert(UserID::new(9));

        let got = UserID::from_request_parts(&mut parts, &()).await;

        assert_eq!(got, Ok(UserID::new(9)));
    }

    #[tokio::test]
    async fn extractor_requires_authentication() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let got = UserID::from_request_parts(&mut parts, &()).await;

        assert_eq!(got, Err(Error::AuthenticationRequired));
    }
}
