//! The registration page for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, log_in_register, password_input,
        submit_button,
    },
    user::{Email, NewUser, Username, create_user},
};

/// The minimum number of characters the password should have to be considered
/// valid on the client side. The server checks the strength on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The errors to show next to each field of the registration form.
#[derive(Debug, Default)]
struct RegisterErrors {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

fn field_input(
    label: &str,
    name: &str,
    type_: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                value=(value)
                class=(FORM_TEXT_INPUT_STYLE)
                required;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(username: &str, email: &str, errors: &RegisterErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (field_input("Username", "username", "text", username, errors.username.as_deref()))
            (field_input("Email", "email", "email", email, errors.email.as_deref()))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password.as_deref()))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password.as_deref()))

            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", &RegisterErrors::default());
    let content = log_in_register("Create an account", &registration_form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection holding the user accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The requested username.
    pub username: String,
    /// The email address for the account.
    pub email: String,
    /// The password in plain text.
    pub password: String,
    /// The password again, to catch typos.
    pub confirm_password: String,
}

/// Create a new user from the registration form.
///
/// On success the new user is logged in and redirected to the dashboard.
/// Otherwise the form is returned with error messages next to the offending fields.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let mut errors = RegisterErrors::default();

    let username = Username::new(&user_data.username)
        .inspect_err(|error| errors.username = Some(error.to_string()))
        .ok();
    let email = Email::new(&user_data.email)
        .inspect_err(|error| errors.email = Some(error.to_string()))
        .ok();
    let password = ValidatedPassword::new(
        &user_data.password,
        &[user_data.username.trim(), user_data.email.trim()],
    )
    .inspect_err(|error| errors.password = Some(error.to_string()))
    .ok();

    if user_data.password != user_data.confirm_password {
        errors.confirm_password = Some("Passwords do not match".to_owned());
    }

    let render_form = |errors: &RegisterErrors| {
        registration_form(&user_data.username, &user_data.email, errors).into_response()
    };

    let (Some(username), Some(email), Some(password), None) =
        (username, email, password, &errors.confirm_password)
    else {
        return render_form(&errors);
    };

    let password_hash = match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            errors.password = Some(INTERNAL_ERROR_MSG.to_owned());
            return render_form(&errors);
        }
    };

    let new_user = NewUser {
        username,
        email,
        password_hash,
    };

    let user = match state.db_connection.lock() {
        Ok(connection) => create_user(new_user, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateUsername) => {
            errors.username = Some("That username is already taken.".to_owned());
            return render_form(&errors);
        }
        Err(Error::DuplicateEmail) => {
            errors.email = Some("That email is already registered.".to_owned());
            return render_form(&errors);
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            errors.password = Some(INTERNAL_ERROR_MSG.to_owned());
            return render_form(&errors);
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                (),
            )
                .into_response()
        }
    }
}
