//! The profile page, where users change their username, email and avatar.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRef, Multipart, State, multipart::MultipartError},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppConfig, AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, submit_button,
        text_input,
    },
    navigation::NavBar,
    user::{Email, User, UserID, Username, get_user_by_id, update_profile},
};

/// The state needed for the profile page and endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// Upload directory, allowed extensions and maximum avatar size.
    pub config: Arc<AppConfig>,
    /// The database connection holding the user accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Space allowed for the text fields and multipart boundaries on top of the avatar.
const PROFILE_FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// The request body limit for the profile endpoint.
///
/// Leaves room for an avatar of exactly `config.max_avatar_bytes` plus the rest of the form.
pub fn profile_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_avatar_bytes.saturating_add(PROFILE_FORM_OVERHEAD_BYTES))
}

/// Render the profile page for the logged in user.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;

    Ok(profile_view(&user, &state.config).into_response())
}

fn profile_view(user: &User, config: &AppConfig) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let accept = config
        .allowed_avatar_extensions
        .iter()
        .map(|extension| format!(".{extension}"))
        .collect::<Vec<_>>()
        .join(",");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Profile" }

            @if let Some(avatar) = &user.avatar {
                img
                    src={ (endpoints::UPLOADS) "/" (avatar) }
                    alt="Avatar"
                    class="w-24 h-24 mb-4 rounded-full object-cover";
            }

            form
                hx-post=(endpoints::PROFILE_API)
                hx-encoding="multipart/form-data"
                hx-target-error="#alert-container"
                hx-swap="none"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                (text_input("Username", "username", "text", user.username.as_ref(), true))
                (text_input("Email", "email", "email", user.email.as_ref(), true))

                div
                {
                    label for="avatar" class=(FORM_LABEL_STYLE) { "Avatar" }

                    input
                        type="file"
                        name="avatar"
                        id="avatar"
                        accept=(accept)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (submit_button("Save"))
            }
        }
    };

    base("Profile", &[], &content)
}

/// A file sent in the avatar field of the profile form.
#[derive(Debug)]
struct AvatarUpload {
    file_name: String,
    bytes: Bytes,
}

/// The fields of the profile form.
#[derive(Debug, Default)]
struct ProfileForm {
    username: String,
    email: String,
    avatar: Option<AvatarUpload>,
}

fn multipart_error(error: MultipartError) -> Error {
    Error::MultipartError(error.body_text())
}

async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileForm, Error> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("username") => form.username = field.text().await.map_err(multipart_error)?,
            Some("email") => form.email = field.text().await.map_err(multipart_error)?,
            Some("avatar") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty part when no file was chosen.
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.avatar = Some(AvatarUpload { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Reduce `raw_name` to a bare file name of ASCII letters, digits, dots,
/// dashes and underscores.
fn secure_file_name(raw_name: &str) -> String {
    let base_name = raw_name.rsplit(['/', '\\']).next().unwrap_or_default();

    base_name
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect::<String>()
        .trim_matches(['.', '_'])
        .to_owned()
}

/// The name an avatar called `raw_name` is saved under for `user_id`.
///
/// # Errors
///
/// Returns [Error::InvalidAvatar] if nothing is left of the name after
/// sanitising or the extension is not allowed.
fn avatar_file_name(user_id: UserID, raw_name: &str, config: &AppConfig) -> Result<String, Error> {
    let file_name = secure_file_name(raw_name);

    if file_name.is_empty() || !config.is_allowed_avatar(&file_name) {
        return Err(Error::InvalidAvatar(format!(
            "\"{raw_name}\" is not one of the allowed image types: {}",
            config.allowed_avatar_extensions.join(", ")
        )));
    }

    Ok(format!("user_{user_id}_{file_name}"))
}

async fn store_avatar(
    user_id: UserID,
    upload: &AvatarUpload,
    config: &AppConfig,
) -> Result<String, Error> {
    if upload.bytes.len() > config.max_avatar_bytes {
        return Err(Error::InvalidAvatar(format!(
            "the file is larger than {} bytes",
            config.max_avatar_bytes
        )));
    }

    let file_name = avatar_file_name(user_id, &upload.file_name, config)?;
    write_file(&config.upload_dir, &file_name, &upload.bytes).await?;

    Ok(file_name)
}

async fn write_file(directory: &Path, file_name: &str, bytes: &[u8]) -> Result<(), Error> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|error| Error::FileError(error.to_string()))?;
    tokio::fs::write(directory.join(file_name), bytes)
        .await
        .map_err(|error| Error::FileError(error.to_string()))
}

/// Update the username, email and optionally the avatar of the logged in user.
///
/// Responds with an alert describing the outcome.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    user_id: UserID,
    multipart: Multipart,
) -> Response {
    let form = match read_profile_form(multipart).await {
        Ok(form) => form,
        Err(error) => return error.into_alert_response(),
    };

    let (username, email) = match (Username::new(&form.username), Email::new(&form.email)) {
        (Ok(username), Ok(email)) => (username, email),
        (Err(error), _) | (_, Err(error)) => return error.into_alert_response(),
    };

    let avatar = match &form.avatar {
        Some(upload) => match store_avatar(user_id, upload, &state.config).await {
            Ok(file_name) => Some(file_name),
            Err(error) => {
                tracing::warn!("Rejected avatar upload from user {user_id}: {error}");
                return error.into_alert_response();
            }
        },
        None => None,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_profile(user_id, &username, &email, avatar.as_deref(), &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Profile updated".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not update profile of user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod profile_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{
        AppConfig, PasswordHash, endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
        user::{Email, NewUser, Username, create_user, create_user_table},
    };

    use super::{ProfileState, get_profile_page};

    #[tokio::test]
    async fn profile_page_shows_current_details() {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        let user = create_user(
            NewUser {
                username: Username::new("alice").unwrap(),
                email: Email::new("alice@example.com").unwrap(),
                password_hash: PasswordHash::new_unchecked("hash"),
            },
            &connection,
        )
        .unwrap();
        let state = ProfileState {
            config: Arc::new(AppConfig::default()),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_profile_page(State(state), user.id).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-post");
        assert_form_input_with_value(&form, "username", "text", "alice");
        assert_form_input_with_value(&form, "email", "email", "alice@example.com");
    }
}
