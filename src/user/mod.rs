//! User accounts: identity types, storage, and the profile page.

mod db;
mod domain;
mod profile;

pub use db::{
    count_users, create_user, create_user_table, get_user_by_id, get_user_by_username,
    update_password, update_profile,
};
pub use domain::{Email, MAX_USERNAME_GRAPHEMES, NewUser, User, UserID, Username, check_owner};
pub use profile::{get_profile_page, profile_body_limit, update_profile_endpoint};
