use rusqlite::Connection;

use crate::{
    PasswordHash, UserID,
    db::initialize,
    user::{Email, NewUser, Username, create_user},
};

/// An in-memory database with all tables created and foreign keys enabled.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user called `username` and return their ID.
pub(crate) fn create_test_user(username: &str, connection: &Connection) -> UserID {
    create_user(
        NewUser {
            username: Username::new_unchecked(username),
            email: Email::new_unchecked(&format!("{username}@example.com")),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not create test user")
    .id
}
