//! Shared test utilities

use lingo_gateway::db::{self, NewUser, User, UserRepo};
use lingo_gateway::DbPool;

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Create a test user in the database
pub fn create_test_user(db: &DbPool, username: &str, password: &str) -> User {
    let repo = UserRepo::new(db.clone());
    repo.create(&NewUser {
        username: username.to_string(),
        password: password.to_string(),
        email: Some(format!("{username}@example.com")),
        full_name: None,
        is_admin: false,
    })
    .expect("failed to create test user")
}
