//! User repository for CRUD operations and credential checks

use chrono::{DateTime, Utc};

use super::DbPool;
use crate::security::password::{hash_password, verify_password};
use crate::{Error, Result};

/// A user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_admin: bool,
}

/// Fields for updating a user; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

const USER_COLUMNS: &str =
    "id, username, password_hash, email, full_name, is_admin, is_active, created_at, last_login";

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: DbPool,
}

impl UserRepo {
    /// Create a new user repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if the username or email is already taken,
    /// or a database error
    pub fn create(&self, new_user: &NewUser) -> Result<User> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let taken: bool = conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                [&new_user.username],
                |_| Ok(()),
            )
            .is_ok();
        if taken {
            return Err(Error::Auth("username already exists".to_string()));
        }

        if let Some(email) = &new_user.email {
            let email_taken: bool = conn
                .query_row("SELECT 1 FROM users WHERE email = ?1", [email], |_| Ok(()))
                .is_ok();
            if email_taken {
                return Err(Error::Auth("email already registered".to_string()));
            }
        }

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (username, password_hash, email, full_name, is_admin, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            rusqlite::params![
                new_user.username,
                hash_password(&new_user.password),
                new_user.email,
                new_user.full_name,
                new_user.is_admin,
                now,
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, username = %new_user.username, "user created");

        // Release before re-querying; the test pool holds a single connection
        drop(conn);
        self.find(id)?
            .ok_or_else(|| Error::Database("created user not found".to_string()))
    }

    /// Find a user by ID (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, id: i64) -> Result<Option<User>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                row_to_user,
            )
            .ok();

        Ok(user)
    }

    /// Find a user by username (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                row_to_user,
            )
            .ok();

        Ok(user)
    }

    /// List all users, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_all(&self) -> Result<Vec<User>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
            ))
            .map_err(|e| Error::Database(e.to_string()))?;

        let users = stmt
            .query_map([], row_to_user)
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(users)
    }

    /// Update a user's profile fields
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn update(&self, id: i64, update: &UserUpdate) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "UPDATE users SET
                email = COALESCE(?1, email),
                full_name = COALESCE(?2, full_name),
                is_admin = COALESCE(?3, is_admin),
                is_active = COALESCE(?4, is_active)
             WHERE id = ?5",
            rusqlite::params![
                update.email,
                update.full_name,
                update.is_admin,
                update.is_active,
                id,
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Replace a user's password
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn set_password(&self, id: i64, new_password: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            rusqlite::params![hash_password(new_password), id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Delete a user
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("DELETE FROM users WHERE id = ?1", [id])
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Authenticate a user by username and password.
    ///
    /// Returns `None` for unknown usernames, wrong passwords, and inactive
    /// accounts alike — callers surface one generic message for all three to
    /// avoid user enumeration. Updates `last_login` on success.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_username(username)? else {
            return Ok(None);
        };

        if !user.is_active {
            tracing::debug!(username, "login attempt for inactive account");
            return Ok(None);
        }

        if !verify_password(password, &user.password_hash) {
            return Ok(None);
        }

        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2",
            rusqlite::params![now, user.id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        drop(conn);

        tracing::info!(user_id = user.id, username, "user authenticated");
        self.find(user.id)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        full_name: row.get(4)?,
        is_admin: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        last_login: row
            .get::<_, Option<String>>(8)?
            .map(|s| parse_datetime(&s)),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn setup() -> UserRepo {
        let pool = init_memory().unwrap();
        UserRepo::new(pool)
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "correct horse".to_string(),
            email: Some(format!("{username}@example.com")),
            full_name: None,
            is_admin: false,
        }
    }

    #[test]
    fn test_create_and_find() {
        let repo = setup();

        let user = repo.create(&new_user("alice")).unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_active);
        assert!(!user.is_admin);
        assert!(user.last_login.is_none());

        let found = repo.find_by_username("alice").unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let repo = setup();
        repo.create(&new_user("bob")).unwrap();

        let result = repo.create(&new_user("bob"));
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let repo = setup();
        repo.create(&new_user("carol")).unwrap();

        let mut other = new_user("carl");
        other.email = Some("carol@example.com".to_string());
        let result = repo.create(&other);
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn test_authenticate_success_updates_last_login() {
        let repo = setup();
        repo.create(&new_user("dave")).unwrap();

        let user = repo.authenticate("dave", "correct horse").unwrap().unwrap();
        assert!(user.last_login.is_some());
    }

    #[test]
    fn test_authenticate_failures_indistinguishable() {
        let repo = setup();
        repo.create(&new_user("erin")).unwrap();

        // Wrong password and unknown user both come back as None
        assert!(repo.authenticate("erin", "wrong").unwrap().is_none());
        assert!(repo.authenticate("nobody", "whatever").unwrap().is_none());
    }

    #[test]
    fn test_authenticate_inactive_account() {
        let repo = setup();
        let user = repo.create(&new_user("frank")).unwrap();
        repo.update(
            user.id,
            &UserUpdate {
                is_active: Some(false),
                ..UserUpdate::default()
            },
        )
        .unwrap();

        assert!(repo.authenticate("frank", "correct horse").unwrap().is_none());
    }

    #[test]
    fn test_update_partial() {
        let repo = setup();
        let user = repo.create(&new_user("grace")).unwrap();

        repo.update(
            user.id,
            &UserUpdate {
                full_name: Some("Grace Hopper".to_string()),
                is_admin: Some(true),
                ..UserUpdate::default()
            },
        )
        .unwrap();

        let updated = repo.find(user.id).unwrap().unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Grace Hopper"));
        assert!(updated.is_admin);
        // Untouched fields survive
        assert_eq!(updated.email.as_deref(), Some("grace@example.com"));
    }

    #[test]
    fn test_set_password() {
        let repo = setup();
        let user = repo.create(&new_user("heidi")).unwrap();

        repo.set_password(user.id, "new password").unwrap();
        assert!(repo.authenticate("heidi", "correct horse").unwrap().is_none());
        assert!(repo.authenticate("heidi", "new password").unwrap().is_some());
    }

    #[test]
    fn test_delete() {
        let repo = setup();
        let user = repo.create(&new_user("ivan")).unwrap();

        repo.delete(user.id).unwrap();
        assert!(repo.find(user.id).unwrap().is_none());
    }

    #[test]
    fn test_list_all() {
        let repo = setup();
        repo.create(&new_user("judy")).unwrap();
        repo.create(&new_user("mallory")).unwrap();

        let users = repo.list_all().unwrap();
        assert_eq!(users.len(), 2);
    }
}
