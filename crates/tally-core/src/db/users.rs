//! User operations
//!
//! Users are provisioned on first sight of an email from the access layer.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";

impl Database {
    /// Get the user for an email, creating it if needed
    ///
    /// The display name defaults to the local part of the email.
    pub fn ensure_user(&self, email: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidData("Email is required".to_string()));
        }

        let name = email.split('@').next().unwrap_or(email);
        // Concurrent first requests for the same email both land on the one row
        self.conn()?.execute(
            "INSERT OR IGNORE INTO users (email, name) VALUES (?, ?)",
            params![email, name],
        )?;

        self.get_user_by_email(email)?
            .ok_or_else(|| Error::NotFound(format!("User {}", email)))
    }

    /// Create a user; fails with `Conflict` if the email is taken
    pub fn create_user(&self, email: &str, name: &str) -> Result<User> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO users (email, name) VALUES (?, ?)",
            params![email.trim(), name.trim()],
        );
        match result {
            Ok(_) => {}
            Err(e) if Error::is_unique_violation(&e) => {
                return Err(Error::Conflict(format!("User {} already exists", email)));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email (exact match)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email.trim()],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY email",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(3)?;
        let updated_at: String = row.get(4)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}
