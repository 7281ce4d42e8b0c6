//! Category operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, parse_type_column, Database, DbConn};
use crate::error::{Error, Result};
use crate::models::{Category, NewCategory, TransactionType};

const CATEGORY_COLUMNS: &str = "id, user_id, name, type, created_at";

impl Database {
    /// List a user's categories ordered by type, then name
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ? ORDER BY type, name",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map(params![user_id], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a single category owned by the user
    pub fn get_category(&self, user_id: i64, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE id = ? AND user_id = ?",
                    CATEGORY_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Create a category; a duplicate (name, type) for the user is a `Conflict`
    pub fn create_category(&self, user_id: i64, category: &NewCategory) -> Result<Category> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO categories (name, type, user_id) VALUES (?, ?, ?)",
            params![category.name, category.category_type.as_str(), user_id],
        );
        match result {
            Ok(_) => {}
            Err(e) if Error::is_unique_violation(&e) => {
                return Err(Error::Conflict("Category already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_category(user_id, id)?
            .ok_or_else(|| Error::NotFound("Category not found after creation".to_string()))
    }

    /// Delete a category; returns false if the user has no such category
    ///
    /// Transactions and bills keep their `category_name`; their `category_id`
    /// is cleared by the foreign key.
    pub fn delete_category(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM categories WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Find the ID of the user's category with this exact name and type
    pub(crate) fn lookup_category_id(
        conn: &DbConn,
        user_id: i64,
        name: &str,
        category_type: TransactionType,
    ) -> Result<Option<i64>> {
        let id = conn
            .query_row(
                "SELECT id FROM categories WHERE user_id = ? AND name = ? AND type = ?",
                params![user_id, name, category_type.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
        let type_str: String = row.get(3)?;
        let created_at: String = row.get(4)?;
        Ok(Category {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            category_type: parse_type_column(3, &type_str)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
