//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_date_column, parse_datetime, parse_type_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionFilter, TransactionUpdate};

const TRANSACTION_COLUMNS: &str = "id, user_id, type, amount_cents, category_id, category_name, \
     description, transaction_date, receipt_path, created_at, updated_at";

impl Database {
    /// List a user's transactions, newest first
    ///
    /// Ties on date are broken by creation time, then ID, so the order is stable.
    pub fn list_transactions(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = vec!["user_id = ?"];
        let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(period) = filter.period {
            conditions.push("transaction_date >= ? AND transaction_date < ?");
            query_params.push(Box::new(period.start().to_string()));
            query_params.push(Box::new(period.end_exclusive().to_string()));
        }

        if let Some(tx_type) = filter.transaction_type {
            conditions.push("type = ?");
            query_params.push(Box::new(tx_type.as_str()));
        }

        let sql = format!(
            "SELECT {} FROM transactions WHERE {} \
             ORDER BY transaction_date DESC, created_at DESC, id DESC",
            TRANSACTION_COLUMNS,
            conditions.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(
                rusqlite::params_from_iter(query_params.iter().map(|p| p.as_ref())),
                Self::row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction owned by the user
    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
                    TRANSACTION_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Insert a transaction, linking it to the user's category of the same name and type
    pub fn create_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.conn()?;

        let category_id = match &tx.category_name {
            Some(name) => Self::lookup_category_id(&conn, user_id, name, tx.transaction_type)?,
            None => None,
        };

        conn.execute(
            r#"
            INSERT INTO transactions
                (user_id, type, amount_cents, category_id, category_name, description, transaction_date, receipt_path)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.transaction_type.as_str(),
                tx.amount_cents,
                category_id,
                tx.category_name,
                tx.description,
                tx.transaction_date.to_string(),
                tx.receipt_path,
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound("Transaction not found after creation".to_string()))
    }

    /// Apply a partial update; returns `None` if the user has no such transaction
    ///
    /// When the category name or type changes, `category_id` is resolved again
    /// and may become NULL.
    pub fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<Transaction>> {
        let Some(existing) = self.get_transaction(user_id, id)? else {
            return Ok(None);
        };

        let tx_type = update.transaction_type.unwrap_or(existing.transaction_type);
        let category_name = update
            .category_name
            .clone()
            .or_else(|| existing.category_name.clone());

        let conn = self.conn()?;

        let category_changed = update.transaction_type.is_some() || update.category_name.is_some();
        let category_id = if category_changed {
            match &category_name {
                Some(name) => Self::lookup_category_id(&conn, user_id, name, tx_type)?,
                None => None,
            }
        } else {
            existing.category_id
        };

        conn.execute(
            r#"
            UPDATE transactions SET
                type = ?,
                amount_cents = ?,
                category_id = ?,
                category_name = ?,
                description = ?,
                transaction_date = ?,
                receipt_path = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
            params![
                tx_type.as_str(),
                update.amount_cents.unwrap_or(existing.amount_cents),
                category_id,
                category_name,
                update.description.clone().or(existing.description),
                update
                    .transaction_date
                    .unwrap_or(existing.transaction_date)
                    .to_string(),
                update.receipt_path.clone().or(existing.receipt_path),
                id,
                user_id,
            ],
        )?;
        drop(conn);

        self.get_transaction(user_id, id)
    }

    /// Delete a transaction; returns false if the user has no such transaction
    pub fn delete_transaction(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Detach a receipt from every one of the user's transactions that references it
    pub fn clear_receipt_path(&self, user_id: i64, receipt_path: &str) -> Result<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET receipt_path = NULL, updated_at = CURRENT_TIMESTAMP
             WHERE user_id = ? AND receipt_path = ?",
            params![user_id, receipt_path],
        )?;
        Ok(updated)
    }

    fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
        let type_str: String = row.get(2)?;
        let date_str: String = row.get(7)?;
        let created_at: String = row.get(9)?;
        let updated_at: String = row.get(10)?;

        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            transaction_type: parse_type_column(2, &type_str)?,
            amount_cents: row.get(3)?,
            category_id: row.get(4)?,
            category_name: row.get(5)?,
            description: row.get(6)?,
            transaction_date: parse_date_column(7, &date_str)?,
            receipt_path: row.get(8)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}
