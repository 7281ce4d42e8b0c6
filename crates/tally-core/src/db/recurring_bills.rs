//! Recurring bill operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::bills::mark_completion;
use crate::error::{Error, Result};
use crate::models::{
    BillStatus, ExpenseGroup, MonthPeriod, NewRecurringBill, RecurringBill, RecurringBillUpdate,
    TransactionType,
};

const BILL_COLUMNS: &str = "id, user_id, category_id, category_name, amount_cents, due_date, \
     description, created_at, updated_at";

impl Database {
    /// List a user's recurring bills ordered by due day, then category name
    pub fn list_recurring_bills(&self, user_id: i64) -> Result<Vec<RecurringBill>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recurring_bills WHERE user_id = ? ORDER BY due_date, category_name, id",
            BILL_COLUMNS
        ))?;

        let bills = stmt
            .query_map(params![user_id], Self::row_to_bill)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bills)
    }

    /// Get a single recurring bill owned by the user
    pub fn get_recurring_bill(&self, user_id: i64, id: i64) -> Result<Option<RecurringBill>> {
        let conn = self.conn()?;
        let bill = conn
            .query_row(
                &format!(
                    "SELECT {} FROM recurring_bills WHERE id = ? AND user_id = ?",
                    BILL_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_bill,
            )
            .optional()?;
        Ok(bill)
    }

    /// Create a recurring bill, linking it to the user's expense category of the same name
    pub fn create_recurring_bill(
        &self,
        user_id: i64,
        bill: &NewRecurringBill,
    ) -> Result<RecurringBill> {
        let conn = self.conn()?;

        let category_id = Self::lookup_category_id(
            &conn,
            user_id,
            &bill.category_name,
            TransactionType::Expense,
        )?;

        conn.execute(
            r#"
            INSERT INTO recurring_bills (user_id, category_id, category_name, amount_cents, due_date, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                category_id,
                bill.category_name,
                bill.amount_cents,
                bill.due_date,
                bill.description,
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_recurring_bill(user_id, id)?
            .ok_or_else(|| Error::NotFound("Recurring bill not found after creation".to_string()))
    }

    /// Apply a partial update; returns `None` if the user has no such bill
    pub fn update_recurring_bill(
        &self,
        user_id: i64,
        id: i64,
        update: &RecurringBillUpdate,
    ) -> Result<Option<RecurringBill>> {
        let Some(existing) = self.get_recurring_bill(user_id, id)? else {
            return Ok(None);
        };

        let conn = self.conn()?;

        let (category_name, category_id) = match &update.category_name {
            Some(name) => (
                name.clone(),
                Self::lookup_category_id(&conn, user_id, name, TransactionType::Expense)?,
            ),
            None => (existing.category_name, existing.category_id),
        };

        conn.execute(
            r#"
            UPDATE recurring_bills SET
                category_id = ?,
                category_name = ?,
                amount_cents = ?,
                due_date = ?,
                description = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            "#,
            params![
                category_id,
                category_name,
                update.amount_cents.unwrap_or(existing.amount_cents),
                update.due_date.unwrap_or(existing.due_date),
                update.description.clone().or(existing.description),
                id,
                user_id,
            ],
        )?;
        drop(conn);

        self.get_recurring_bill(user_id, id)
    }

    /// Delete a recurring bill; returns false if the user has no such bill
    pub fn delete_recurring_bill(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM recurring_bills WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Count the user's expenses in a month, grouped by (category_id, category_name)
    pub fn expense_groups_for_month(
        &self,
        user_id: i64,
        period: MonthPeriod,
    ) -> Result<Vec<ExpenseGroup>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category_id, category_name, COUNT(*)
            FROM transactions
            WHERE user_id = ? AND type = 'expense'
              AND transaction_date >= ? AND transaction_date < ?
            GROUP BY category_id, category_name
            "#,
        )?;

        let groups = stmt
            .query_map(
                params![
                    user_id,
                    period.start().to_string(),
                    period.end_exclusive().to_string()
                ],
                |row| {
                    Ok(ExpenseGroup {
                        category_id: row.get(0)?,
                        category_name: row.get(1)?,
                        count: row.get(2)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(groups)
    }

    /// The user's recurring bills with completion state for one month
    pub fn recurring_bills_for_month(
        &self,
        user_id: i64,
        period: MonthPeriod,
    ) -> Result<Vec<BillStatus>> {
        let bills = self.list_recurring_bills(user_id)?;
        let groups = self.expense_groups_for_month(user_id, period)?;
        Ok(mark_completion(bills, &groups))
    }

    fn row_to_bill(row: &Row) -> rusqlite::Result<RecurringBill> {
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;
        Ok(RecurringBill {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            category_name: row.get(3)?,
            amount_cents: row.get(4)?,
            due_date: row.get(5)?,
            description: row.get(6)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}
