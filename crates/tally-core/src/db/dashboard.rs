//! Dashboard aggregation
//!
//! All sums are computed in integer cents by SQLite, so
//! `net_balance = income - expenses` holds exactly.

use chrono::NaiveDate;
use rusqlite::params;

use super::{parse_type_column, Database, DbConn};
use crate::error::Result;
use crate::models::{
    trend_window_start, CategoryTotal, DashboardStats, DashboardSummary, MonthPeriod,
    MonthlyTotal,
};

/// Date bounds for an optional month filter, as SQL text
fn period_bounds(period: Option<MonthPeriod>) -> (String, String) {
    match period {
        Some(p) => (p.start().to_string(), p.end_exclusive().to_string()),
        // Wide enough for any stored DATE
        None => ("0000-01-01".to_string(), "9999-12-32".to_string()),
    }
}

impl Database {
    /// Summary, expense breakdown, and the trailing monthly trend for a user
    ///
    /// `period` filters the summary and breakdown; the trend always covers the
    /// twelve months before `today`.
    pub fn get_dashboard_stats(
        &self,
        user_id: i64,
        period: Option<MonthPeriod>,
        today: NaiveDate,
    ) -> Result<DashboardStats> {
        let conn = self.conn()?;
        let (from, to) = period_bounds(period);

        Ok(DashboardStats {
            summary: Self::summary(&conn, user_id, &from, &to)?,
            category_breakdown: Self::category_breakdown(&conn, user_id, &from, &to)?,
            monthly_data: Self::monthly_trend(&conn, user_id, trend_window_start(today))?,
        })
    }

    fn summary(conn: &DbConn, user_id: i64, from: &str, to: &str) -> Result<DashboardSummary> {
        let (income, expenses): (i64, i64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount_cents ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount_cents ELSE 0 END), 0)
            FROM transactions
            WHERE user_id = ? AND transaction_date >= ? AND transaction_date < ?
            "#,
            params![user_id, from, to],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(DashboardSummary::new(income, expenses))
    }

    fn category_breakdown(
        conn: &DbConn,
        user_id: i64,
        from: &str,
        to: &str,
    ) -> Result<Vec<CategoryTotal>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(category_name, 'Uncategorized') AS category, SUM(amount_cents) AS total
            FROM transactions
            WHERE user_id = ? AND type = 'expense'
              AND transaction_date >= ? AND transaction_date < ?
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )?;

        let totals = stmt
            .query_map(params![user_id, from, to], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total_cents: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    fn monthly_trend(
        conn: &DbConn,
        user_id: i64,
        window_start: NaiveDate,
    ) -> Result<Vec<MonthlyTotal>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT
                CAST(strftime('%Y', transaction_date) AS INTEGER) AS year,
                CAST(strftime('%m', transaction_date) AS INTEGER) AS month,
                type,
                SUM(amount_cents)
            FROM transactions
            WHERE user_id = ? AND transaction_date >= ?
            GROUP BY year, month, type
            ORDER BY year, month, type
            "#,
        )?;

        let totals = stmt
            .query_map(params![user_id, window_start.to_string()], |row| {
                let type_str: String = row.get(2)?;
                Ok(MonthlyTotal {
                    year: row.get(0)?,
                    month: row.get(1)?,
                    transaction_type: parse_type_column(2, &type_str)?,
                    total_cents: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }
}
