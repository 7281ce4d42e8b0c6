//! Status and dashboard command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use tally_core::db::{Database, DB_KEY_ENV};
use tally_core::models::{format_cents, MonthPeriod, User};

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = std::fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                if db.is_encrypted().context("Failed to check encryption")? {
                    println!("   🔐 SQLCipher: active");
                }
                let (users, categories, transactions, bills) =
                    db.table_counts().context("Failed to count rows")?;
                println!();
                println!("   Users: {}", users);
                println!("   Categories: {}", categories);
                println!("   Transactions: {}", transactions);
                println!("   Recurring bills: {}", bills);
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_dashboard(
    db: &Database,
    user: &User,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<()> {
    let period = MonthPeriod::from_parts(month, year)?;
    let today = chrono::Local::now().date_naive();
    let stats = db.get_dashboard_stats(user.id, period, today)?;

    let scope = period
        .map(|p| p.to_string())
        .unwrap_or_else(|| "all time".to_string());

    println!();
    println!("📊 Dashboard for {} ({})", user.email, scope);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Income:   ${:>12}",
        format_cents(stats.summary.total_income_cents)
    );
    println!(
        "   Expenses: ${:>12}",
        format_cents(stats.summary.total_expenses_cents)
    );
    println!(
        "   Net:      ${:>12}",
        format_cents(stats.summary.net_balance_cents)
    );

    if !stats.category_breakdown.is_empty() {
        println!();
        println!("   Expenses by category:");
        for row in &stats.category_breakdown {
            println!(
                "     {:<24} ${:>10}",
                super::truncate(&row.category, 24),
                format_cents(row.total_cents)
            );
        }
    }

    if !stats.monthly_data.is_empty() {
        let window_start = tally_core::models::trend_window_start(today);
        println!();
        println!(
            "   Monthly totals since {}-{:02}:",
            window_start.year(),
            window_start.month()
        );
        for row in &stats.monthly_data {
            println!(
                "     {}-{:02} {:<8} ${:>10}",
                row.year,
                row.month,
                row.transaction_type.as_str(),
                format_cents(row.total_cents)
            );
        }
    }

    println!();
    Ok(())
}
