//! Transaction commands

use anyhow::{bail, Result};
use tally_core::db::Database;
use tally_core::models::{
    format_cents, parse_type, MonthPeriod, NewTransaction, TransactionFilter, TransactionInput,
    User,
};

/// Arguments for `tally transactions add`
#[derive(Debug, Clone)]
pub struct TransactionArgs {
    pub transaction_type: String,
    pub amount: f64,
    /// Defaults to today when absent
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

pub fn cmd_transactions_list(
    db: &Database,
    user: &User,
    month: Option<u32>,
    year: Option<i32>,
    transaction_type: Option<&str>,
    limit: usize,
) -> Result<()> {
    let filter = TransactionFilter {
        period: MonthPeriod::from_parts(month, year)?,
        transaction_type: transaction_type.map(parse_type).transpose()?,
    };
    let transactions = db.list_transactions(user.id, filter)?;

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6} {:<10} {:<8} {:>12}  {:<18} Description",
        "ID", "Date", "Type", "Amount", "Category"
    );
    println!("{}", "-".repeat(90));
    for tx in transactions.iter().take(limit) {
        println!(
            "{:<6} {:<10} {:<8} {:>12}  {:<18} {}",
            tx.id,
            tx.transaction_date,
            tx.transaction_type.as_str(),
            format_cents(tx.amount_cents),
            super::truncate(tx.category_name.as_deref().unwrap_or("-"), 18),
            super::truncate(tx.description.as_deref().unwrap_or(""), 40)
        );
    }
    println!();
    if transactions.len() > limit {
        println!("Showing {} of {} transactions", limit, transactions.len());
    } else {
        println!("{} transaction(s)", transactions.len());
    }

    Ok(())
}

pub fn cmd_transactions_add(db: &Database, user: &User, args: TransactionArgs) -> Result<()> {
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
    let input = TransactionInput {
        transaction_type: Some(args.transaction_type),
        amount: Some(args.amount),
        transaction_date: Some(date),
        category_name: args.category,
        description: args.description,
        receipt_path: None,
    };
    let tx = db.create_transaction(user.id, &NewTransaction::try_from(input)?)?;
    db.log_audit(user.id, "create", Some("transaction"), Some(tx.id), Some("source=cli"))?;

    println!(
        "✅ Recorded {} of {} on {} (id {})",
        tx.transaction_type,
        format_cents(tx.amount_cents),
        tx.transaction_date,
        tx.id
    );
    if tx.category_name.is_some() && tx.category_id.is_none() {
        println!("   Note: no {} category with that name exists yet", tx.transaction_type);
    }
    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, user: &User, id: i64) -> Result<()> {
    if !db.delete_transaction(user.id, id)? {
        bail!("Transaction {} not found", id);
    }
    db.log_audit(user.id, "delete", Some("transaction"), Some(id), Some("source=cli"))?;
    println!("✅ Deleted transaction {}", id);
    Ok(())
}
