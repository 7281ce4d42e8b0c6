//! Recurring bill commands

use anyhow::{bail, Result};
use tally_core::db::Database;
use tally_core::models::{format_cents, MonthPeriod, NewRecurringBill, RecurringBillInput, User};

pub fn cmd_bills_list(db: &Database, user: &User) -> Result<()> {
    let bills = db.list_recurring_bills(user.id)?;

    if bills.is_empty() {
        println!("No recurring bills. Add one with `tally bills add -c Rent -a 1200 --due 1`.");
        return Ok(());
    }

    println!();
    println!("{:<6} {:<4} {:<24} {:>12}  Description", "ID", "Due", "Category", "Amount");
    println!("{}", "-".repeat(80));
    for bill in &bills {
        println!(
            "{:<6} {:<4} {:<24} {:>12}  {}",
            bill.id,
            bill.due_date,
            super::truncate(&bill.category_name, 24),
            format_cents(bill.amount_cents),
            bill.description.as_deref().unwrap_or("")
        );
    }
    println!();

    Ok(())
}

pub fn cmd_bills_month(
    db: &Database,
    user: &User,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<()> {
    let period = match (month, year) {
        (None, None) => MonthPeriod::containing(chrono::Local::now().date_naive()),
        (Some(month), Some(year)) => MonthPeriod::new(year, month)?,
        _ => bail!("Month and year are required"),
    };

    let statuses = db.recurring_bills_for_month(user.id, period)?;
    if statuses.is_empty() {
        println!("No recurring bills.");
        return Ok(());
    }

    let paid = statuses.iter().filter(|s| s.is_complete).count();

    println!();
    println!("🧾 Bills for {}", period);
    println!("   ─────────────────────────────────────────────────────────────");
    for status in &statuses {
        let mark = if status.is_complete { "✅" } else { "⬜" };
        println!(
            "   {} {:>2}  {:<24} {:>12}  ({} expense(s))",
            mark,
            status.bill.due_date,
            super::truncate(&status.bill.category_name, 24),
            format_cents(status.bill.amount_cents),
            status.expense_count
        );
    }
    println!();
    println!("   {}/{} paid", paid, statuses.len());
    println!();

    Ok(())
}

pub fn cmd_bills_add(
    db: &Database,
    user: &User,
    category: &str,
    amount: f64,
    due: i64,
    description: Option<String>,
) -> Result<()> {
    let input = RecurringBillInput {
        category_name: Some(category.to_string()),
        amount: Some(amount),
        due_date: Some(due),
        description,
    };
    let bill = db.create_recurring_bill(user.id, &NewRecurringBill::try_from(input)?)?;
    db.log_audit(user.id, "create", Some("recurring_bill"), Some(bill.id), Some("source=cli"))?;

    println!(
        "✅ Added bill '{}' for {} due on day {} (id {})",
        bill.category_name,
        format_cents(bill.amount_cents),
        bill.due_date,
        bill.id
    );
    if bill.category_id.is_none() {
        println!("   Note: no expense category named '{}' exists yet", bill.category_name);
    }
    Ok(())
}

pub fn cmd_bills_delete(db: &Database, user: &User, id: i64) -> Result<()> {
    if !db.delete_recurring_bill(user.id, id)? {
        bail!("Recurring bill {} not found", id);
    }
    db.log_audit(user.id, "delete", Some("recurring_bill"), Some(id), Some("source=cli"))?;
    println!("✅ Deleted recurring bill {}", id);
    Ok(())
}
