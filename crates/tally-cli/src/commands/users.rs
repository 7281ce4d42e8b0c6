//! User commands

use anyhow::Result;
use tally_core::db::Database;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Users are created on first request or with `tally users add`.");
        return Ok(());
    }

    println!();
    println!("{:<6} {:<32} {:<20} Created", "ID", "Email", "Name");
    println!("{}", "-".repeat(80));
    for user in &users {
        println!(
            "{:<6} {:<32} {:<20} {}",
            user.id,
            super::truncate(&user.email, 32),
            super::truncate(&user.name, 20),
            user.created_at.format("%Y-%m-%d")
        );
    }
    println!();
    println!("{} user(s)", users.len());

    Ok(())
}

pub fn cmd_users_add(db: &Database, email: &str, name: Option<&str>) -> Result<()> {
    let user = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => db.create_user(email.trim(), name)?,
        None => db.ensure_user(email)?,
    };

    println!("✅ User {} ({}) ready, id {}", user.email, user.name, user.id);
    Ok(())
}
