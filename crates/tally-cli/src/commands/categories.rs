//! Category commands

use anyhow::{bail, Result};
use tally_core::db::Database;
use tally_core::models::{CategoryInput, NewCategory, User};

pub fn cmd_categories_list(db: &Database, user: &User) -> Result<()> {
    let categories = db.list_categories(user.id)?;

    if categories.is_empty() {
        println!("No categories. Add one with `tally categories add <name> --type expense`.");
        return Ok(());
    }

    println!();
    println!("{:<6} {:<8} Name", "ID", "Type");
    println!("{}", "-".repeat(48));
    for category in &categories {
        println!(
            "{:<6} {:<8} {}",
            category.id,
            category.category_type.as_str(),
            category.name
        );
    }
    println!();

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    user: &User,
    name: &str,
    category_type: &str,
) -> Result<()> {
    let input = CategoryInput {
        name: Some(name.to_string()),
        category_type: Some(category_type.to_string()),
    };
    let category = db.create_category(user.id, &NewCategory::try_from(input)?)?;

    println!(
        "✅ Created {} category '{}' (id {})",
        category.category_type, category.name, category.id
    );
    Ok(())
}

pub fn cmd_categories_delete(db: &Database, user: &User, id: i64) -> Result<()> {
    if !db.delete_category(user.id, id)? {
        bail!("Category {} not found", id);
    }
    println!("✅ Deleted category {}", id);
    Ok(())
}
