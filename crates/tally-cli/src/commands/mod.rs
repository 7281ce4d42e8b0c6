//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `bills` - Recurring bill commands (list, month, add, delete)
//! - `categories` - Category commands (list, add, delete)
//! - `core` - Init plus shared utilities (open_db, resolve_user)
//! - `serve` - Web server command
//! - `status` - Status and dashboard commands
//! - `transactions` - Transaction commands (list, add, delete)
//! - `users` - User commands (list, add)

pub mod bills;
pub mod categories;
pub mod core;
pub mod serve;
pub mod status;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use bills::*;
pub use categories::*;
pub use self::core::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
