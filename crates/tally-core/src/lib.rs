//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Domain models and input validation
//! - Encrypted SQLite access layer with per-user scoping
//! - Recurring bill completion matching
//! - Receipt image storage

pub mod bills;
pub mod db;
pub mod error;
pub mod models;
pub mod receipts;

pub use bills::mark_completion;
pub use db::Database;
pub use error::{Error, Result};
pub use models::{MonthPeriod, TransactionType, LOCAL_DEV_EMAIL};
pub use receipts::{ReceiptStore, StoredReceipt};
