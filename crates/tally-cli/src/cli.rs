//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tally_core::models::LOCAL_DEV_EMAIL;

/// Tally - Track income, expenses, and recurring bills
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Email of the user data commands act as (created on first use)
    #[arg(long, default_value = LOCAL_DEV_EMAIL, global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires Cloudflare Access headers or an API key.
        /// Requests without either act as local-dev@localhost.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Directory for uploaded receipt images (default: $TALLY_UPLOAD_DIR or ./uploads)
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },

    /// Show database status (encryption, size, row counts)
    Status,

    /// Show income, expenses, and category breakdown
    Dashboard {
        /// Month (1-12); requires --year
        #[arg(long)]
        month: Option<u32>,

        /// Year; requires --month
        #[arg(long)]
        year: Option<i32>,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Manage categories (list, add, delete)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage transactions (list, add, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage recurring bills (list, month, add, delete)
    Bills {
        #[command(subcommand)]
        action: Option<BillsAction>,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Add a user
    Add {
        /// Email address
        email: String,

        /// Display name (defaults to the part before '@')
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Category type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        category_type: String,
    },

    /// Delete a category by ID
    Delete {
        /// Category ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        /// Month (1-12); requires --year
        #[arg(long)]
        month: Option<u32>,

        /// Year; requires --month
        #[arg(long)]
        year: Option<i32>,

        /// Only income or expense
        #[arg(short = 't', long = "type")]
        transaction_type: Option<String>,

        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Record a transaction
    Add {
        /// Transaction type: income or expense
        #[arg(short = 't', long = "type")]
        transaction_type: String,

        /// Amount (e.g., 12.50)
        #[arg(short, long)]
        amount: f64,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a transaction by ID
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BillsAction {
    /// List recurring bills
    List,

    /// Show which bills are paid for a month (defaults to the current month)
    Month {
        /// Month (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Add a recurring bill
    Add {
        /// Expense category the bill is paid from
        #[arg(short, long)]
        category: String,

        /// Amount (e.g., 59.99)
        #[arg(short, long)]
        amount: f64,

        /// Day of month the bill is due (1-31)
        #[arg(long)]
        due: i64,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a recurring bill by ID
    Delete {
        /// Recurring bill ID
        id: i64,
    },
}
