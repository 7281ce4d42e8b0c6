//! Tally CLI - Personal finance tracker
//!
//! Usage:
//!   tally init                          Initialize database
//!   tally serve --port 5000             Start web server
//!   tally transactions add -t expense -a 12.50 -c Food
//!   tally bills month --month 3 --year 2024

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
            upload_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                upload_dir,
            )
            .await
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Dashboard { month, year } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            commands::cmd_dashboard(&db, &user, month, year)
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_users_list(&db),
                Some(UsersAction::Add { email, name }) => {
                    commands::cmd_users_add(&db, &email, name.as_deref())
                }
            }
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None => commands::cmd_categories_list(&db, &user),
                Some(CategoriesAction::Add {
                    name,
                    category_type,
                }) => commands::cmd_categories_add(&db, &user, &name, &category_type),
                Some(CategoriesAction::Delete { id }) => {
                    commands::cmd_categories_delete(&db, &user, id)
                }
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None => commands::cmd_transactions_list(&db, &user, None, None, None, 20),
                Some(TransactionsAction::List {
                    month,
                    year,
                    transaction_type,
                    limit,
                }) => commands::cmd_transactions_list(
                    &db,
                    &user,
                    month,
                    year,
                    transaction_type.as_deref(),
                    limit,
                ),
                Some(TransactionsAction::Add {
                    transaction_type,
                    amount,
                    date,
                    category,
                    description,
                }) => commands::cmd_transactions_add(
                    &db,
                    &user,
                    commands::TransactionArgs {
                        transaction_type,
                        amount,
                        date,
                        category,
                        description,
                    },
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, &user, id)
                }
            }
        }
        Commands::Bills { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(BillsAction::List) => commands::cmd_bills_list(&db, &user),
                Some(BillsAction::Month { month, year }) => {
                    commands::cmd_bills_month(&db, &user, month, year)
                }
                Some(BillsAction::Add {
                    category,
                    amount,
                    due,
                    description,
                }) => commands::cmd_bills_add(&db, &user, &category, amount, due, description),
                Some(BillsAction::Delete { id }) => commands::cmd_bills_delete(&db, &user, id),
            }
        }
    }
}
