//! Spendwise CLI - Local budgeting assistant
//!
//! Usage:
//!   spendwise init                      Initialize database
//!   spendwise tx import --file CSV      Import transactions
//!   spendwise insights run              Run insight detectors
//!   spendwise badges evaluate           Unlock earned badges

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

    if let Commands::Init { currency } = &cli.command {
        return commands::cmd_init(&cli.db, cli.no_encrypt, &cli.user, currency);
    }

    let db = commands::open_db(&cli.db, cli.no_encrypt)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Users { action } => match action {
            UsersAction::Add { name, currency } => commands::cmd_users_add(&db, &name, &currency),
            UsersAction::List => commands::cmd_users_list(&db),
        },
        Commands::Tx { action } => {
            let user_id = commands::resolve_user(&db, &cli.user)?;
            match action {
                TxAction::Add {
                    amount,
                    description,
                    tx_type,
                    category,
                    currency,
                    date,
                    recurring,
                } => commands::cmd_tx_add(
                    &db,
                    user_id,
                    &commands::TxInput {
                        amount,
                        description: &description,
                        tx_type: &tx_type,
                        category: category.as_deref(),
                        currency: currency.as_deref(),
                        date: date.as_deref(),
                        recurring: recurring.as_deref(),
                    },
                ),
                TxAction::List { limit } => commands::cmd_tx_list(&db, user_id, limit),
                TxAction::Import { file } => commands::cmd_tx_import(&db, user_id, &file),
            }
        }
        Commands::Budgets { action } => {
            let user_id = commands::resolve_user(&db, &cli.user)?;
            match action {
                BudgetsAction::Set {
                    amount,
                    category,
                    month,
                } => commands::cmd_budgets_set(
                    &db,
                    user_id,
                    amount,
                    category.as_deref(),
                    month.as_deref(),
                ),
                BudgetsAction::List { month } => {
                    commands::cmd_budgets_list(&db, user_id, month.as_deref())
                }
            }
        }
        Commands::Insights { action } => {
            let user_id = commands::resolve_user(&db, &cli.user)?;
            match action {
                InsightsAction::Run { as_of } => {
                    let config = commands::load_config(cli.config.as_deref())?;
                    commands::cmd_insights_run(&db, user_id, &config, as_of.as_deref()).await
                }
                InsightsAction::List { status, json } => {
                    commands::cmd_insights_list(&db, user_id, status.as_deref(), json)
                }
                InsightsAction::Approve { id } => commands::cmd_insights_approve(&db, user_id, id),
                InsightsAction::Reject { id } => commands::cmd_insights_reject(&db, user_id, id),
            }
        }
        Commands::Badges { action } => {
            let user_id = commands::resolve_user(&db, &cli.user)?;
            match action {
                BadgesAction::Evaluate { as_of } => {
                    let config = commands::load_config(cli.config.as_deref())?;
                    commands::cmd_badges_evaluate(&db, user_id, &config, as_of.as_deref())
                }
                BadgesAction::List { json } => commands::cmd_badges_list(&db, user_id, json),
                BadgesAction::Catalog => commands::cmd_badges_catalog(),
            }
        }
        Commands::Streak { as_of } => {
            let user_id = commands::resolve_user(&db, &cli.user)?;
            commands::cmd_streak(&db, user_id, as_of.as_deref())
        }
    }
}
