//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendwise - Track spending, get nudges, earn badges
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Local budgeting assistant with insights and achievements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spendwise.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SPENDWISE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Engine config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User to act as
    #[arg(short, long, default_value = "default", global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and create the default user
    Init {
        /// Base currency of the default user
        #[arg(long, default_value = "INR")]
        currency: String,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manage transactions (add, list, import)
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Manage monthly budgets
    Budgets {
        #[command(subcommand)]
        action: BudgetsAction,
    },

    /// Run and review insights
    Insights {
        #[command(subcommand)]
        action: InsightsAction,
    },

    /// Evaluate and list badges
    Badges {
        #[command(subcommand)]
        action: BadgesAction,
    },

    /// Show the current expense-logging streak
    Streak {
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        as_of: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Add a user (no-op if the name exists)
    Add {
        name: String,

        /// Base currency (ISO 4217)
        #[arg(long, default_value = "INR")]
        currency: String,
    },

    /// List users
    List,
}

#[derive(Subcommand)]
pub enum TxAction {
    /// Record a transaction
    Add {
        /// Amount (positive)
        amount: f64,

        /// Description or merchant
        description: String,

        /// Transaction type: expense or income
        #[arg(short = 't', long = "type", default_value = "expense")]
        tx_type: String,

        /// Category
        #[arg(short, long)]
        category: Option<String>,

        /// Currency, if not the user's base currency
        #[arg(long)]
        currency: Option<String>,

        /// Date (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS", UTC); defaults to now
        #[arg(short, long)]
        date: Option<String>,

        /// Mark recurring with this frequency: daily, weekly, monthly, yearly
        #[arg(long)]
        recurring: Option<String>,
    },

    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Import transactions from CSV (date,type,amount,description,category,currency)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// Set (or replace) a budget
    Set {
        /// Budget amount
        amount: f64,

        /// Category; omit for a whole-month budget
        #[arg(short, long)]
        category: Option<String>,

        /// Month (YYYY-MM); defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List budgets
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum InsightsAction {
    /// Run all detectors
    Run {
        /// Run as of this date (YYYY-MM-DD) instead of now
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List insights
    List {
        /// Filter by status: pending (default), approved, rejected, all
        #[arg(short, long)]
        status: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve an insight and apply what it proposes
    Approve {
        /// Insight ID
        id: i64,
    },

    /// Reject an insight
    Reject {
        /// Insight ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BadgesAction {
    /// Unlock any badges the user now qualifies for
    Evaluate {
        /// Evaluate as of this date (YYYY-MM-DD) instead of now
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List unlocked badges
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every badge in the catalog
    Catalog,
}
