//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track income, expenses and a monthly budget
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance tracker with budget analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (defaults to TALLY_DATA_DIR or ~/.local/share/tally)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a transaction
    Add {
        /// Transaction type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Category (see `tally categories`)
        #[arg(short, long)]
        category: String,

        /// Amount, a positive number
        #[arg(short, long)]
        amount: f64,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Replace fields of an existing transaction
    Edit {
        /// Transaction ID
        id: String,

        /// Transaction type: income or expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        amount: Option<f64>,

        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,

        /// Notes (pass an empty string to clear)
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// List transactions, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show a month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show or set the monthly budget
    Budget {
        #[command(subcommand)]
        action: Option<BudgetAction>,
    },

    /// Show totals, budget status and top categories
    Summary {
        /// Restrict to a month (YYYY-MM); defaults to all transactions
        #[arg(short, long)]
        month: Option<String>,

        /// Output the full metrics report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an analysis, using the configured AI backend when available
    Analyze {
        /// Output the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import transactions from a JSON or CSV file
    Import {
        /// File to import
        #[arg(short, long)]
        file: PathBuf,

        /// File format: json or csv (detected from the extension if not specified)
        #[arg(long)]
        format: Option<String>,
    },

    /// Export transactions to a JSON or CSV file
    Export {
        /// Output file (defaults to budget-tracker-YYYY-MM-DD.<format>)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// File format: json or csv
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// List available categories
    Categories {
        /// Only categories offered for a transaction type
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },

    /// Show data directory, counts and configuration
    Status,

    /// AI backend commands
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Set the monthly budget
    Set {
        /// Budget amount, zero or positive
        amount: f64,
    },
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Test the connection to the configured backend
    Test,
}
