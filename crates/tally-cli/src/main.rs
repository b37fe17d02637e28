//! Tally CLI - Personal finance tracker
//!
//! Usage:
//!   tally add -c "Food & Dining" -a 12.50   Record an expense
//!   tally budget set 2500                   Set the monthly budget
//!   tally summary --month 2024-01           Show a monthly summary
//!   tally import --file export.csv          Import transactions

mod cli;
mod commands;

#[cfg(test)]
mod tests;

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

    let config = commands::load_config(cli.data_dir.as_deref());

    match cli.command {
        Commands::Add {
            kind,
            category,
            amount,
            date,
            notes,
        } => {
            let mut state = commands::open_state(&config)?;
            commands::cmd_add(
                &mut state,
                &kind,
                &category,
                amount,
                date.as_deref(),
                notes,
            )
        }
        Commands::Edit {
            id,
            kind,
            category,
            amount,
            date,
            notes,
        } => {
            let mut state = commands::open_state(&config)?;
            commands::cmd_edit(
                &mut state,
                &id,
                commands::EditFields {
                    kind,
                    category,
                    amount,
                    date,
                    notes,
                },
            )
        }
        Commands::Delete { id } => {
            let mut state = commands::open_state(&config)?;
            commands::cmd_delete(&mut state, &id)
        }
        Commands::List { limit, month } => {
            let state = commands::open_state(&config)?;
            commands::cmd_list(&state, limit, month.as_deref())
        }
        Commands::Budget { action } => {
            let mut state = commands::open_state(&config)?;
            match action {
                None => commands::cmd_budget_show(&state),
                Some(BudgetAction::Set { amount }) => commands::cmd_budget_set(&mut state, amount),
            }
        }
        Commands::Summary { month, json } => {
            let state = commands::open_state(&config)?;
            commands::cmd_summary(&state, month.as_deref(), json)
        }
        Commands::Analyze { json } => {
            let state = commands::open_state(&config)?;
            let analyzer = commands::analyzer_from_config(&config);
            commands::cmd_analyze(&state, &analyzer, json).await
        }
        Commands::Import { file, format } => {
            let mut state = commands::open_state(&config)?;
            commands::cmd_import(&mut state, &file, format.as_deref())
        }
        Commands::Export { file, format } => {
            let state = commands::open_state(&config)?;
            commands::cmd_export(&state, file.as_deref(), &format)
        }
        Commands::Categories { kind } => commands::cmd_categories(kind.as_deref()),
        Commands::Status => {
            let state = commands::open_state(&config)?;
            commands::cmd_status(&state, &config)
        }
        Commands::Ai { action } => match action {
            AiAction::Test => commands::cmd_ai_test(&config).await,
        },
    }
}
