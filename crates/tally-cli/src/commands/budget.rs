//! Budget command implementations

use anyhow::{Context, Result};
use tally_core::{AppState, KeyValueStore};

pub fn cmd_budget_show<S: KeyValueStore>(state: &AppState<S>) -> Result<()> {
    let metrics = state.metrics();
    let analysis = &metrics.budget_analysis;

    println!();
    println!("💰 Monthly budget: ${:.2}", analysis.monthly_budget);
    println!("   Spent:     ${:.2}", analysis.spent);
    println!("   Remaining: ${:.2}", analysis.remaining);
    println!("   Used:      {:.1}% ({})", analysis.percentage_used, analysis.status);
    Ok(())
}

pub fn cmd_budget_set<S: KeyValueStore>(state: &mut AppState<S>, amount: f64) -> Result<()> {
    let previous = state.budget();
    state.set_budget(amount).context("Failed to set budget")?;
    println!("✅ Budget updated: ${:.2} → ${:.2}", previous, state.budget());
    Ok(())
}
