//! Transaction command implementations

use anyhow::{anyhow, Context, Result};
use tally_core::metrics::transactions_in_period;
use tally_core::{AppState, KeyValueStore, Period, Transaction, TransactionInput, TransactionType};

use super::{format_amount, parse_date_arg, truncate};

/// Optional replacement fields for `tally edit`
#[derive(Debug, Default)]
pub struct EditFields {
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

fn parse_kind(kind: &str) -> Result<TransactionType> {
    kind.parse::<TransactionType>().map_err(|e| anyhow!(e))
}

pub fn cmd_add<S: KeyValueStore>(
    state: &mut AppState<S>,
    kind: &str,
    category: &str,
    amount: f64,
    date: Option<&str>,
    notes: Option<String>,
) -> Result<()> {
    let date = match date {
        Some(d) => parse_date_arg(d)?,
        None => chrono::Local::now().date_naive(),
    };

    let tx = state
        .add(TransactionInput {
            kind: parse_kind(kind)?,
            category: category.to_string(),
            amount,
            date: Some(date),
            notes,
        })
        .context("Failed to add transaction")?;

    println!(
        "✅ Added {} {} │ {} │ {}",
        tx.kind,
        tx.id,
        format_amount(tx.amount, tx.is_income()),
        tx.category
    );
    Ok(())
}

pub fn cmd_edit<S: KeyValueStore>(state: &mut AppState<S>, id: &str, fields: EditFields) -> Result<()> {
    let current = state
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow!("Transaction {} not found", id))?;

    let kind = match fields.kind.as_deref() {
        Some(k) => parse_kind(k)?,
        None => current.kind,
    };
    let date = match fields.date.as_deref() {
        Some(d) => parse_date_arg(d)?,
        None => current.date,
    };

    let tx = state
        .update(
            id,
            TransactionInput {
                kind,
                category: fields.category.unwrap_or(current.category),
                amount: fields.amount.unwrap_or(current.amount),
                date: Some(date),
                notes: fields.notes.or(current.notes),
            },
        )
        .with_context(|| format!("Failed to update transaction {}", id))?;

    println!(
        "✏️  Updated {} │ {} │ {} │ {}",
        tx.id,
        tx.date,
        format_amount(tx.amount, tx.is_income()),
        tx.category
    );
    Ok(())
}

pub fn cmd_delete<S: KeyValueStore>(state: &mut AppState<S>, id: &str) -> Result<()> {
    let removed = state
        .delete(id)
        .with_context(|| format!("Failed to delete transaction {}", id))?;

    println!(
        "🗑️  Deleted {} │ {} │ {}",
        removed.id,
        format_amount(removed.amount, removed.is_income()),
        removed.category
    );
    Ok(())
}

pub fn cmd_list<S: KeyValueStore>(state: &AppState<S>, limit: usize, month: Option<&str>) -> Result<()> {
    let transactions: Vec<Transaction> = match month {
        Some(m) => {
            let period: Period = m.parse().map_err(|e: String| anyhow!(e))?;
            transactions_in_period(state.transactions(), period)
        }
        None => state.transactions().to_vec(),
    };

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  tally add --category \"Food & Dining\" --amount 12.50");
        return Ok(());
    }

    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    println!();
    println!("📝 Transactions ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in sorted.into_iter().take(limit) {
        println!(
            "   [{}] {} │ {:>20} │ {:<18} │ {}",
            tx.id,
            tx.date,
            format_amount(tx.amount, tx.is_income()),
            truncate(&tx.category, 18),
            truncate(tx.notes.as_deref().unwrap_or(""), 30)
        );
    }

    if transactions.len() > limit {
        println!();
        println!("   Showing {} of {}. Use --limit to see more.", limit, transactions.len());
    }

    Ok(())
}
