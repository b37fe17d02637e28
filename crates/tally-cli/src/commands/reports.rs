//! Report command implementations (summary, analyze, categories, status)

use anyhow::{anyhow, Result};
use tally_core::{
    AIBackend, Analyzer, AppState, BudgetStatus, Category, Config, FinancialMetrics, KeyValueStore,
    Period, TransactionType,
};

use super::{format_amount, truncate};

/// Number of categories shown in summaries
const TOP_CATEGORIES: usize = 4;

/// Number of recent transactions shown in summaries
const RECENT_TRANSACTIONS: usize = 5;

fn status_badge(status: BudgetStatus) -> String {
    match status {
        BudgetStatus::OnTrack => format!("\x1b[32m{}\x1b[0m", status),
        BudgetStatus::Caution => format!("\x1b[33m{}\x1b[0m", status),
        BudgetStatus::OverBudget => format!("\x1b[31m{}\x1b[0m", status),
    }
}

/// Text progress bar for a percentage, clamped to the bar width
fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

fn print_metrics(metrics: &FinancialMetrics) {
    let summary = &metrics.summary;
    let budget = &metrics.budget_analysis;

    println!("   Income:     {}", format_amount(summary.total_income, true));
    println!("   Expenses:   {}", format_amount(summary.total_expenses, false));
    println!("   Net:        ${:.2}", summary.net_balance);
    println!();
    println!(
        "   Budget:     ${:.2} spent of ${:.2} (${:.2} remaining)",
        budget.spent, budget.monthly_budget, budget.remaining
    );
    println!(
        "   {} {:.1}% {}",
        progress_bar(budget.percentage_used, 30),
        budget.percentage_used,
        status_badge(budget.status)
    );

    let top = metrics.top_categories(TOP_CATEGORIES);
    if !top.is_empty() {
        println!();
        println!("   Top categories:");
        for c in top {
            println!(
                "     {:<20} ${:>10.2}  {:>6.2}%",
                truncate(&c.category, 20),
                c.amount,
                c.percentage
            );
        }
    }

    if metrics.invalid_transactions > 0 {
        println!();
        println!(
            "   ⚠️  {} malformed transaction(s) excluded",
            metrics.invalid_transactions
        );
    }
}

pub fn cmd_summary<S: KeyValueStore>(state: &AppState<S>, month: Option<&str>, json: bool) -> Result<()> {
    let metrics = match month {
        Some(m) => {
            let period: Period = m.parse().map_err(|e: String| anyhow!(e))?;
            state.metrics_for(period)
        }
        None => state.metrics(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!();
    println!("📊 Summary ({})", metrics.summary.period);
    println!("   ─────────────────────────────────────────────────────────────");
    print_metrics(&metrics);

    let recent = state.recent(RECENT_TRANSACTIONS);
    if !recent.is_empty() {
        println!();
        println!("   Recent transactions:");
        for tx in recent {
            println!(
                "     {} │ {:>20} │ {}",
                tx.date,
                format_amount(tx.amount, tx.is_income()),
                truncate(&tx.category, 24)
            );
        }
    }

    Ok(())
}

pub async fn cmd_analyze<S: KeyValueStore>(state: &AppState<S>, analyzer: &Analyzer, json: bool) -> Result<()> {
    if !json {
        match analyzer.backend() {
            Some(backend) => println!("🤖 Analyzing with {} ({})...", backend.model(), backend.host()),
            None => println!("🔍 Analyzing locally (no AI backend configured)..."),
        }
    }

    let analysis = analyzer.analyze(state.transactions(), state.budget()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!();
    println!("📊 Analysis ({})", analysis.result.summary.period);
    println!("   ─────────────────────────────────────────────────────────────");
    print_metrics(&analysis.result);
    println!();
    println!(
        "   Source: {} │ confidence {:.0}% │ {} transactions │ {}",
        analysis.metadata.source,
        analysis.confidence * 100.0,
        analysis.metadata.transactions_analyzed,
        analysis.metadata.processing_time
    );

    Ok(())
}

pub fn cmd_categories(kind: Option<&str>) -> Result<()> {
    let categories: Vec<Category> = match kind {
        Some(k) => {
            let kind: TransactionType = k.parse().map_err(|e: String| anyhow!(e))?;
            Category::for_type(kind)
        }
        None => Category::all().collect(),
    };

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for c in categories {
        println!("   {:<20} {}", c.label(), c.color());
    }
    Ok(())
}

pub fn cmd_status<S: KeyValueStore>(state: &AppState<S>, config: &Config) -> Result<()> {
    let counts = state.counts();

    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Data directory: {}", config.data_dir.display());

    let config_path = config.config_path();
    if config_path.exists() {
        println!("   Config: {}", config_path.display());
    } else {
        println!("   Config: (none, using defaults)");
    }

    println!();
    println!(
        "   Transactions: {} ({} income, {} expense)",
        counts.total, counts.income, counts.expense
    );
    println!("   Budget: ${:.2}", state.budget());

    println!();
    match (config.ai.backend.to_lowercase().as_str(), config.ai.host.as_deref()) {
        ("none" | "off" | "disabled", _) => println!("   AI backend: disabled"),
        ("mock", _) => println!("   AI backend: mock"),
        (_, Some(host)) => println!("   AI backend: ollama ({} @ {})", config.ai.model, host),
        (_, None) => println!("   AI backend: not configured (set OLLAMA_HOST)"),
    }

    Ok(())
}
