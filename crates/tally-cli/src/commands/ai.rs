//! AI backend command implementations

use anyhow::Result;
use tally_core::{AIBackend, AIClient, AnalysisRequest, Config, Period, Transaction, TransactionType};

/// Small fixed data set used to exercise the backend
fn sample_transactions() -> Vec<Transaction> {
    let date = chrono::Local::now().date_naive();
    [
        (TransactionType::Income, "Income", 3000.0),
        (TransactionType::Expense, "Food & Dining", 400.0),
        (TransactionType::Expense, "Transportation", 200.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (kind, category, amount))| Transaction {
        id: (i + 1).to_string(),
        kind,
        category: category.to_string(),
        amount,
        date,
        notes: None,
    })
    .collect()
}

/// Test the configured AI backend
pub async fn cmd_ai_test(config: &Config) -> Result<()> {
    println!("🔍 Testing AI backend...\n");
    println!("  Backend: {}", config.ai.backend);
    println!("  Model:   {}", config.ai.model);

    let Some(client) = AIClient::from_config(&config.ai) else {
        println!("\n⚠️  No AI backend configured. Analysis will run locally.");
        println!("\nTo use Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull {}", config.ai.model);
        println!("  4. Set environment variable: export OLLAMA_HOST=http://localhost:11434");
        return Ok(());
    };

    println!("  Host:    {}\n", client.host());

    print!("Checking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {}", client.host());
        return Ok(());
    }

    println!("\n📋 Requesting a sample analysis...\n");
    let transactions = sample_transactions();
    let request = AnalysisRequest {
        transactions: &transactions,
        budget: 1000.0,
        period: Period::of(transactions[0].date),
    };

    match client.analyze_finances(&request).await {
        Ok(metrics) => {
            println!(
                "  Income ${:.2}, expenses ${:.2}, {} ({:.1}% used)",
                metrics.summary.total_income,
                metrics.summary.total_expenses,
                metrics.budget_analysis.status,
                metrics.budget_analysis.percentage_used
            );
            if metrics.breakdown_is_consistent() {
                println!("  ✅ Category breakdown is consistent");
            } else {
                println!("  ⚠️  Category breakdown does not add up; analysis would fall back to local");
            }
        }
        Err(e) => println!("  ❌ Error: {}", e),
    }

    Ok(())
}
