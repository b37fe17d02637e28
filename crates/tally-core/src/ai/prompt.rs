//! Prompt construction for enrichment calls

use std::fmt::Write;

use super::AnalysisRequest;

/// Shape the model must answer with
const RESPONSE_SHAPE: &str = r#"{
  "summary": {"total_income": 0.0, "total_expenses": 0.0, "net_balance": 0.0, "period": "YYYY-MM"},
  "budget_analysis": {"monthly_budget": 0.0, "spent": 0.0, "remaining": 0.0, "percentage_used": 0.0, "status": "On Track"},
  "category_breakdown": [{"category": "Food & Dining", "amount": 0.0, "percentage": 0.0}],
  "chart_data": {
    "pie_chart": [{"category": "Food & Dining", "value": 0.0}],
    "bar_chart": [{"category": "Food & Dining", "amount": 0.0}],
    "progress_bar": {"used": 0.0, "total": 0.0, "percentage": 0.0}
  },
  "transactions_processed": 0,
  "valid_transactions": 0,
  "invalid_transactions": 0
}"#;

/// Build the natural-language analysis prompt for a request
pub fn build_analysis_prompt(request: &AnalysisRequest<'_>) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are a personal finance assistant. Analyze the transactions below \
         against a monthly budget of ${:.2} for the period {}.",
        request.budget, request.period
    );
    prompt.push('\n');

    if request.transactions.is_empty() {
        prompt.push_str("There are no transactions.\n");
    } else {
        let _ = writeln!(
            prompt,
            "Transactions ({}), one per line as type | category | amount | date | notes:",
            request.transactions.len()
        );
        for tx in request.transactions {
            let _ = writeln!(
                prompt,
                "- {} | {} | {:.2} | {} | {}",
                tx.kind,
                tx.category,
                tx.amount,
                tx.date,
                tx.notes.as_deref().unwrap_or("")
            );
        }
    }

    prompt.push('\n');
    prompt.push_str(
        "Rules:\n\
         - total_income sums income amounts, total_expenses sums expense amounts.\n\
         - spent equals total_expenses; remaining is the budget minus spent.\n\
         - percentage_used is spent / budget * 100.\n\
         - status is \"Over Budget\" above 100%, \"Caution\" above 80%, otherwise \"On Track\".\n\
         - category_breakdown groups expenses by category in order of first appearance, \
           with each category's percentage of total_expenses.\n\
         - Round every amount and percentage to 2 decimals.\n\n",
    );
    prompt.push_str("Respond with only a JSON object of exactly this shape:\n");
    prompt.push_str(RESPONSE_SHAPE);
    prompt.push('\n');

    prompt
}
