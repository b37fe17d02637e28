//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_state, analyzer_from_config)
//! - `transactions` - Transaction commands (add, edit, delete, list)
//! - `budget` - Budget commands (show, set)
//! - `reports` - Report commands (summary, analyze, categories, status)
//! - `import` - Import/export commands
//! - `ai` - AI backend commands (test)

pub mod ai;
pub mod budget;
pub mod core;
pub mod import;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use ai::*;
pub use budget::*;
pub use core::*;
pub use import::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a money amount, red for expenses and green for income
pub fn format_amount(amount: f64, is_income: bool) -> String {
    if is_income {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    } else {
        format!("\x1b[31m-${:.2}\x1b[0m", amount)
    }
}
