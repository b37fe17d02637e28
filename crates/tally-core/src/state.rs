//! Application state
//!
//! [`AppState`] owns the transaction collection and the budget, and mirrors
//! both to a [`KeyValueStore`] after every mutation. Loading is forgiving:
//! unreadable persisted data is replaced with defaults rather than reported.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::export;
use crate::import::{self, FileFormat};
use crate::metrics::{compute_metrics, compute_metrics_for_period, transactions_in_period, FinancialMetrics, Period};
use crate::models::{validate_budget, IdGenerator, Transaction, TransactionInput, TransactionType};
use crate::store::{KeyValueStore, BUDGET_KEY, TRANSACTIONS_KEY};

/// Result of merging an import into the collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    /// Records that were malformed
    pub skipped_invalid: usize,
    /// Records whose id already exists
    pub skipped_duplicates: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionCounts {
    pub total: usize,
    pub income: usize,
    pub expense: usize,
}

pub struct AppState<S: KeyValueStore> {
    store: S,
    transactions: Vec<Transaction>,
    budget: f64,
    ids: IdGenerator,
}

impl<S: KeyValueStore> AppState<S> {
    /// Load state from a store
    ///
    /// Only store I/O errors are returned. A transaction entry that is not a
    /// valid JSON array loads as an empty collection; a budget that is not a
    /// non-negative number loads as `default_budget`.
    pub fn load(store: S, default_budget: f64) -> Result<Self> {
        let transactions = match store.get(TRANSACTIONS_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(transactions) => transactions,
                Err(e) => {
                    warn!(error = %e, "Stored transactions are unreadable, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let budget = match store.get(BUDGET_KEY)? {
            Some(raw) => parse_budget(&raw).unwrap_or_else(|| {
                warn!(stored = %raw.trim(), "Stored budget is invalid, using default");
                default_budget
            }),
            None => default_budget,
        };

        let ids = IdGenerator::after(transactions.iter().map(|t| t.id.as_str()));
        debug!(transactions = transactions.len(), budget, "Loaded state");

        Ok(Self {
            store,
            transactions,
            budget,
            ids,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Validate and append a new transaction
    pub fn add(&mut self, input: TransactionInput) -> Result<Transaction> {
        let tx = input.into_transaction(self.ids.next_id())?;
        let mut transactions = self.transactions.clone();
        transactions.push(tx.clone());
        self.commit(transactions, self.budget)?;
        info!(id = %tx.id, kind = %tx.kind, amount = tx.amount, "Added transaction");
        Ok(tx)
    }

    /// Replace the transaction with the given id, keeping its id and position
    pub fn update(&mut self, id: &str, input: TransactionInput) -> Result<Transaction> {
        let index = self.position(id)?;
        let tx = input.into_transaction(id.to_string())?;
        let mut transactions = self.transactions.clone();
        transactions[index] = tx.clone();
        self.commit(transactions, self.budget)?;
        info!(id, "Updated transaction");
        Ok(tx)
    }

    pub fn delete(&mut self, id: &str) -> Result<Transaction> {
        let index = self.position(id)?;
        let mut transactions = self.transactions.clone();
        let removed = transactions.remove(index);
        self.commit(transactions, self.budget)?;
        info!(id, "Deleted transaction");
        Ok(removed)
    }

    pub fn set_budget(&mut self, budget: f64) -> Result<()> {
        let budget = validate_budget(budget)?;
        self.persist(&self.transactions, budget)?;
        self.budget = budget;
        info!(budget, "Budget updated");
        Ok(())
    }

    /// Parse an import file and append its transactions
    ///
    /// Records whose id is already present are skipped. Nothing is appended
    /// if the file is rejected as a whole or cannot be saved.
    pub fn import(&mut self, content: &str, format: FileFormat) -> Result<ImportStats> {
        let outcome = import::parse_import(content, format, &mut self.ids)?;

        let mut stats = ImportStats {
            skipped_invalid: outcome.skipped,
            ..ImportStats::default()
        };

        let mut transactions = self.transactions.clone();
        for tx in outcome.transactions {
            if transactions.iter().any(|t| t.id == tx.id) {
                debug!(id = %tx.id, "Skipping duplicate transaction");
                stats.skipped_duplicates += 1;
                continue;
            }
            transactions.push(tx);
            stats.imported += 1;
        }

        if stats.imported > 0 {
            self.commit(transactions, self.budget)?;
            // Imported ids may be ahead of the clock
            self.ids = IdGenerator::after(self.transactions.iter().map(|t| t.id.as_str()));
        }
        info!(
            imported = stats.imported,
            skipped_invalid = stats.skipped_invalid,
            skipped_duplicates = stats.skipped_duplicates,
            "Import complete"
        );
        Ok(stats)
    }

    pub fn export(&self, format: FileFormat) -> Result<String> {
        export::export(&self.transactions, format)
    }

    /// Metrics over the whole collection, labelled with the current month
    pub fn metrics(&self) -> FinancialMetrics {
        compute_metrics(&self.transactions, self.budget)
    }

    /// Metrics over transactions dated within one month
    pub fn metrics_for(&self, period: Period) -> FinancialMetrics {
        let in_period = transactions_in_period(&self.transactions, period);
        compute_metrics_for_period(&in_period, self.budget, period)
    }

    /// The `n` most recent transactions by date, newest first
    pub fn recent(&self, n: usize) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(n);
        sorted
    }

    pub fn counts(&self) -> TransactionCounts {
        let income = self
            .transactions
            .iter()
            .filter(|t| t.kind == TransactionType::Income)
            .count();
        TransactionCounts {
            total: self.transactions.len(),
            income,
            expense: self.transactions.len() - income,
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// Persist, then replace the in-memory state
    ///
    /// The in-memory state is untouched when the store rejects the write.
    fn commit(&mut self, transactions: Vec<Transaction>, budget: f64) -> Result<()> {
        self.persist(&transactions, budget)?;
        self.transactions = transactions;
        self.budget = budget;
        Ok(())
    }

    fn persist(&self, transactions: &[Transaction], budget: f64) -> Result<()> {
        let transactions = serde_json::to_string(transactions)?;
        self.store.set(TRANSACTIONS_KEY, &transactions)?;
        self.store.set(BUDGET_KEY, &budget.to_string())?;
        Ok(())
    }
}

fn parse_budget(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|b| validate_budget(b).ok())
}
