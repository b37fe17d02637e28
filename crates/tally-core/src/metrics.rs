//! Financial metrics engine
//!
//! Turns a transaction collection and a monthly budget into a
//! [`FinancialMetrics`] report: summary totals, budget utilization, a
//! per-category expense breakdown and chart-ready projections of the same
//! numbers.
//!
//! The engine is pure. Sums are accumulated unrounded and every monetary
//! figure is rounded to cents only when the report is assembled.
//!
//! ```rust,ignore
//! let metrics = compute_metrics(state.transactions(), state.budget());
//! println!("{} ({:.1}% used)", metrics.budget_analysis.status, metrics.budget_analysis.percentage_used);
//! ```

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// `percentage_used` reported for spending against a zero budget
///
/// That ratio has no finite value, so this sentinel is used instead and the
/// budget is always classified as over budget. Finite ratios are reported
/// as-is, even when larger.
pub const PERCENTAGE_CAP: f64 = 999.99;

/// Qualitative classification of spend-to-budget ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Caution")]
    Caution,
    #[serde(rename = "Over Budget")]
    OverBudget,
}

impl BudgetStatus {
    /// Classify a percentage of budget used (thresholds are exclusive)
    pub fn from_percentage(percentage_used: f64) -> Self {
        if percentage_used > 100.0 {
            Self::OverBudget
        } else if percentage_used > 80.0 {
            Self::Caution
        } else {
            Self::OnTrack
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::Caution => "Caution",
            Self::OverBudget => "Over Budget",
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    /// Year-month label, e.g. `2024-01`
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub monthly_budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
    pub status: BudgetStatus,
}

/// Expense total for one category with its share of all expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBar {
    pub used: f64,
    pub total: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub pie_chart: Vec<PieSlice>,
    pub bar_chart: Vec<BarEntry>,
    pub progress_bar: ProgressBar,
}

/// Derived analysis report. Never stored; recomputed from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub summary: Summary,
    pub budget_analysis: BudgetAnalysis,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub chart_data: ChartData,
    pub transactions_processed: usize,
    pub valid_transactions: usize,
    pub invalid_transactions: usize,
}

impl FinancialMetrics {
    /// The `n` largest expense categories, largest first
    ///
    /// Ties keep their first-occurrence order.
    pub fn top_categories(&self, n: usize) -> Vec<CategoryBreakdown> {
        let mut sorted = self.category_breakdown.clone();
        sorted.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.truncate(n);
        sorted
    }

    /// Whether the breakdown reconciles with the expense total (within a cent)
    pub fn breakdown_is_consistent(&self) -> bool {
        let sum: f64 = self.category_breakdown.iter().map(|c| c.amount).sum();
        (sum - self.summary.total_expenses).abs() <= 0.01 + 1e-9
    }
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The current local month
    pub fn current() -> Self {
        Self::of(chrono::Local::now().date_naive())
    }

    /// The month a date falls in
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid period '{}' (expected YYYY-MM)", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in period '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in period '{}'", s))?;
        Self::new(year, month).ok_or_else(|| format!("Month out of range in period '{}'", s))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Transactions dated within a month, in their original order
pub fn transactions_in_period(transactions: &[Transaction], period: Period) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| period.contains(t.date))
        .cloned()
        .collect()
}

/// Compute metrics labelled with the current month
pub fn compute_metrics(transactions: &[Transaction], budget: f64) -> FinancialMetrics {
    compute_metrics_for_period(transactions, budget, Period::current())
}

/// Compute metrics for a transaction collection and budget
///
/// Malformed records (non-finite or non-positive amount, blank category) are
/// counted as invalid and left out of every aggregate.
pub fn compute_metrics_for_period(
    transactions: &[Transaction],
    budget: f64,
    period: Period,
) -> FinancialMetrics {
    let budget = if budget.is_finite() { budget } else { 0.0 };

    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut valid = 0;

    // Insertion order of first occurrence
    let mut categories: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions.iter().filter(|t| t.is_well_formed()) {
        valid += 1;
        if tx.is_income() {
            income += tx.amount;
            continue;
        }

        expenses += tx.amount;
        match index.get(&tx.category) {
            Some(&i) => categories[i].1 += tx.amount,
            None => {
                index.insert(tx.category.clone(), categories.len());
                categories.push((tx.category.clone(), tx.amount));
            }
        }
    }

    let invalid = transactions.len() - valid;
    if invalid > 0 {
        tracing::debug!(invalid, "Skipped malformed transactions during aggregation");
    }

    let total_income = round2(income);
    let total_expenses = round2(expenses);
    let monthly_budget = round2(budget);
    let percentage_used = round2(percentage_used(expenses, budget));
    let status = BudgetStatus::from_percentage(percentage_used);

    let category_breakdown: Vec<CategoryBreakdown> = categories
        .into_iter()
        .map(|(category, amount)| CategoryBreakdown {
            category,
            amount: round2(amount),
            percentage: round2(amount / expenses * 100.0),
        })
        .collect();

    let chart_data = ChartData {
        pie_chart: category_breakdown
            .iter()
            .map(|c| PieSlice {
                category: c.category.clone(),
                value: c.amount,
            })
            .collect(),
        bar_chart: category_breakdown
            .iter()
            .map(|c| BarEntry {
                category: c.category.clone(),
                amount: c.amount,
            })
            .collect(),
        progress_bar: ProgressBar {
            used: total_expenses,
            total: monthly_budget,
            percentage: percentage_used,
        },
    };

    FinancialMetrics {
        summary: Summary {
            total_income,
            total_expenses,
            net_balance: round2(total_income - total_expenses),
            period: period.to_string(),
        },
        budget_analysis: BudgetAnalysis {
            monthly_budget,
            spent: total_expenses,
            remaining: round2(monthly_budget - total_expenses),
            percentage_used,
            status,
        },
        category_breakdown,
        chart_data,
        transactions_processed: transactions.len(),
        valid_transactions: valid,
        invalid_transactions: invalid,
    }
}

fn percentage_used(spent: f64, budget: f64) -> f64 {
    if spent <= 0.0 {
        0.0
    } else if budget <= 0.0 {
        PERCENTAGE_CAP
    } else {
        let ratio = spent / budget * 100.0;
        if ratio.is_finite() {
            ratio
        } else {
            PERCENTAGE_CAP
        }
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        // Magnitudes this large carry no fractional cents
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    fn tx(kind: TransactionType, category: &str, amount: f64) -> Transaction {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        Transaction {
            id: COUNTER.fetch_add(1, Ordering::SeqCst).to_string(),
            kind,
            category: category.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            notes: None,
        }
    }

    fn expense(category: &str, amount: f64) -> Transaction {
        tx(TransactionType::Expense, category, amount)
    }

    fn income(category: &str, amount: f64) -> Transaction {
        tx(TransactionType::Income, category, amount)
    }

    fn period() -> Period {
        Period::new(2024, 1).unwrap()
    }

    #[test]
    fn test_basic_scenario() {
        let transactions = vec![
            expense("Food", 300.0),
            expense("Transport", 200.0),
            income("Salary", 2000.0),
        ];

        let m = compute_metrics_for_period(&transactions, 1000.0, period());

        assert_eq!(m.summary.total_income, 2000.0);
        assert_eq!(m.summary.total_expenses, 500.0);
        assert_eq!(m.summary.net_balance, 1500.0);
        assert_eq!(m.summary.period, "2024-01");
        assert_eq!(m.budget_analysis.monthly_budget, 1000.0);
        assert_eq!(m.budget_analysis.spent, 500.0);
        assert_eq!(m.budget_analysis.remaining, 500.0);
        assert_eq!(m.budget_analysis.percentage_used, 50.0);
        assert_eq!(m.budget_analysis.status, BudgetStatus::OnTrack);
        assert_eq!(
            m.category_breakdown,
            vec![
                CategoryBreakdown {
                    category: "Food".into(),
                    amount: 300.0,
                    percentage: 60.0
                },
                CategoryBreakdown {
                    category: "Transport".into(),
                    amount: 200.0,
                    percentage: 40.0
                },
            ]
        );
        assert_eq!(m.transactions_processed, 3);
        assert_eq!(m.valid_transactions, 3);
        assert_eq!(m.invalid_transactions, 0);
    }

    #[test]
    fn test_empty_collection() {
        let m = compute_metrics_for_period(&[], 2000.0, period());
        assert_eq!(m.summary.total_income, 0.0);
        assert_eq!(m.summary.total_expenses, 0.0);
        assert_eq!(m.budget_analysis.percentage_used, 0.0);
        assert_eq!(m.budget_analysis.remaining, 2000.0);
        assert_eq!(m.budget_analysis.status, BudgetStatus::OnTrack);
        assert!(m.category_breakdown.is_empty());
        assert!(m.chart_data.pie_chart.is_empty());
    }

    #[test]
    fn test_status_boundaries() {
        let cases = [
            (800.0, 80.0, BudgetStatus::OnTrack),
            (800.1, 80.01, BudgetStatus::Caution),
            (1000.0, 100.0, BudgetStatus::Caution),
            (1000.1, 100.01, BudgetStatus::OverBudget),
        ];

        for (spent, expected_pct, expected_status) in cases {
            let m = compute_metrics_for_period(&[expense("Shopping", spent)], 1000.0, period());
            assert_eq!(m.budget_analysis.percentage_used, expected_pct, "spent {}", spent);
            assert_eq!(m.budget_analysis.status, expected_status, "spent {}", spent);
        }
    }

    #[test]
    fn test_status_from_percentage() {
        assert_eq!(BudgetStatus::from_percentage(0.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percentage(80.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percentage(80.01), BudgetStatus::Caution);
        assert_eq!(BudgetStatus::from_percentage(100.0), BudgetStatus::Caution);
        assert_eq!(BudgetStatus::from_percentage(100.01), BudgetStatus::OverBudget);
    }

    #[test]
    fn test_zero_budget_with_spending_is_capped() {
        let m = compute_metrics_for_period(&[expense("Shopping", 10.0)], 0.0, period());
        assert_eq!(m.budget_analysis.percentage_used, PERCENTAGE_CAP);
        assert_eq!(m.budget_analysis.status, BudgetStatus::OverBudget);
        assert_eq!(m.budget_analysis.remaining, -10.0);
        assert_eq!(m.chart_data.progress_bar.percentage, PERCENTAGE_CAP);

        // Stays serializable as a number
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["budget_analysis"]["percentage_used"], 999.99);
    }

    #[test]
    fn test_zero_budget_without_spending() {
        let m = compute_metrics_for_period(&[income("Income", 10.0)], 0.0, period());
        assert_eq!(m.budget_analysis.percentage_used, 0.0);
        assert_eq!(m.budget_analysis.status, BudgetStatus::OnTrack);
    }

    #[test]
    fn test_large_overspend_reports_exact_ratio() {
        let m = compute_metrics_for_period(&[expense("Travel", 5000.0)], 100.0, period());
        assert_eq!(m.budget_analysis.percentage_used, 5000.0);
        assert_eq!(m.chart_data.progress_bar.percentage, 5000.0);
        assert_eq!(m.budget_analysis.status, BudgetStatus::OverBudget);
    }

    #[test]
    fn test_vanishing_budget_stays_finite() {
        let m = compute_metrics_for_period(&[expense("Travel", 5000.0)], 1e-308, period());
        assert_eq!(m.budget_analysis.percentage_used, PERCENTAGE_CAP);
        assert_eq!(m.budget_analysis.status, BudgetStatus::OverBudget);
    }

    #[test]
    fn test_breakdown_keeps_first_occurrence_order() {
        let transactions = vec![
            expense("Shopping", 5.0),
            expense("Travel", 100.0),
            expense("Shopping", 10.0),
            expense("Education", 1.0),
        ];
        let m = compute_metrics_for_period(&transactions, 1000.0, period());
        let order: Vec<&str> = m
            .category_breakdown
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(order, vec!["Shopping", "Travel", "Education"]);
        assert_eq!(m.category_breakdown[0].amount, 15.0);
    }

    #[test]
    fn test_breakdown_reconciles_with_totals() {
        let transactions = vec![
            expense("A", 10.0 / 3.0),
            expense("B", 10.0 / 3.0),
            expense("C", 10.0 / 3.0),
            expense("A", 0.1),
            expense("B", 0.2),
            income("Income", 99.99),
        ];
        let m = compute_metrics_for_period(&transactions, 50.0, period());

        assert!(m.breakdown_is_consistent());
        let pct: f64 = m.category_breakdown.iter().map(|c| c.percentage).sum();
        assert!((pct - 100.0).abs() < 0.05, "percentages sum to {}", pct);
        assert_eq!(
            m.summary.net_balance,
            round2(m.summary.total_income - m.summary.total_expenses)
        );
    }

    #[test]
    fn test_chart_projections_mirror_breakdown() {
        let transactions = vec![expense("Food", 12.345), expense("Travel", 7.0)];
        let m = compute_metrics_for_period(&transactions, 100.0, period());

        assert_eq!(m.chart_data.pie_chart.len(), m.category_breakdown.len());
        for ((pie, bar), cat) in m
            .chart_data
            .pie_chart
            .iter()
            .zip(&m.chart_data.bar_chart)
            .zip(&m.category_breakdown)
        {
            assert_eq!(pie.category, cat.category);
            assert_eq!(pie.value, cat.amount);
            assert_eq!(bar.category, cat.category);
            assert_eq!(bar.amount, cat.amount);
        }
        assert_eq!(m.chart_data.progress_bar.used, m.budget_analysis.spent);
        assert_eq!(m.chart_data.progress_bar.total, 100.0);
        assert_eq!(
            m.chart_data.progress_bar.percentage,
            m.budget_analysis.percentage_used
        );
    }

    #[test]
    fn test_malformed_transactions_counted_not_summed() {
        let transactions = vec![
            expense("Food", 100.0),
            expense("Food", f64::NAN),
            expense("", 50.0),
            expense("Travel", -20.0),
            income("Income", 500.0),
        ];
        let m = compute_metrics_for_period(&transactions, 1000.0, period());

        assert_eq!(m.transactions_processed, 5);
        assert_eq!(m.valid_transactions, 2);
        assert_eq!(m.invalid_transactions, 3);
        assert_eq!(m.summary.total_expenses, 100.0);
        assert_eq!(m.summary.total_income, 500.0);
        assert_eq!(m.category_breakdown.len(), 1);
    }

    #[test]
    fn test_rounding_happens_at_output() {
        // 0.1 + 0.2 accumulates to 0.30000000000000004 before rounding
        let transactions = vec![expense("Food", 0.1), expense("Food", 0.2)];
        let m = compute_metrics_for_period(&transactions, 1.0, period());
        assert_eq!(m.summary.total_expenses, 0.3);
        assert_eq!(m.budget_analysis.percentage_used, 30.0);
    }

    #[test]
    fn test_idempotent() {
        let transactions = vec![
            expense("Food", 33.33),
            income("Income", 1200.0),
            expense("Travel", 66.67),
        ];
        let a = compute_metrics_for_period(&transactions, 750.0, period());
        let b = compute_metrics_for_period(&transactions, 750.0, period());
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_categories_sorted() {
        let transactions = vec![
            expense("Small", 1.0),
            expense("Big", 100.0),
            expense("Mid", 10.0),
            expense("AlsoMid", 10.0),
        ];
        let m = compute_metrics_for_period(&transactions, 1000.0, period());
        let top: Vec<String> = m.top_categories(3).into_iter().map(|c| c.category).collect();
        assert_eq!(top, vec!["Big", "Mid", "AlsoMid"]);
    }

    #[test]
    fn test_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&BudgetStatus::OverBudget).unwrap(),
            "\"Over Budget\""
        );
        let parsed: BudgetStatus = serde_json::from_str("\"On Track\"").unwrap();
        assert_eq!(parsed, BudgetStatus::OnTrack);
    }

    #[test]
    fn test_period_parse_and_contains() {
        let p: Period = "2024-03".parse().unwrap();
        assert_eq!(p.to_string(), "2024-03");
        assert!(p.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!("2024-13".parse::<Period>().is_err());
        assert!("March".parse::<Period>().is_err());
    }

    #[test]
    fn test_transactions_in_period() {
        let mut feb = expense("Food", 10.0);
        feb.date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let transactions = vec![expense("Food", 5.0), feb];

        let jan = transactions_in_period(&transactions, period());
        assert_eq!(jan.len(), 1);
        assert_eq!(jan[0].amount, 5.0);
    }
}
