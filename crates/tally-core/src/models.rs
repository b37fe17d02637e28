//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Monthly budget used when nothing valid has been persisted
pub const DEFAULT_BUDGET: f64 = 2000.0;

/// Whether a transaction adds to or draws from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dated income or expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    /// Whether this record can take part in aggregation
    ///
    /// Records loaded from disk or an import bypass form validation, so the
    /// engine re-checks the fields that would corrupt a sum.
    pub fn is_well_formed(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0 && !self.category.trim().is_empty()
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// Closed set of transaction categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FoodDining,
    Transportation,
    Shopping,
    Entertainment,
    BillsUtilities,
    Healthcare,
    Education,
    Travel,
    Income,
    Other,
}

struct CategoryInfo {
    category: Category,
    label: &'static str,
    color: &'static str,
    aliases: &'static [&'static str],
}

const CATEGORY_TABLE: &[CategoryInfo] = &[
    CategoryInfo {
        category: Category::FoodDining,
        label: "Food & Dining",
        color: "#f97316",
        aliases: &["food", "dining", "food and dining", "groceries", "restaurants"],
    },
    CategoryInfo {
        category: Category::Transportation,
        label: "Transportation",
        color: "#3b82f6",
        aliases: &["transport", "travel & transport", "gas", "fuel"],
    },
    CategoryInfo {
        category: Category::Shopping,
        label: "Shopping",
        color: "#a855f7",
        aliases: &["retail"],
    },
    CategoryInfo {
        category: Category::Entertainment,
        label: "Entertainment",
        color: "#ec4899",
        aliases: &["fun", "subscriptions"],
    },
    CategoryInfo {
        category: Category::BillsUtilities,
        label: "Bills & Utilities",
        color: "#eab308",
        aliases: &["bills", "utilities", "bills and utilities", "rent"],
    },
    CategoryInfo {
        category: Category::Healthcare,
        label: "Healthcare",
        color: "#ef4444",
        aliases: &["health", "medical"],
    },
    CategoryInfo {
        category: Category::Education,
        label: "Education",
        color: "#22c55e",
        aliases: &["school", "tuition"],
    },
    CategoryInfo {
        category: Category::Travel,
        label: "Travel",
        color: "#6366f1",
        aliases: &["vacation", "trip"],
    },
    CategoryInfo {
        category: Category::Income,
        label: "Income",
        color: "#10b981",
        aliases: &["salary", "paycheck", "wages"],
    },
    CategoryInfo {
        category: Category::Other,
        label: "Other",
        color: "#6b7280",
        aliases: &["misc", "miscellaneous", "uncategorized"],
    },
];

impl Category {
    fn info(&self) -> &'static CategoryInfo {
        CATEGORY_TABLE
            .iter()
            .find(|info| info.category == *self)
            .unwrap_or(&CATEGORY_TABLE[CATEGORY_TABLE.len() - 1])
    }

    /// All categories in display order
    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORY_TABLE.iter().map(|info| info.category)
    }

    /// Human-readable label, also the value stored on transactions
    pub fn label(&self) -> &'static str {
        self.info().label
    }

    /// Chart color as a hex string
    pub fn color(&self) -> &'static str {
        self.info().color
    }

    /// Resolve a label or alias, case-insensitively
    pub fn parse(s: &str) -> Option<Category> {
        let needle = s.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        CATEGORY_TABLE
            .iter()
            .find(|info| info.label.to_lowercase() == needle || info.aliases.contains(&needle.as_str()))
            .map(|info| info.category)
    }

    /// Resolve a label, mapping anything unknown to `Other`
    pub fn normalize(s: &str) -> Category {
        Self::parse(s).unwrap_or(Category::Other)
    }

    /// Categories offered for a transaction type
    ///
    /// Income is only offered for income transactions, everything else only
    /// for expenses.
    pub fn for_type(kind: TransactionType) -> Vec<Category> {
        Self::all()
            .filter(|c| (kind == TransactionType::Income) == (*c == Category::Income))
            .collect()
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let labels: Vec<&str> = CATEGORY_TABLE.iter().map(|info| info.label).collect();
            format!("Unknown category '{}' (expected one of: {})", s, labels.join(", "))
        })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// User-entered fields for a new or edited transaction
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl TransactionInput {
    /// Validate the input and build a transaction with the given id
    ///
    /// Rejects non-positive amounts and missing category or date. Known
    /// category aliases are normalized to their label; unknown categories are
    /// rejected.
    pub fn into_transaction(self, id: String) -> Result<Transaction> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Amount must be a positive number, got {}",
                self.amount
            )));
        }

        if self.category.trim().is_empty() {
            return Err(Error::InvalidInput("Category is required".into()));
        }
        let category: Category = self.category.parse().map_err(Error::InvalidInput)?;

        let date = self
            .date
            .ok_or_else(|| Error::InvalidInput("Date is required".into()))?;

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Transaction {
            id,
            kind: self.kind,
            category: category.label().to_string(),
            amount: self.amount,
            date,
            notes,
        })
    }
}

/// Numeric ids above this are not clock timestamps (year 33658) and never
/// collide with generated ids
const MAX_TIMESTAMP_ID: i64 = 1_000_000_000_000_000;

/// Generates transaction ids from the millisecond clock
///
/// Ids are decimal strings that strictly increase within a generator, even
/// when several are requested in the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a generator so it never reissues one of the given numeric ids
    pub fn after<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let last = existing
            .into_iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .filter(|id| *id <= MAX_TIMESTAMP_ID)
            .max()
            .unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last.saturating_add(1));
        self.last.to_string()
    }
}

/// Check that a budget is usable (finite and not negative)
pub fn validate_budget(budget: f64) -> Result<f64> {
    if budget.is_finite() && budget >= 0.0 {
        Ok(budget)
    } else {
        Err(Error::InvalidInput(format!(
            "Budget must be zero or a positive number, got {}",
            budget
        )))
    }
}

/// Parse an ISO date, accepting either `YYYY-MM-DD` or a full RFC 3339
/// timestamp (the calendar date in UTC is kept)
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.naive_utc().date())
    })
}

pub(crate) mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_iso_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}
