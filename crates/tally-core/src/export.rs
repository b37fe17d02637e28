//! Transaction export to JSON and CSV

use chrono::NaiveDate;
use csv::Writer;

use crate::error::{Error, Result};
use crate::import::{FileFormat, CSV_HEADER};
use crate::models::Transaction;

/// Serialize transactions in the given format
pub fn export(transactions: &[Transaction], format: FileFormat) -> Result<String> {
    match format {
        FileFormat::Json => export_json(transactions),
        FileFormat::Csv => export_csv(transactions),
    }
}

/// Pretty-printed JSON array, readable back by the JSON importer
pub fn export_json(transactions: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string_pretty(transactions)?)
}

/// CSV with header `Date,Type,Category,Amount,Notes`
pub fn export_csv(transactions: &[Transaction]) -> Result<String> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for tx in transactions {
        wtr.write_record([
            tx.date.format("%Y-%m-%d").to_string(),
            tx.kind.as_str().to_string(),
            tx.category.clone(),
            tx.amount.to_string(),
            tx.notes.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
}

/// Default export file name, e.g. `budget-tracker-2024-01-15.json`
pub fn default_export_filename(format: FileFormat, date: NaiveDate) -> String {
    format!("budget-tracker-{}.{}", date.format("%Y-%m-%d"), format.as_str())
}
