//! Import/export command implementations

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tally_core::{default_export_filename, AppState, FileFormat, KeyValueStore};

/// Pick the format from the flag, then the extension, then the content
fn resolve_format(flag: Option<&str>, path: &Path, content: &str) -> Result<FileFormat> {
    match flag {
        Some(f) => f.parse().map_err(|e: String| anyhow!(e)),
        None => Ok(FileFormat::from_path(path).unwrap_or_else(|| FileFormat::sniff(content))),
    }
}

pub fn cmd_import<S: KeyValueStore>(state: &mut AppState<S>, file: &Path, format: Option<&str>) -> Result<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let format = resolve_format(format, file, &content)?;

    println!("📥 Importing {} ({})...", file.display(), format);

    let stats = state
        .import(&content, format)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("   Imported: {}", stats.imported);
    if stats.skipped_duplicates > 0 {
        println!("   Skipped (already present): {}", stats.skipped_duplicates);
    }
    if stats.skipped_invalid > 0 {
        println!("   ⚠️  Skipped (malformed): {}", stats.skipped_invalid);
    }
    println!("✅ Import complete");

    Ok(())
}

pub fn cmd_export<S: KeyValueStore>(state: &AppState<S>, file: Option<&Path>, format: &str) -> Result<()> {
    let format: FileFormat = format.parse().map_err(|e: String| anyhow!(e))?;
    let content = state.export(format).context("Failed to export transactions")?;

    let path = match file {
        Some(p) => p.to_path_buf(),
        None => default_export_filename(format, chrono::Local::now().date_naive()).into(),
    };

    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "📤 Exported {} transactions to {}",
        state.transactions().len(),
        path.display()
    );

    Ok(())
}
