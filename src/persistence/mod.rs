use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::models::{Budget, Expense};

/// Load expenses from a JSON array file.
///
/// A missing or blank file holds no expenses. Each element is decoded
/// leniently, but one that can't be decoded at all fails the whole load.
pub(crate) fn load_expenses(path: &Path) -> Result<Vec<Expense>> {
    let Some(values) = read_array(path)? else {
        return Ok(Vec::new());
    };

    let expenses = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            Expense::from_value(value)
                .with_context(|| format!("{}: expense #{}", path.display(), i + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!("loaded {} expenses from {}", expenses.len(), path.display());
    Ok(expenses)
}

pub(crate) fn save_expenses(path: &Path, expenses: &[Expense]) -> Result<()> {
    let values = expenses
        .iter()
        .map(|e| Value::Object(e.to_record()))
        .collect();
    write_array(path, values)?;
    tracing::debug!("saved {} expenses to {}", expenses.len(), path.display());
    Ok(())
}

/// Load budgets. Same empty-file rules as [`load_expenses`].
pub(crate) fn load_budgets(path: &Path) -> Result<Vec<Budget>> {
    let Some(values) = read_array(path)? else {
        return Ok(Vec::new());
    };

    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let Value::Object(record) = value else {
                anyhow::bail!("{}: budget #{} is not an object", path.display(), i + 1);
            };
            Budget::from_record(record)
                .with_context(|| format!("{}: budget #{}", path.display(), i + 1))
        })
        .collect()
}

pub(crate) fn save_budgets(path: &Path, budgets: &[Budget]) -> Result<()> {
    let values = budgets
        .iter()
        .map(|b| Value::Object(b.to_record()))
        .collect();
    write_array(path, values)
}

/// `None` when there is nothing stored yet.
fn read_array(path: &Path) -> Result<Option<Vec<Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    match value {
        Value::Array(values) => Ok(Some(values)),
        _ => anyhow::bail!("{} does not contain a JSON array", path.display()),
    }
}

/// Whole-file write: serialize to a sibling file, then rename over the target.
fn write_array(path: &Path, values: Vec<Value>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let text = serde_json::to_string_pretty(&Value::Array(values))
        .context("Failed to serialize records")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, text)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
