use std::path::Path;

use tracing::error;

use crate::error::{PivotError, Result};
use crate::models::{Table, BANK_COLUMNS, TRANSACTION_COLUMNS};

/// Accept only UTF-8 paths ending in `.csv`. Does not touch the file system.
pub fn validate_input_path(path: &Path) -> Result<bool> {
    let Some(text) = path.to_str() else {
        let shown = path.to_string_lossy().to_string();
        error!("input {shown} is not a text path");
        return Err(PivotError::InvalidInputKind(shown));
    };
    if !text.ends_with(".csv") {
        error!("input {text} is not a csv file");
        return Err(PivotError::UnsupportedFormat(text.to_string()));
    }
    Ok(true)
}

fn missing_columns(table: &Table, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| col.to_string())
        .collect()
}

/// Both tables must expose every required column; extra columns are fine.
pub fn validate_required_columns(bank: &Table, transactions: &Table) -> Result<bool> {
    for (name, table, required) in [
        ("bank", bank, BANK_COLUMNS),
        ("transactions", transactions, TRANSACTION_COLUMNS),
    ] {
        let missing = missing_columns(table, required);
        if !missing.is_empty() {
            error!(table = name, missing = ?missing, "required columns not found");
            return Err(PivotError::SchemaValidation {
                table: name,
                missing,
            });
        }
    }
    Ok(true)
}
