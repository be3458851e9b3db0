use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{source_row, Table, BANK_ID, BANK_NAME};
use crate::validate::{validate_input_path, validate_required_columns};

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn cell(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Parse a headed delimited file. Rows whose width differs from the header fail.
pub fn read_table(file_path: &Path, delimiter: u8) -> Result<Table> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(std::io::BufReader::new(file));

    let columns = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = Table::new(columns);
    for result in rdr.records() {
        let record = result?;
        table.rows.push(record.iter().map(cell).collect());
    }
    if table.is_empty() {
        warn!("{} has no data rows", file_path.display());
    }
    debug!(
        "read {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        file_path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Left join
// ---------------------------------------------------------------------------

/// Keep every left row in order, paired with each right row sharing `key`.
/// Unmatched rows get null right-hand cells; null keys never match.
///
/// A non-key column present on both sides keeps its name on the left and gets
/// `_y` on the right, except for columns in `right_owned`: those keep their
/// name on the right and the left copy becomes `_x`.
pub fn left_join(left: &Table, right: &Table, key: &str, right_owned: &[&str]) -> Table {
    let left_key = left.column_index(key);
    let right_key = right.column_index(key);

    let right_cols: Vec<usize> = (0..right.columns.len())
        .filter(|&i| Some(i) != right_key)
        .collect();

    let shared = |name: &str| name != key && left.has_column(name) && right.has_column(name);
    let owned = |name: &str| right_owned.iter().any(|o| *o == name);

    let mut columns: Vec<String> = left
        .columns
        .iter()
        .map(|c| if shared(c) && owned(c) { format!("{c}_x") } else { c.clone() })
        .collect();
    for &i in &right_cols {
        let c = &right.columns[i];
        columns.push(if shared(c) && !owned(c) { format!("{c}_y") } else { c.clone() });
    }

    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    if let Some(rk) = right_key {
        for (row_idx, row) in right.rows.iter().enumerate() {
            if let Some(Some(value)) = row.get(rk) {
                index.entry(value.as_str()).or_default().push(row_idx);
            }
        }
    }

    let mut joined = Table::new(columns);
    for (left_idx, row) in left.rows.iter().enumerate() {
        let origin = source_row(&left.origin, left_idx);
        let matches = left_key
            .and_then(|lk| row.get(lk))
            .and_then(|value| value.as_deref())
            .and_then(|value| index.get(value));
        match matches {
            Some(right_rows) => {
                for &r in right_rows {
                    let mut out = row.clone();
                    out.extend(right_cols.iter().map(|&i| right.rows[r][i].clone()));
                    joined.rows.push(out);
                    joined.origin.push(origin);
                }
            }
            None => {
                let mut out = row.clone();
                out.extend(right_cols.iter().map(|_| None));
                joined.rows.push(out);
                joined.origin.push(origin);
            }
        }
    }
    joined
}

// ---------------------------------------------------------------------------
// Read stage
// ---------------------------------------------------------------------------

/// Validate both sources, load them and left-join transactions onto banks.
pub fn read(bank_path: &Path, transactions_path: &Path, delimiter: u8) -> Result<Table> {
    validate_input_path(bank_path)?;
    validate_input_path(transactions_path)?;

    info!(
        "reading {} and {}",
        bank_path.display(),
        transactions_path.display()
    );
    let bank = read_table(bank_path, delimiter)?;
    let transactions = read_table(transactions_path, delimiter)?;

    validate_required_columns(&bank, &transactions)?;

    Ok(left_join(&transactions, &bank, BANK_ID, &[BANK_NAME]))
}
