use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{PivotError, Result};
use crate::models::PivotedSummary;

/// A directory destination gets `result_file` inside it; anything else is the file itself.
pub fn resolve_destination(destination: &Path, result_file: &str) -> PathBuf {
    if destination.is_dir() {
        destination.join(result_file)
    } else {
        destination.to_path_buf()
    }
}

fn format_amount(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

/// Comma-delimited bytes with a header row and no row index. Nulls are empty fields.
pub fn to_csv_bytes(summary: &PivotedSummary) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(summary.columns())?;
    for row in &summary.rows {
        let mut record = vec![
            row.user_id.clone(),
            row.year_month.clone(),
            row.bank_name.clone().unwrap_or_default(),
        ];
        record.extend(row.amounts.iter().map(|a| format_amount(*a)));
        wtr.write_record(&record)?;
    }
    wtr.into_inner().map_err(|e| PivotError::Io(e.into_error()))
}

/// Persist the summary when a destination is given, then hand it back untouched.
pub fn write(
    summary: PivotedSummary,
    destination: Option<&Path>,
    result_file: &str,
) -> Result<PivotedSummary> {
    let Some(destination) = destination else {
        return Ok(summary);
    };
    let target = resolve_destination(destination, result_file);
    let bytes = to_csv_bytes(&summary)?;
    if let Err(e) = std::fs::write(&target, bytes) {
        error!("failed to write {}: {e}", target.display());
        return Err(e.into());
    }
    info!("wrote {} rows to {}", summary.rows.len(), target.display());
    Ok(summary)
}
