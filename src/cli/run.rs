use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::pipeline_for;
use crate::error::Result;
use crate::fmt::cell;
use crate::models::PivotedSummary;
use crate::settings::Settings;
use crate::sink::resolve_destination;

pub fn run(
    settings: &Settings,
    bank: &Path,
    transactions: &Path,
    delimiter: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let pipeline = pipeline_for(settings, delimiter)?;
    let summary = pipeline.run(bank, transactions, output)?;

    println!("{}", format_summary(&summary));
    if let Some(dest) = output {
        let written = resolve_destination(dest, pipeline.result_file());
        println!("{}", format!("Wrote {}", written.display()).green());
    }
    Ok(())
}

pub fn format_summary(summary: &PivotedSummary) -> String {
    if summary.rows.is_empty() {
        return "No transactions to summarize.".to_string();
    }

    let mut table = Table::new();
    table.set_header(summary.columns());
    for row in &summary.rows {
        let mut cells = vec![
            Cell::new(&row.user_id),
            Cell::new(&row.year_month),
            Cell::new(row.bank_name.as_deref().unwrap_or("")),
        ];
        cells.extend(
            row.amounts
                .iter()
                .map(|a| Cell::new(cell(*a)).set_alignment(CellAlignment::Right)),
        );
        table.add_row(cells);
    }
    table.to_string()
}
