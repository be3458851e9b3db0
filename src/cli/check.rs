use std::path::Path;

use colored::Colorize;

use crate::cli::pipeline_for;
use crate::error::Result;
use crate::settings::Settings;

pub fn run(
    settings: &Settings,
    bank: &Path,
    transactions: &Path,
    delimiter: Option<&str>,
) -> Result<()> {
    let rows = pipeline_for(settings, delimiter)?.check(bank, transactions)?;
    println!("{} {rows} joined rows", "OK".green().bold());
    Ok(())
}
