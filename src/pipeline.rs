use std::fmt;
use std::path::Path;

use tracing::{error, info};

use crate::error::Result;
use crate::models::PivotedSummary;
use crate::{reader, sink, transform};

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_RESULT_FILE: &str = "RESULT.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Reading,
    Transforming,
    Loading,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Transforming => "transforming",
            Self::Loading => "loading",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Read → transform → load. Holds only configuration; every run starts fresh.
#[derive(Debug, Clone)]
pub struct Pipeline {
    delimiter: u8,
    result_file: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipeline(delimiter='{}')", self.delimiter as char)
    }
}

/// Log a failure against the stage it happened in and pass it through.
fn in_stage<T>(stage: &mut Stage, next: Stage, result: Result<T>) -> Result<T> {
    *stage = next;
    result.inspect_err(|e| {
        error!(stage = %next, "pipeline failed: {e}");
        *stage = Stage::Failed;
    })
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            result_file: DEFAULT_RESULT_FILE.to_string(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_result_file(mut self, result_file: impl Into<String>) -> Self {
        self.result_file = result_file.into();
        self
    }

    pub fn result_file(&self) -> &str {
        &self.result_file
    }

    pub fn run(
        &self,
        bank_path: &Path,
        transactions_path: &Path,
        destination: Option<&Path>,
    ) -> Result<PivotedSummary> {
        let mut stage = Stage::Idle;

        let joined = in_stage(
            &mut stage,
            Stage::Reading,
            reader::read(bank_path, transactions_path, self.delimiter),
        )?;
        let summary = in_stage(&mut stage, Stage::Transforming, transform::transform(joined))?;
        let summary = in_stage(
            &mut stage,
            Stage::Loading,
            sink::write(summary, destination, &self.result_file),
        )?;

        stage = Stage::Done;
        info!(
            stage = %stage,
            "pipeline finished: {} rows, {} categories",
            summary.rows.len(),
            summary.categories.len()
        );
        Ok(summary)
    }

    /// Run only the read stage and report how many joined rows it produced.
    pub fn check(&self, bank_path: &Path, transactions_path: &Path) -> Result<usize> {
        let mut stage = Stage::Idle;
        let joined = in_stage(
            &mut stage,
            Stage::Reading,
            reader::read(bank_path, transactions_path, self.delimiter),
        )?;
        info!("check passed: {} joined rows", joined.len());
        Ok(joined.len())
    }
}
