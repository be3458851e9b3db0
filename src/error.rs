use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Invalid input: {0} is not a text path")]
    InvalidInputKind(String),

    #[error("Unsupported format: {0} must be a csv file")]
    UnsupportedFormat(String),

    #[error("Schema validation failed: {table} table is missing columns: {}", .missing.join(", "))]
    SchemaValidation {
        table: &'static str,
        missing: Vec<String>,
    },

    #[error("Malformed field {column} on transactions row {row}: {reason}")]
    MalformedField {
        column: String,
        row: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, PivotError>;
