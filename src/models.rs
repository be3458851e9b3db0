pub const BANK_ID: &str = "bank_id";
pub const BANK_NAME: &str = "bank_name";
pub const TRANSACTION_ID: &str = "transaction_id";
pub const USER_ID: &str = "user_id";
pub const TRANSACTION_NAME_RAW: &str = "transaction_name_raw";
pub const TRANSACTION_NAME_TREATED: &str = "transaction_name_treated";
pub const TRANSACTION_AMOUNT: &str = "transaction_amount";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const YEAR_MONTH: &str = "year_month";

pub const BANK_COLUMNS: &[&str] = &[BANK_NAME, BANK_ID];

pub const TRANSACTION_COLUMNS: &[&str] = &[
    TRANSACTION_ID,
    USER_ID,
    TRANSACTION_NAME_RAW,
    TRANSACTION_NAME_TREATED,
    TRANSACTION_AMOUNT,
    YEAR,
    MONTH,
    DAY,
    BANK_ID,
];

/// Materialized delimited-text table. Every cell is text; empty fields are `None`.
/// `origin[i]` is the source-file data row that produced `rows[i]`; empty means
/// rows map one to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub origin: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            origin: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 0-based source row behind row `i` of a table with the given `origin`.
pub fn source_row(origin: &[usize], i: usize) -> usize {
    origin.get(i).copied().unwrap_or(i)
}

/// One (user, month, bank) group of the pivot. `amounts[i]` belongs to
/// `PivotedSummary::categories[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub user_id: String,
    pub year_month: String,
    pub bank_name: Option<String>,
    pub amounts: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotedSummary {
    pub categories: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl PivotedSummary {
    /// Key columns followed by one column per category.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = vec![
            USER_ID.to_string(),
            YEAR_MONTH.to_string(),
            BANK_NAME.to_string(),
        ];
        cols.extend(self.categories.iter().cloned());
        cols
    }
}

#[cfg(test)]
impl PivotedSummary {
    pub fn get(&self, row: usize, category: &str) -> Option<f64> {
        let idx = self.categories.iter().position(|c| c == category)?;
        self.rows.get(row)?.amounts.get(idx).copied().flatten()
    }
}
