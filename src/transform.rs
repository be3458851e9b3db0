use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::error::{PivotError, Result};
use crate::models::{
    source_row, PivotedSummary, SummaryRow, Table, BANK_ID, BANK_NAME, DAY, MONTH,
    TRANSACTION_AMOUNT, TRANSACTION_ID, TRANSACTION_NAME_TREATED, USER_ID, YEAR,
};

const IDENTIFIER_COLUMNS: &[&str] = &[TRANSACTION_ID, USER_ID, YEAR, MONTH, DAY, BANK_ID];

fn require(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| PivotError::SchemaValidation {
            table: "joined",
            missing: vec![name.to_string()],
        })
}

/// `row` is the joined-table position; the error carries the 1-based
/// transactions-file data row it came from.
fn malformed(table_origin: &[usize], column: &str, row: usize, reason: String) -> PivotError {
    PivotError::MalformedField {
        column: column.to_string(),
        row: source_row(table_origin, row) + 1,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Normalization steps
// ---------------------------------------------------------------------------

/// Upper-case every treated transaction name in place.
pub fn uppercase_categories(table: &mut Table) -> Result<()> {
    let idx = require(table, TRANSACTION_NAME_TREATED)?;
    for (i, row) in table.rows.iter_mut().enumerate() {
        match row[idx].as_mut() {
            Some(name) => *name = name.to_uppercase(),
            None => {
                return Err(malformed(
                    &table.origin,
                    TRANSACTION_NAME_TREATED,
                    i,
                    "expected text, found an empty value".to_string(),
                ))
            }
        }
    }
    Ok(())
}

/// Parse a decimal-comma amount such as `10,50`. Only finite values count.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// One parsed amount per row, in row order.
pub fn parse_amounts(table: &Table) -> Result<Vec<f64>> {
    let idx = require(table, TRANSACTION_AMOUNT)?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let raw = row[idx].as_deref().ok_or_else(|| {
                malformed(
                    &table.origin,
                    TRANSACTION_AMOUNT,
                    i,
                    "expected a number, found an empty value".to_string(),
                )
            })?;
            parse_amount(raw).ok_or_else(|| {
                malformed(
                    &table.origin,
                    TRANSACTION_AMOUNT,
                    i,
                    format!("cannot parse {raw:?} as a finite number"),
                )
            })
        })
        .collect()
}

/// Identifier and calendar cells are already text; nulls become empty text.
pub fn coerce_identifiers(table: &mut Table) -> Result<()> {
    let indices = IDENTIFIER_COLUMNS
        .iter()
        .map(|name| require(table, name))
        .collect::<Result<Vec<_>>>()?;
    for row in &mut table.rows {
        for &idx in &indices {
            row[idx].get_or_insert_with(String::new);
        }
    }
    Ok(())
}

/// `year-month` exactly as written in the source, without zero-padding.
pub fn derive_year_month(table: &Table) -> Result<Vec<String>> {
    let year = require(table, YEAR)?;
    let month = require(table, MONTH)?;
    Ok(table
        .rows
        .iter()
        .map(|row| {
            format!(
                "{}-{}",
                row[year].as_deref().unwrap_or_default(),
                row[month].as_deref().unwrap_or_default()
            )
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey {
    user_id: String,
    year_month: String,
    bank_name: Option<String>,
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.user_id
            .cmp(&other.user_id)
            .then_with(|| self.year_month.cmp(&other.year_month))
            .then_with(|| match (&self.bank_name, &other.bank_name) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sum `amounts` per (user, month, bank) group and category. Rows and
/// category columns come out sorted; a null bank name sorts last.
pub fn pivot(table: &Table, amounts: &[f64], year_month: &[String]) -> Result<PivotedSummary> {
    let user = require(table, USER_ID)?;
    let bank = require(table, BANK_NAME)?;
    let category = require(table, TRANSACTION_NAME_TREATED)?;

    let mut categories: BTreeSet<String> = BTreeSet::new();
    let mut groups: BTreeMap<GroupKey, BTreeMap<String, f64>> = BTreeMap::new();

    for (i, row) in table.rows.iter().enumerate() {
        let label = row[category].clone().ok_or_else(|| {
            malformed(
                &table.origin,
                TRANSACTION_NAME_TREATED,
                i,
                "expected text, found an empty value".to_string(),
            )
        })?;
        let key = GroupKey {
            user_id: row[user].clone().unwrap_or_default(),
            year_month: year_month[i].clone(),
            bank_name: row[bank].clone(),
        };
        *groups
            .entry(key)
            .or_default()
            .entry(label.clone())
            .or_insert(0.0) += amounts[i];
        categories.insert(label);
    }

    let categories: Vec<String> = categories.into_iter().collect();
    let rows = groups
        .into_iter()
        .map(|(key, cells)| SummaryRow {
            amounts: categories.iter().map(|c| cells.get(c).copied()).collect(),
            user_id: key.user_id,
            year_month: key.year_month,
            bank_name: key.bank_name,
        })
        .collect();

    Ok(PivotedSummary { categories, rows })
}

/// Normalize the joined table and pivot it into the spending summary.
pub fn transform(mut joined: Table) -> Result<PivotedSummary> {
    info!("transforming {} joined rows", joined.len());

    uppercase_categories(&mut joined)?;
    let amounts = parse_amounts(&joined)?;
    coerce_identifiers(&mut joined)?;
    let year_month = derive_year_month(&joined)?;
    let summary = pivot(&joined, &amounts, &year_month)?;

    debug!(
        "pivoted into {} rows x {} categories",
        summary.rows.len(),
        summary.categories.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TRANSACTION_COLUMNS;

    /// (user, category, amount, year, month, bank_name)
    type Txn<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str, Option<&'a str>);

    fn joined(txns: &[Txn]) -> Table {
        let mut columns: Vec<String> = TRANSACTION_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.push(BANK_NAME.to_string());
        let mut table = Table::new(columns);
        let cell = |v: &str| if v.is_empty() { None } else { Some(v.to_string()) };
        for (i, &(user, cat, amount, year, month, bank)) in txns.iter().enumerate() {
            table.rows.push(vec![
                Some(format!("t{i}")),
                cell(user),
                Some("raw".to_string()),
                cell(cat),
                cell(amount),
                cell(year),
                cell(month),
                Some("05".to_string()),
                Some("1".to_string()),
                bank.map(|b| b.to_string()),
            ]);
        }
        table
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10,50"), Some(10.5));
        assert_eq!(parse_amount("-42,5"), Some(-42.5));
        assert_eq!(parse_amount(" 7 "), Some(7.0));
        assert_eq!(parse_amount("12.25"), Some(12.25));
        assert_eq!(parse_amount("1,234,56"), None);
        assert_eq!(parse_amount("10,50 BRL"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("nan"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("-infinity"), None);
    }

    #[test]
    fn test_single_transaction_example() {
        let table = joined(&[("u1", "food", "10,50", "2023", "01", Some("Acme"))]);
        let summary = transform(table).unwrap();
        assert_eq!(
            summary.columns(),
            vec!["user_id", "year_month", "bank_name", "FOOD"]
        );
        assert_eq!(summary.rows.len(), 1);
        let row = &summary.rows[0];
        assert_eq!(row.user_id, "u1");
        assert_eq!(row.year_month, "2023-01");
        assert_eq!(row.bank_name.as_deref(), Some("Acme"));
        assert_eq!(summary.get(0, "FOOD"), Some(10.5));
    }

    #[test]
    fn test_sums_per_group_and_leaves_missing_cells_null() {
        let table = joined(&[
            ("u1", "food", "10,00", "2023", "01", Some("Acme")),
            ("u1", "Food", "2,50", "2023", "01", Some("Acme")),
            ("u1", "rent", "100", "2023", "02", Some("Acme")),
        ]);
        let summary = transform(table).unwrap();
        assert_eq!(summary.categories, vec!["FOOD", "RENT"]);
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.get(0, "FOOD"), Some(12.5));
        assert_eq!(summary.get(0, "RENT"), None);
        assert_eq!(summary.get(1, "FOOD"), None);
        assert_eq!(summary.get(1, "RENT"), Some(100.0));
    }

    #[test]
    fn test_rows_sorted_by_key_with_null_bank_last() {
        let table = joined(&[
            ("u2", "food", "1", "2023", "01", Some("Acme")),
            ("u1", "food", "1", "2023", "02", None),
            ("u1", "food", "1", "2023", "02", Some("Zeta")),
            ("u1", "food", "1", "2023", "01", Some("Beta")),
        ]);
        let summary = transform(table).unwrap();
        let keys: Vec<(&str, &str, Option<&str>)> = summary
            .rows
            .iter()
            .map(|r| (r.user_id.as_str(), r.year_month.as_str(), r.bank_name.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("u1", "2023-01", Some("Beta")),
                ("u1", "2023-02", Some("Zeta")),
                ("u1", "2023-02", None),
                ("u2", "2023-01", Some("Acme")),
            ]
        );
    }

    #[test]
    fn test_year_month_is_not_padded() {
        let table = joined(&[
            ("u1", "food", "1", "2021", "1", Some("Acme")),
            ("u1", "food", "2", "2021", "01", Some("Acme")),
        ]);
        let summary = transform(table).unwrap();
        let months: Vec<&str> = summary.rows.iter().map(|r| r.year_month.as_str()).collect();
        assert_eq!(months, vec!["2021-01", "2021-1"]);
    }

    #[test]
    fn test_empty_category_is_malformed() {
        let table = joined(&[
            ("u1", "food", "1", "2023", "01", Some("Acme")),
            ("u1", "", "1", "2023", "01", Some("Acme")),
        ]);
        match transform(table).unwrap_err() {
            PivotError::MalformedField { column, row, .. } => {
                assert_eq!(column, TRANSACTION_NAME_TREATED);
                assert_eq!(row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_amount_is_malformed() {
        let table = joined(&[("u1", "food", "ten", "2023", "01", Some("Acme"))]);
        let err = transform(table).unwrap_err();
        assert!(matches!(err, PivotError::MalformedField { ref column, .. } if column == TRANSACTION_AMOUNT));
        assert!(err.to_string().contains("\"ten\""));
    }

    #[test]
    fn test_nan_amount_is_malformed() {
        let table = joined(&[
            ("u1", "food", "NaN", "2023", "01", Some("Acme")),
            ("u1", "food", "5", "2023", "01", Some("Acme")),
        ]);
        assert!(matches!(
            transform(table),
            Err(PivotError::MalformedField { ref column, row: 1, .. }) if column == TRANSACTION_AMOUNT
        ));
    }

    #[test]
    fn test_malformed_row_points_at_transactions_file() {
        let mut table = joined(&[
            ("u1", "food", "1", "2023", "01", Some("Acme")),
            ("u1", "food", "1", "2023", "01", Some("Acme Two")),
            ("u2", "food", "bad", "2023", "01", Some("Acme")),
        ]);
        table.origin = vec![0, 0, 1];
        match transform(table).unwrap_err() {
            PivotError::MalformedField { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_amount_is_malformed() {
        let table = joined(&[("u1", "food", "", "2023", "01", Some("Acme"))]);
        assert!(matches!(
            transform(table),
            Err(PivotError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_coerce_identifiers_fills_nulls() {
        let mut table = joined(&[("", "food", "1", "2023", "01", Some("Acme"))]);
        coerce_identifiers(&mut table).unwrap();
        let user = table.column_index(USER_ID).unwrap();
        assert_eq!(table.rows[0][user].as_deref(), Some(""));
    }

    #[test]
    fn test_missing_bank_name_column() {
        let mut table = joined(&[("u1", "food", "1", "2023", "01", Some("Acme"))]);
        table.columns.pop();
        for row in &mut table.rows {
            row.pop();
        }
        assert!(matches!(
            transform(table),
            Err(PivotError::SchemaValidation { table: "joined", .. })
        ));
    }

    #[test]
    fn test_empty_table_gives_empty_summary() {
        let summary = transform(joined(&[])).unwrap();
        assert!(summary.rows.is_empty());
        assert!(summary.categories.is_empty());
        assert_eq!(summary.columns().len(), 3);
    }
}
