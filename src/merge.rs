//! Sheet selection and merging.
//!
//! Decides, per sheet, whether it carries every required column, concatenates
//! the qualifying sheets into one table, and reports why the others were
//! skipped. Selection never mutates the source workbook.

use serde::Serialize;
use tracing::debug;

use crate::types::{CellValue, MatchMode, RequiredColumns, Table, Workbook};

/// Column-name keywords that mark a column as a date/time candidate.
const DATE_KEYWORDS: [&str; 4] = ["date", "time", "completion", "timestamp"];

/// Why a sheet was left out of the merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SkipReason {
    /// Required columns that had no match among the sheet's headers. When
    /// matching case-insensitively these are reported lowercased.
    MissingColumns(Vec<String>),
    /// The sheet could not be read at all.
    ReadError(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingColumns(missing) => write!(f, "missing: {}", missing.join(", ")),
            SkipReason::ReadError(reason) => write!(f, "read error: {reason}"),
        }
    }
}

/// Result of a selection-and-merge pass over one workbook.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Concatenation of every included sheet. Empty when nothing qualified;
    /// that is a reportable outcome, not an error.
    pub merged: Table,
    pub included: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Decide inclusion for every sheet and concatenate the qualifying ones.
///
/// A sheet is included iff each required column has an exact name match among
/// its headers under `mode`. Sheets that failed to load are skipped with
/// their read error; the failure of one sheet never affects another.
pub fn select_and_merge(
    workbook: &Workbook,
    required: &RequiredColumns,
    mode: MatchMode,
) -> MergeOutcome {
    let mut tables: Vec<&Table> = Vec::new();
    let mut included = Vec::new();
    let mut skipped = Vec::new();

    for sheet in workbook.sheets() {
        let table = match &sheet.table {
            Ok(table) => table,
            Err(reason) => {
                debug!(sheet = %sheet.name, %reason, "sheet skipped: read error");
                skipped.push((sheet.name.clone(), SkipReason::ReadError(reason.clone())));
                continue;
            }
        };

        let missing = missing_required(table.columns(), required, mode);
        if missing.is_empty() {
            debug!(sheet = %sheet.name, rows = table.row_count(), "sheet included");
            included.push(sheet.name.clone());
            tables.push(table);
        } else {
            debug!(sheet = %sheet.name, ?missing, "sheet skipped: missing columns");
            skipped.push((sheet.name.clone(), SkipReason::MissingColumns(missing)));
        }
    }

    MergeOutcome {
        merged: concat_tables(&tables),
        included,
        skipped,
    }
}

/// Required names with no match among `columns` under `mode`.
fn missing_required(columns: &[String], required: &RequiredColumns, mode: MatchMode) -> Vec<String> {
    match mode {
        MatchMode::CaseSensitive => required
            .names()
            .iter()
            .filter(|r| !columns.contains(r))
            .cloned()
            .collect(),
        MatchMode::CaseInsensitive => {
            let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
            required
                .names()
                .iter()
                .map(|r| r.to_lowercase())
                .filter(|r| !lowered.contains(r))
                .collect()
        }
    }
}

/// Concatenate tables row-wise. The merged column set is the union of all
/// source columns in order of first appearance; cells for columns a source
/// table lacks are filled with `Missing`.
fn concat_tables(tables: &[&Table]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for table in tables {
        for column in table.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut merged = Table::new(columns.clone());
    for table in tables {
        let source_index: Vec<Option<usize>> =
            columns.iter().map(|c| table.column_index(c)).collect();
        for row in table.rows() {
            let merged_row = source_index
                .iter()
                .map(|idx| match idx {
                    Some(i) => row[*i].clone(),
                    None => CellValue::Missing,
                })
                .collect();
            merged.push_row(merged_row);
        }
    }
    merged
}

/// Result of looking a column up by label in the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch {
    /// Case-insensitive exact name match.
    Exact(usize),
    /// First column whose name contains the label as a case-insensitive
    /// substring. Tolerates header variants like "Paid In (KES)".
    Partial(usize),
    NotFound,
}

impl ColumnMatch {
    pub fn index(&self) -> Option<usize> {
        match self {
            ColumnMatch::Exact(i) | ColumnMatch::Partial(i) => Some(*i),
            ColumnMatch::NotFound => None,
        }
    }
}

/// Two-phase column lookup: exact case-insensitive match first, substring
/// containment second. Callers must branch on `NotFound` explicitly.
pub fn resolve_column(table: &Table, target: &str) -> ColumnMatch {
    let needle = target.to_lowercase();
    for (i, column) in table.columns().iter().enumerate() {
        if column.to_lowercase() == needle {
            return ColumnMatch::Exact(i);
        }
    }
    for (i, column) in table.columns().iter().enumerate() {
        if column.to_lowercase().contains(&needle) {
            return ColumnMatch::Partial(i);
        }
    }
    ColumnMatch::NotFound
}

/// Columns whose name suggests a date or time, in table order.
pub fn date_column_candidates(table: &Table) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|c| {
            let lowered = c.to_lowercase();
            DATE_KEYWORDS.iter().any(|k| lowered.contains(k))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SheetLoad;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row);
        }
        t
    }

    fn workbook(sheets: Vec<(&str, Result<Table, String>)>) -> Workbook {
        Workbook::new(
            sheets
                .into_iter()
                .map(|(name, table)| SheetLoad {
                    name: name.to_string(),
                    table,
                })
                .collect(),
        )
    }

    #[test]
    fn test_case_insensitive_inclusion() {
        let wb = workbook(vec![(
            "Jan",
            Ok(table(&["PAID IN", "withdrawn", "Balance"], vec![])),
        )]);
        let required = RequiredColumns::parse("Paid In, Withdrawn, Balance").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseInsensitive);
        assert_eq!(outcome.included, vec!["Jan"]);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_case_sensitive_exclusion() {
        let wb = workbook(vec![(
            "Jan",
            Ok(table(&["paid in", "Withdrawn", "Balance"], vec![])),
        )]);
        let required = RequiredColumns::parse("Paid In, Withdrawn, Balance").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseSensitive);
        assert!(outcome.included.is_empty());
        assert_eq!(
            outcome.skipped,
            vec![(
                "Jan".to_string(),
                SkipReason::MissingColumns(vec!["Paid In".to_string()])
            )]
        );
    }

    #[test]
    fn test_missing_columns_reported_lowercase_when_insensitive() {
        let wb = workbook(vec![("Notes", Ok(table(&["Comment"], vec![])))]);
        let required = RequiredColumns::parse("Paid In, Withdrawn, Balance").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseInsensitive);
        assert_eq!(
            outcome.skipped,
            vec![(
                "Notes".to_string(),
                SkipReason::MissingColumns(vec![
                    "paid in".to_string(),
                    "withdrawn".to_string(),
                    "balance".to_string()
                ])
            )]
        );
    }

    #[test]
    fn test_read_error_is_isolated() {
        let wb = workbook(vec![
            ("Bad", Err("corrupt sheet".to_string())),
            ("Jan", Ok(table(&["Paid In"], vec![vec![CellValue::Number(1.0)]]))),
        ]);
        let required = RequiredColumns::parse("Paid In").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseInsensitive);
        assert_eq!(outcome.included, vec!["Jan"]);
        assert_eq!(outcome.merged.row_count(), 1);
        assert_eq!(
            outcome.skipped,
            vec![(
                "Bad".to_string(),
                SkipReason::ReadError("corrupt sheet".to_string())
            )]
        );
    }

    #[test]
    fn test_merge_concatenates_in_sheet_order() {
        let wb = workbook(vec![
            (
                "A",
                Ok(table(&["X"], vec![vec![CellValue::Number(1.0)], vec![CellValue::Number(2.0)]])),
            ),
            ("B", Ok(table(&["X"], vec![vec![CellValue::Number(3.0)]]))),
        ]);
        let required = RequiredColumns::parse("X").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseInsensitive);
        assert_eq!(outcome.merged.row_count(), 3);
        assert_eq!(outcome.merged.cell(0, 0), Some(&CellValue::Number(1.0)));
        assert_eq!(outcome.merged.cell(2, 0), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_merge_unions_columns_with_missing_fill() {
        let wb = workbook(vec![
            ("A", Ok(table(&["X", "Y"], vec![vec![CellValue::Number(1.0), CellValue::Text("a".into())]]))),
            ("B", Ok(table(&["X", "Z"], vec![vec![CellValue::Number(2.0), CellValue::Text("b".into())]]))),
        ]);
        let required = RequiredColumns::parse("X").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseInsensitive);
        assert_eq!(outcome.merged.columns(), &["X", "Y", "Z"]);
        assert_eq!(outcome.merged.cell(0, 2), Some(&CellValue::Missing));
        assert_eq!(outcome.merged.cell(1, 1), Some(&CellValue::Missing));
        assert_eq!(outcome.merged.cell(1, 2), Some(&CellValue::Text("b".into())));
    }

    #[test]
    fn test_zero_match_yields_empty_table() {
        let wb = workbook(vec![("Notes", Ok(table(&["Comment"], vec![])))]);
        let required = RequiredColumns::parse("Paid In").unwrap();

        let outcome = select_and_merge(&wb, &required, MatchMode::CaseInsensitive);
        assert!(outcome.included.is_empty());
        assert!(outcome.merged.is_empty());
    }

    #[test]
    fn test_resolve_column_prefers_exact_match() {
        let t = table(&["Paid In (KES)", "Paid In"], vec![]);
        assert_eq!(resolve_column(&t, "paid in"), ColumnMatch::Exact(1));
    }

    #[test]
    fn test_resolve_column_falls_back_to_substring() {
        let t = table(&["Date", "Paid In (KES)"], vec![]);
        assert_eq!(resolve_column(&t, "Paid In"), ColumnMatch::Partial(1));
    }

    #[test]
    fn test_resolve_column_not_found() {
        let t = table(&["Date", "Balance"], vec![]);
        assert_eq!(resolve_column(&t, "Withdrawn"), ColumnMatch::NotFound);
    }

    #[test]
    fn test_date_column_candidates() {
        let t = table(&["Completion Time", "Details", "TIMESTAMP", "Paid In"], vec![]);
        assert_eq!(date_column_candidates(&t), vec!["Completion Time", "TIMESTAMP"]);
    }
}
