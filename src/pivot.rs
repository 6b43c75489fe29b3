//! Monthly aggregation.
//!
//! Groups the merged table's rows by calendar month of a chosen date column
//! and sums two amount columns per group. Rows whose date does not parse are
//! left out of the grouping; amount cells that do not coerce to a number
//! contribute nothing. A pure transformation: the input table is never
//! modified.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::types::{CellValue, Table};

pub const MONTH_COLUMN: &str = "Month";
pub const PAID_IN_SUM_COLUMN: &str = "Sum Paid In";
pub const WITHDRAWN_SUM_COLUMN: &str = "Sum Withdrawn";

/// A calendar year-month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Re-derive the sortable key from a "March 2024"-style label.
    pub fn from_label(label: &str) -> Option<Self> {
        NaiveDate::parse_from_str(&format!("1 {label}"), "%d %B %Y")
            .ok()
            .map(|date| MonthKey {
                year: date.year(),
                month: date.month(),
            })
    }
}

/// Human-readable month label, full month name plus four-digit year.
pub fn month_label(date: &NaiveDateTime) -> String {
    date.format("%B %Y").to_string()
}

/// Per-group running sums. `None` means no valid value has been seen yet, so
/// an all-missing group stays missing instead of reporting zero.
#[derive(Debug, Default, Clone, Copy)]
struct MonthSums {
    paid_in: Option<f64>,
    withdrawn: Option<f64>,
}

fn accumulate(acc: &mut Option<f64>, value: Option<f64>) {
    if let Some(v) = value {
        *acc = Some(acc.unwrap_or(0.0) + v);
    }
}

fn number_or_missing(value: Option<f64>) -> CellValue {
    match value {
        Some(v) => CellValue::Number(v),
        None => CellValue::Missing,
    }
}

/// Build the month pivot over `merged`.
///
/// `paid_idx` and `withdrawn_idx` are column indices the caller has already
/// resolved; `date_column` is looked up by exact name. Fails when the date
/// column does not exist or when not a single cell in it parses as a date.
pub fn monthly_pivot(
    merged: &Table,
    date_column: &str,
    paid_idx: usize,
    withdrawn_idx: usize,
) -> AnalyzerResult<Table> {
    let date_idx = merged
        .column_index(date_column)
        .ok_or_else(|| AnalyzerError::ColumnNotFound(date_column.to_string()))?;

    let parsed: Vec<Option<NaiveDateTime>> = merged
        .rows()
        .iter()
        .map(|row| row.get(date_idx).and_then(CellValue::as_datetime))
        .collect();
    if !parsed.iter().any(Option::is_some) {
        return Err(AnalyzerError::UnparseableDates(date_column.to_string()));
    }

    let mut groups: BTreeMap<String, MonthSums> = BTreeMap::new();
    for (row, parsed_date) in merged.rows().iter().zip(&parsed) {
        let Some(date) = parsed_date else {
            continue;
        };
        let sums = groups.entry(month_label(date)).or_default();
        accumulate(
            &mut sums.paid_in,
            row.get(paid_idx).and_then(CellValue::as_number),
        );
        accumulate(
            &mut sums.withdrawn,
            row.get(withdrawn_idx).and_then(CellValue::as_number),
        );
    }
    debug!(groups = groups.len(), "month groups built");

    // Sort by the calendar month the label names, not by the label text.
    let mut entries: Vec<(String, MonthSums)> = groups.into_iter().collect();
    entries.sort_by_key(|(label, _)| MonthKey::from_label(label));

    let mut pivot = Table::new(vec![
        MONTH_COLUMN.to_string(),
        PAID_IN_SUM_COLUMN.to_string(),
        WITHDRAWN_SUM_COLUMN.to_string(),
    ]);
    for (label, sums) in entries {
        pivot.push_row(vec![
            CellValue::Text(label),
            number_or_missing(sums.paid_in),
            number_or_missing(sums.withdrawn),
        ]);
    }
    Ok(pivot)
}
