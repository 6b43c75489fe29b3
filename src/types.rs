use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{AnalyzerError, AnalyzerResult};

//==============================================================================
// Cell values
//==============================================================================

/// Text timestamp formats tried in order when coercing a cell to a date-time.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Text date formats tried when no timestamp format matches.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// A single cell in a table.
///
/// `Missing` is an explicit absence marker: it is what empty cells, failed
/// numeric coercions and columns absent from a source sheet become. It is
/// never conflated with `0.0` or the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Coerce the cell to a number. Text is parsed after trimming; anything
    /// that fails to parse is `None`, never an error.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Missing | CellValue::DateTime(_) => None,
        }
    }

    /// Coerce the cell to a calendar date-time. Text cells are tried against
    /// a fixed list of formats; numbers are interpreted as Excel serial
    /// dates. Unparseable cells are `None`.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => parse_datetime_text(s),
            CellValue::Number(n) => excel_serial_to_datetime(*n),
            CellValue::Missing | CellValue::Bool(_) => None,
        }
    }

    /// Render the cell for CSV and terminal output. `Missing` renders as an
    /// empty field.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Excel serial dates count days from 1899-12-30, fractions are time of day.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = chrono::Duration::days(serial.trunc() as i64);
    let seconds = chrono::Duration::seconds((serial.fract() * 86_400.0).round() as i64);
    base.checked_add_signed(days)?.checked_add_signed(seconds)
}

//==============================================================================
// Tables and workbooks
//==============================================================================

/// An ordered set of named columns over a row-major cell grid. Every row is
/// kept aligned to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(row);
    }

    /// Index of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |r| r.get(col))
    }
}

/// The load result for one worksheet. A sheet that failed to decode keeps its
/// place in the workbook with a description of the failure, so later stages
/// can report it without the whole read having aborted.
#[derive(Debug, Clone)]
pub struct SheetLoad {
    pub name: String,
    pub table: Result<Table, String>,
}

/// All worksheets of one uploaded workbook, in file order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<SheetLoad>,
}

impl Workbook {
    pub fn new(sheets: Vec<SheetLoad>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[SheetLoad] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

//==============================================================================
// Merge parameters
//==============================================================================

/// The user's required-column list, parsed from a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredColumns(Vec<String>);

impl RequiredColumns {
    /// Split on commas, trim each entry and drop empties. An input that
    /// yields no entries is a validation error, raised before any sheet is
    /// examined.
    pub fn parse(input: &str) -> AnalyzerResult<Self> {
        let columns: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        if columns.is_empty() {
            return Err(AnalyzerError::Validation(
                "Enter at least one required column.".to_string(),
            ));
        }
        Ok(Self(columns))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// How required column names are compared against sheet headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    CaseSensitive,
    CaseInsensitive,
}

impl MatchMode {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            MatchMode::CaseSensitive
        } else {
            MatchMode::CaseInsensitive
        }
    }
}
