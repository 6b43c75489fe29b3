//! Workbook importer - .xlsx bytes → tables

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx};
use tracing::{debug, warn};

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::types::{CellValue, SheetLoad, Table, Workbook};

/// Decodes an in-memory .xlsx blob into one table per worksheet.
///
/// The whole workbook is materialized up front; re-running an analysis
/// decodes the bytes again from scratch.
pub struct WorkbookImporter {
    bytes: Vec<u8>,
}

impl WorkbookImporter {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> AnalyzerResult<Self> {
        Ok(Self {
            bytes: std::fs::read(path)?,
        })
    }

    /// Decode every worksheet. A sheet that fails to read keeps its slot in
    /// the workbook with the failure reason; the remaining sheets are still
    /// decoded.
    pub fn import(&self) -> AnalyzerResult<Workbook> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| AnalyzerError::Workbook(format!("Failed to open workbook: {e}")))?;

        let sheet_names = workbook.sheet_names().to_vec();
        debug!(sheets = sheet_names.len(), "decoding workbook");

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let table = match workbook.worksheet_range(&name) {
                Ok(range) => Ok(table_from_range(&range)),
                Err(e) => {
                    warn!(sheet = %name, error = %e, "failed to read sheet");
                    Err(format!("read error: {e}"))
                }
            };
            sheets.push(SheetLoad { name, table });
        }
        Ok(Workbook::new(sheets))
    }
}

/// Interpret the first row of the used range as headers, the rest as data.
fn table_from_range(range: &Range<Data>) -> Table {
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Table::default();
    }

    let mut columns = Vec::with_capacity(width);
    for col in 0..width {
        columns.push(header_name(range.get((0, col)), col));
    }

    let mut table = Table::new(columns);
    for row in 1..height {
        let cells = (0..width)
            .map(|col| {
                range
                    .get((row, col))
                    .map(cell_from_data)
                    .unwrap_or(CellValue::Missing)
            })
            .collect();
        table.push_row(cells);
    }
    table
}

/// Stringify a header cell. Blank headers get positional `col_N` names.
fn header_name(cell: Option<&Data>, col: usize) -> String {
    match cell {
        Some(Data::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Data::Empty) | Some(Data::String(_)) | None => format!("col_{col}"),
        Some(other) => other.to_string(),
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Missing,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) => CellValue::DateTime(parsed),
            None => CellValue::Missing,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_name_variants() {
        assert_eq!(header_name(Some(&Data::String("Paid In ".into())), 0), "Paid In");
        assert_eq!(header_name(Some(&Data::String("  ".into())), 2), "col_2");
        assert_eq!(header_name(Some(&Data::Empty), 1), "col_1");
        assert_eq!(header_name(None, 3), "col_3");
        assert_eq!(header_name(Some(&Data::Int(2024)), 0), "2024");
    }

    #[test]
    fn test_cell_from_data() {
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Missing);
        assert_eq!(cell_from_data(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(cell_from_data(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(cell_from_data(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_from_data(&Data::String("hello".into())),
            CellValue::Text("hello".to_string())
        );
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2024-06-15T00:00:00".into())),
            CellValue::Text("2024-06-15T00:00:00".to_string())
        );
    }

    #[test]
    fn test_import_rejects_non_xlsx_bytes() {
        let importer = WorkbookImporter::from_bytes(b"definitely not a zip".to_vec());
        assert!(matches!(
            importer.import(),
            Err(AnalyzerError::Workbook(_))
        ));
    }
}
