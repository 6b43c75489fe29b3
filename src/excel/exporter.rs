//! Spreadsheet exporter - tables → .xlsx

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use tracing::{debug, warn};

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::types::{CellValue, Table};

/// MIME type of the spreadsheet artifacts.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Writer strategies, tried in order; first success wins. CSV export is
/// handled elsewhere and stays available even when every strategy here fails.
const STRATEGIES: [WriteStyle; 2] = [WriteStyle::Styled, WriteStyle::Plain];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteStyle {
    /// Bold header row and widened columns.
    Styled,
    /// Bare values only.
    Plain,
}

/// Writes one table as a single-worksheet .xlsx file or byte buffer.
pub struct ExcelExporter<'a> {
    table: &'a Table,
    sheet_name: String,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(table: &'a Table, sheet_name: impl Into<String>) -> Self {
        Self {
            table,
            sheet_name: sheet_name.into(),
        }
    }

    /// Render the workbook to an in-memory byte blob.
    pub fn to_bytes(&self) -> AnalyzerResult<Vec<u8>> {
        let mut last_error = String::new();
        for style in STRATEGIES {
            match self.build(style).and_then(|mut wb| wb.save_to_buffer()) {
                Ok(bytes) => {
                    if style == WriteStyle::Plain {
                        warn!("styled spreadsheet writer failed, wrote plain workbook");
                    }
                    return Ok(bytes);
                }
                Err(e) => {
                    debug!(?style, error = %e, "spreadsheet writer failed");
                    last_error = e.to_string();
                }
            }
        }
        Err(AnalyzerError::Export(format!(
            "Failed to write spreadsheet: {last_error}"
        )))
    }

    /// Render the workbook and write it to `path`.
    pub fn export(&self, path: &Path) -> AnalyzerResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn build(&self, style: WriteStyle) -> Result<XlsxWorkbook, XlsxError> {
        let mut workbook = XlsxWorkbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        self.write_header(worksheet, style)?;
        for (row_idx, row) in self.table.rows().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                write_cell(worksheet, (row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }
        Ok(workbook)
    }

    fn write_header(&self, worksheet: &mut Worksheet, style: WriteStyle) -> Result<(), XlsxError> {
        match style {
            WriteStyle::Styled => {
                let header_format = Format::new().set_bold();
                for (col_idx, name) in self.table.columns().iter().enumerate() {
                    worksheet.write_string_with_format(0, col_idx as u16, name, &header_format)?;
                    worksheet.set_column_width(col_idx as u16, name.len().max(12) as f64)?;
                }
            }
            WriteStyle::Plain => {
                for (col_idx, name) in self.table.columns().iter().enumerate() {
                    worksheet.write_string(0, col_idx as u16, name)?;
                }
            }
        }
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Missing => {}
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::DateTime(dt) => {
            worksheet.write_string(row, col, dt.format("%Y-%m-%d %H:%M:%S").to_string())?;
        }
    }
    Ok(())
}
