//! CSV and printable-HTML artifacts.
//!
//! CSV export is independent of the spreadsheet writer and stays available
//! even when spreadsheet export fails entirely.

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::types::{CellValue, Table};

/// MIME type of the CSV artifacts.
pub const CSV_MIME: &str = "text/csv";

const HTML_HEAD: &str = r#"<html>
  <head>
    <meta charset="utf-8"/>
    <style>
      body { font-family: Arial, sans-serif; padding: 16px; }
      table.pivot-table { border-collapse: collapse; width: 100%; }
      table.pivot-table th, table.pivot-table td { border: 1px solid #ccc; padding: 6px; text-align: left; }
      .print-btn { display: inline-block; margin-bottom: 12px; padding: 8px 12px; background: #1976d2; color: white; border-radius: 4px; cursor: pointer; text-decoration: none; }
    </style>
  </head>
  <body>
    <a class="print-btn" onclick="window.print()">Print pivot table</a>
    <table class="pivot-table">
"#;

const HTML_FOOT: &str = r#"    </table>
  </body>
</html>
"#;

/// Render a table as UTF-8 CSV bytes. Missing cells become empty fields.
pub fn table_to_csv(table: &Table) -> AnalyzerResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        let record: Vec<String> = row.iter().map(CellValue::to_display_string).collect();
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| AnalyzerError::Export(format!("Failed to finish CSV: {e}")))
}

/// Standalone printable HTML document embedding `table` with an inline
/// print-trigger control. A report view for humans, not for machines.
pub fn printable_html(table: &Table) -> String {
    let mut html = String::from(HTML_HEAD);

    html.push_str("      <tr>");
    for name in table.columns() {
        html.push_str("<th>");
        html.push_str(&escape_html(name));
        html.push_str("</th>");
    }
    html.push_str("</tr>\n");

    for row in table.rows() {
        html.push_str("      <tr>");
        for cell in row {
            html.push_str("<td>");
            html.push_str(&html_cell(cell));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }

    html.push_str(HTML_FOOT);
    html
}

/// Numbers print with two decimals in the report; everything else renders as
/// its display text.
fn html_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(n) => format!("{n:.2}"),
        other => escape_html(&other.to_display_string()),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
