//! CLI command handlers.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::excel::{ExcelExporter, WorkbookImporter};
use crate::merge::{self, MergeOutcome};
use crate::pivot;
use crate::report;
use crate::types::{CellValue, MatchMode, RequiredColumns, Table};

/// Labels used to locate the two amount columns in the merged table.
const PAID_IN_LABEL: &str = "Paid In";
const WITHDRAWN_LABEL: &str = "Withdrawn";

/// Default artifact file names.
const MERGED_XLSX: &str = "merged_mpesa_statement.xlsx";
const MERGED_CSV: &str = "merged_mpesa_statement.csv";
const PIVOT_XLSX: &str = "pivot_mpesa.xlsx";
const PIVOT_CSV: &str = "pivot_mpesa.csv";
const PIVOT_HTML: &str = "pivot_mpesa.html";

/// Execute the analyze command: merge qualifying sheets, pivot by month,
/// write the export artifacts.
pub fn analyze(
    file: PathBuf,
    required: String,
    case_sensitive: bool,
    date_column: Option<String>,
    out_dir: PathBuf,
    json: bool,
    verbose: bool,
) -> AnalyzerResult<()> {
    println!(
        "{}",
        "📥 Mpesa Analyzer - Sheet Merge & Month Pivot".bold().green()
    );
    println!("   File: {}\n", file.display());

    // Validated before any sheet is read.
    let required = RequiredColumns::parse(&required)?;
    let mode = MatchMode::from_case_sensitive(case_sensitive);

    if verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }
    let workbook = WorkbookImporter::from_path(&file)?.import()?;
    if verbose {
        println!("   Found {} sheet(s)\n", workbook.sheet_count());
    }

    let outcome = merge::select_and_merge(&workbook, &required, mode);
    print_merge_report(&outcome, json);

    if outcome.included.is_empty() {
        println!(
            "{}",
            "⚠️  No sheets contained all the specified required columns.".yellow()
        );
        return Ok(());
    }

    std::fs::create_dir_all(&out_dir)?;

    // Merged-table artifacts. The CSV is written regardless of how the
    // spreadsheet writer fares.
    let merged_xlsx = out_dir.join(MERGED_XLSX);
    match ExcelExporter::new(&outcome.merged, "Merged Statement").export(&merged_xlsx) {
        Ok(()) => println!("   💾 {}", merged_xlsx.display()),
        Err(e) => println!("   {} {e}", "⚠️  Spreadsheet export failed:".yellow()),
    }
    let merged_csv = out_dir.join(MERGED_CSV);
    std::fs::write(&merged_csv, report::table_to_csv(&outcome.merged)?)?;
    println!("   💾 {}\n", merged_csv.display());

    // The pivot needs both amount columns; report and stop if either is
    // absent, keeping the merged artifacts above.
    let paid = merge::resolve_column(&outcome.merged, PAID_IN_LABEL);
    let withdrawn = merge::resolve_column(&outcome.merged, WITHDRAWN_LABEL);
    let (Some(paid_idx), Some(withdrawn_idx)) = (paid.index(), withdrawn.index()) else {
        let unresolved: Vec<String> = [
            (PAID_IN_LABEL, paid.index()),
            (WITHDRAWN_LABEL, withdrawn.index()),
        ]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(label, _)| format!("'{label}'"))
        .collect();
        println!(
            "{}",
            format!(
                "⚠️  Could not locate the {} column(s) in the merged data.",
                unresolved.join(" and ")
            )
            .yellow()
        );
        println!("   Detected columns: {}", outcome.merged.columns().join(", "));
        return Ok(());
    };

    // Date column: explicit choice first, else the first detected candidate.
    let date_column = match date_column {
        Some(name) => name,
        None => match merge::date_column_candidates(&outcome.merged).into_iter().next() {
            Some(first) => first,
            None => {
                println!("{}", format!("⚠️  {}", AnalyzerError::NoDateColumn).yellow());
                println!("   No obvious date column found. Pass one with --date-column.");
                return Ok(());
            }
        },
    };
    if verbose {
        println!("{}", format!("📅 Grouping by month of '{date_column}'").cyan());
    }

    let pivot_table =
        match pivot::monthly_pivot(&outcome.merged, &date_column, paid_idx, withdrawn_idx) {
            Ok(table) => table,
            Err(e @ (AnalyzerError::UnparseableDates(_) | AnalyzerError::ColumnNotFound(_))) => {
                // Aggregation stops here; the merged artifacts stay intact.
                println!("{} {e}", "❌".red());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

    println!(
        "{}",
        "📊 Pivot: Sum of Paid In and Withdrawn by Month".bold().cyan()
    );
    print_table(&pivot_table);
    println!();

    let pivot_xlsx = out_dir.join(PIVOT_XLSX);
    match ExcelExporter::new(&pivot_table, "Pivot").export(&pivot_xlsx) {
        Ok(()) => println!("   💾 {}", pivot_xlsx.display()),
        Err(e) => println!("   {} {e}", "⚠️  Spreadsheet export failed:".yellow()),
    }
    let pivot_csv = out_dir.join(PIVOT_CSV);
    std::fs::write(&pivot_csv, report::table_to_csv(&pivot_table)?)?;
    println!("   💾 {}", pivot_csv.display());
    let pivot_html = out_dir.join(PIVOT_HTML);
    std::fs::write(&pivot_html, report::printable_html(&pivot_table))?;
    println!("   💾 {}", pivot_html.display());

    println!("\n{}", "✅ Analysis complete".bold().green());
    Ok(())
}

/// Execute the sheets command: list every worksheet with its columns.
pub fn sheets(file: PathBuf) -> AnalyzerResult<()> {
    println!("{}", "📥 Mpesa Analyzer - Workbook Sheets".bold().green());
    println!("   File: {}\n", file.display());

    let workbook = WorkbookImporter::from_path(&file)?.import()?;
    for sheet in workbook.sheets() {
        match &sheet.table {
            Ok(table) => {
                println!(
                    "   📄 {} ({} rows)",
                    sheet.name.bright_blue().bold(),
                    table.row_count()
                );
                if table.columns().is_empty() {
                    println!("      (no columns)");
                } else {
                    println!("      {}", table.columns().join(", "));
                }
            }
            Err(reason) => {
                println!("   📄 {} — {}", sheet.name.bright_blue().bold(), reason.red());
            }
        }
    }
    Ok(())
}

fn print_merge_report(outcome: &MergeOutcome, json: bool) {
    if !outcome.included.is_empty() {
        println!(
            "{}",
            format!("✅ Merged {} sheet(s)", outcome.included.len()).bold().green()
        );
        for name in &outcome.included {
            println!("   📄 {}", name.bright_blue());
        }
        println!(
            "   {} rows, {} columns",
            outcome.merged.row_count(),
            outcome.merged.column_count()
        );
    }
    if !outcome.skipped.is_empty() {
        if json {
            let map: serde_json::Map<String, serde_json::Value> = outcome
                .skipped
                .iter()
                .map(|(name, reason)| {
                    (
                        name.clone(),
                        serde_json::to_value(reason).unwrap_or(serde_json::Value::Null),
                    )
                })
                .collect();
            let rendered = serde_json::to_string_pretty(&serde_json::Value::Object(map))
                .unwrap_or_default();
            println!("{rendered}");
        } else {
            println!(
                "{}",
                format!("ℹ️  Skipped {} sheet(s):", outcome.skipped.len()).yellow()
            );
            for (name, reason) in &outcome.skipped {
                println!("   {} — {}", name.bright_blue(), reason);
            }
        }
    }
    println!();
}

/// Column-aligned terminal rendering; sums print with two decimals.
fn print_table(table: &Table) {
    let rendered: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    CellValue::Number(n) => format!("{n:.2}"),
                    other => other.to_display_string(),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(String::len).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:width$}", name, width = *w))
        .collect();
    println!("   {}", header.join("  ").bold());
    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:width$}", cell, width = *w))
            .collect();
        println!("   {}", line.join("  "));
    }
}
