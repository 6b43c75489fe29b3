//! Mpesa Analyzer - merge statement sheets and pivot amounts by month
//!
//! This library takes a multi-sheet statement workbook, keeps the sheets that
//! carry a required set of columns, concatenates them into one table, and
//! aggregates the Paid In / Withdrawn amounts by calendar month. The merged
//! table and the pivot can be exported as .xlsx, CSV, and a printable HTML
//! report.
//!
//! # Example
//!
//! ```no_run
//! use mpesa_analyzer::excel::WorkbookImporter;
//! use mpesa_analyzer::merge;
//! use mpesa_analyzer::types::{MatchMode, RequiredColumns};
//!
//! let workbook = WorkbookImporter::from_path("statement.xlsx")?.import()?;
//! let required = RequiredColumns::parse("Paid In, Withdrawn, Balance")?;
//! let outcome = merge::select_and_merge(&workbook, &required, MatchMode::CaseInsensitive);
//!
//! println!(
//!     "merged {} rows from {} sheet(s)",
//!     outcome.merged.row_count(),
//!     outcome.included.len()
//! );
//! # Ok::<(), mpesa_analyzer::error::AnalyzerError>(())
//! ```

pub mod cli;
pub mod error;
pub mod excel;
pub mod merge;
pub mod pivot;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use error::{AnalyzerError, AnalyzerResult};
pub use types::{CellValue, MatchMode, RequiredColumns, Table, Workbook};
