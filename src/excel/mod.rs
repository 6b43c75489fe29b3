//! Excel import/export.
//!
//! - Import: .xlsx byte blob → one table per worksheet
//! - Export: any table → .xlsx, styled writer with a plain fallback

mod exporter;
mod importer;

pub use exporter::{ExcelExporter, XLSX_MIME};
pub use importer::WorkbookImporter;
