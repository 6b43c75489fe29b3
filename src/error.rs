use thiserror::Error;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Could not locate a '{0}' column in the merged data")]
    ColumnNotFound(String),

    #[error("No date column selected. The pivot cannot be computed until a date column is provided.")]
    NoDateColumn,

    #[error("Could not parse any valid dates from column '{0}'. Check the format or select another column.")]
    UnparseableDates(String),
}
