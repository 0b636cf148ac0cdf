use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Input has {found} columns, at most {max} are supported")]
    TooManyColumns { found: usize, max: usize },

    #[error("Required column '{0}' is missing from the input")]
    MissingColumn(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
