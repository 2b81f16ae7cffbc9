use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0} (expected .json, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFile(String),

    #[error("Workbook has no worksheets: {0}")]
    EmptyWorkbook(String),

    #[error("Could not read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Import(#[from] tapp_import_common::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
