pub mod xlsx;

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum IngestError {
    WorkbookError(String),
    NoSheet,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::WorkbookError(msg) => write!(f, "Workbook error: {}", msg),
            IngestError::NoSheet => write!(f, "Workbook contains no sheets"),
        }
    }
}

impl Error for IngestError {}
