use thiserror::Error;

/// Main error type of the report pipeline.
/// Aggregates errors from the workbook loader, the table stores and the snapshot engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    WithContextError(String),

    #[error("No file matching '{name}' in {directory}")]
    FileNotFound { name: String, directory: String },

    // Helper module errors
    #[error("{0}")]
    LocateError(#[from] crate::helpers::locate::LocateError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Database module errors
    #[error("{0}")]
    StoreError(#[from] crate::database::StoreError),

    // Snapshot module errors
    #[error("{0}")]
    SnapshotError(#[from] crate::snapshot::SnapshotError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, Error> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| Error::WithContextError(format!("{}: {}", message, e)))
    }
}
