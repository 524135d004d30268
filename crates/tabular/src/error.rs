use std::io;
use thiserror::Error;

/// Failures while reading or writing tabular files.
#[derive(Debug, Error)]
pub enum TabularError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(String),
    #[error("the sheet has no header row")]
    EmptySheet,
    #[error("unsupported tabular format: {0}")]
    UnsupportedFormat(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
}

impl From<calamine::Error> for TabularError {
    fn from(err: calamine::Error) -> Self {
        TabularError::Workbook(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for TabularError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        TabularError::Workbook(err.to_string())
    }
}

impl From<tempfile::PersistError> for TabularError {
    fn from(err: tempfile::PersistError) -> Self {
        TabularError::Io(err.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_the_column() {
        let err = TabularError::MissingColumn("text".into());
        assert_eq!(err.to_string(), "missing required column 'text'");
    }

    #[test]
    fn io_errors_convert() {
        let err: TabularError = io::Error::other("disk full").into();
        assert!(err.to_string().contains("disk full"));
    }
}
