use thiserror::Error;

/// Main error type for the Dinheiro Data crate.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum DinheiroError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    TomlError(#[from] toml::de::Error),

    #[error("{0}")]
    HttpError(#[from] reqwest::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    ReaderError(#[from] crate::helpers::reader::ReaderError),

    // Domain module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    ValuationError(#[from] crate::valuation::ValuationError),

    #[error("{0}")]
    QuoteError(#[from] crate::quotes::QuoteError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, DinheiroError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| DinheiroError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_prefix_wraps_message() {
        let result: Result<(), DinheiroError> = Err(crate::valuation::ValuationError::SchemaNotFound("PEC.xlsx".to_owned()).into());
        let error = result.with_prefix("PEC.xlsx").unwrap_err();
        assert!(matches!(error, DinheiroError::WithContextError(_)));
        assert!(error.to_string().starts_with("PEC.xlsx: "));
    }

    #[test]
    fn with_prefix_keeps_success() {
        let result: Result<usize, DinheiroError> = Ok(3);
        assert_eq!(result.with_prefix("ignored").unwrap(), 3);
    }
}
