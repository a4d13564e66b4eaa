use crate::error::DinheiroError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),

    #[error("Remote file '{0}' answered with status {1}")]
    RemoteFileStatusError(String, u16),
}

/// A unified reader that can handle both local files and remote URLs
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Remote URL reader (in-memory buffer)
    Remote(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Timeout for downloading a remote spreadsheet
    const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Opens a file from either a local path or remote URL
    ///
    /// # Arguments
    /// * `file_name` - Path or URL to the file
    ///
    /// # Returns
    /// * `Result<UnifiedReader, DinheiroError>` - Reader for the file content
    pub(crate) fn new(file_name: &str) -> Result<UnifiedReader, DinheiroError> {
        if Self::is_remote_url(file_name) {
            Self::download(file_name)
        } else {
            let file = File::open(file_name)?;
            Ok(UnifiedReader::Local(BufReader::new(file)))
        }
    }

    /// Checks if a file name represents a remote URL
    pub(crate) fn is_remote_url(file_name: &str) -> bool {
        if let Ok(url) = Url::parse(file_name) {
            matches!(url.scheme(), "http" | "https")
        } else {
            false
        }
    }

    /// Downloads a remote file into memory
    fn download(file_name: &str) -> Result<UnifiedReader, DinheiroError> {
        tracing::debug!(url = file_name, "Downloading remote spreadsheet");
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REMOTE_TIMEOUT)
            .build()?;
        let response = client.get(file_name).send()?;
        let status = response.status();
        if !status.is_success() {
            Err(ReaderError::RemoteFileStatusError(file_name.to_owned(), status.as_u16()))?;
        }

        let bytes = response.bytes()?.to_vec();
        if bytes.is_empty() {
            Err(ReaderError::RemoteFileNoDataError(file_name.to_owned()))?;
        }
        Ok(UnifiedReader::Remote(Cursor::new(bytes)))
    }

    /// Reads the remaining content into a byte vector
    pub(crate) fn into_bytes(mut self) -> Result<Vec<u8>, DinheiroError> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Remote(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Remote(reader) => reader.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_url() {
        // Test local files
        assert!(!UnifiedReader::is_remote_url("PEC.xlsx"));
        assert!(!UnifiedReader::is_remote_url("/path/to/PEC.xlsx"));
        assert!(!UnifiedReader::is_remote_url("./relative/PEC - Página1.csv"));

        // Test remote URLs
        assert!(UnifiedReader::is_remote_url("http://example.com/PEC.xlsx"));
        assert!(UnifiedReader::is_remote_url("https://example.com/PEC.xlsx"));

        // Test unsupported and file URLs (should not be considered remote)
        assert!(!UnifiedReader::is_remote_url("s3://bucket/PEC.xlsx"));
        assert!(!UnifiedReader::is_remote_url("file:///path/to/PEC.xlsx"));
    }

    #[test]
    fn test_open_local_file() {
        // Test opening a local file (Cargo.toml should exist)
        let result = UnifiedReader::new("Cargo.toml");
        assert!(result.is_ok(), "Failed to open local file: {:?}", result.err());
        let bytes = result.unwrap().into_bytes().unwrap();
        assert!(!bytes.is_empty());

        // Test opening a non-existent local file
        let result = UnifiedReader::new("non_existent_file.xlsx");
        assert!(result.is_err(), "Should fail to open non-existent file");
    }
}
