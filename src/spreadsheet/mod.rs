//! # Spreadsheet Ingestion
//!
//! Reads investor spreadsheets into untyped [`Table`]s: one ordered header row
//! plus data rows of [`CellValue`]s. Excel workbooks (`.xlsx`, `.xlsm`) are
//! parsed straight from the ZIP package; delimited text exports (`.csv`,
//! `.txt`) are read as a single sheet named after the file.
pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod csv;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod table;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::DinheiroError;
use crate::spreadsheet::csv::CsvSpreadsheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

pub use crate::spreadsheet::cell::CellValue;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::table::Table;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported spreadsheet format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Missing part '{0}' in spreadsheet package")]
    FileError(String),

    #[error("Sheet '{1}' not found in '{0}'")]
    SheetNotFoundError(String, String),
}

/// A source file exposing named sheets in file order.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns the sheet names in file order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads one sheet into a [`Table`]
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Table, DinheiroError>;

    /// Reads every sheet accepted by `criteria`, in file order
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Table>, DinheiroError> {
        let mut tables = Vec::new();
        for sheet_name in self.sheet_names() {
            if criteria.accept(&sheet_name) {
                tables.push(self.read_sheet(&sheet_name)?);
            }
        }
        Ok(tables)
    }
}

/// Opens a spreadsheet by file extension.
///
/// - `.xlsx`, `.xlsm` - Excel workbook
/// - `.csv`, `.txt` - delimited text export
pub fn open_spreadsheet(file_name: &str) -> Result<Box<dyn Spreadsheet>, DinheiroError> {
    let extension = Path::new(file_name)
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
    let spreadsheet: Box<dyn Spreadsheet> = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Box::new(XlsxSpreadsheet::open(file_name)?),
        Some("csv") | Some("txt") => Box::new(CsvSpreadsheet::open(file_name)?),
        _ => Err(SpreadsheetError::UnsupportedFormat(file_name.to_owned()))?,
    };
    tracing::debug!(file = file_name, sheets = ?spreadsheet.sheet_names(), "Spreadsheet opened");
    Ok(spreadsheet)
}
