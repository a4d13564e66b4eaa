use crate::spreadsheet::cell::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// A single sheet read from a source file: an ordered header row plus data rows.
///
/// Rows are stored positionally and always hold exactly one value per header.
/// A table is immutable once built and is consumed by the schema resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Sheet name
    pub name: String,
    /// Column headers as read (case preserved)
    pub headers: Vec<String>,
    /// Data rows, aligned to `headers`
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Builds a table, padding or truncating every row to the header width.
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Table {
            name: name.to_owned(),
            headers,
            rows,
        }
    }

    /// Returns the value at (row, column), or an empty value when out of range.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Header name used for a header cell that has no text.
    pub(crate) fn unnamed_header(column: usize) -> String {
        format!("Unnamed: {}", column)
    }
}
