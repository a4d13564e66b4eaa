use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::table::Table;

/// Cells collected from one worksheet, in file order, with the bounds of the used area.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub(super) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(super) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Converts the collected cells into a [`Table`].
    ///
    /// The first used row becomes the header row; every later row that holds at
    /// least one non-empty value becomes a data row.
    pub(crate) fn into_table(mut self) -> Table {
        if self.is_empty() {
            tracing::debug!(file = %self.file_name, sheet = %self.name, "Sheet has no cells");
        }
        let (Some(row_lower), Some(col_lower), Some(col_upper)) =
            (self.row_lower_bound, self.col_lower_bound, self.col_upper_bound)
        else {
            return Table::new(&self.name, Vec::new(), Vec::new());
        };
        let width = col_upper - col_lower + 1;
        self.cells.sort_by_key(|cell| (cell.row, cell.col));

        let mut headers: Vec<String> = (0..width).map(Table::unnamed_header).collect();
        let mut rows = Vec::<Vec<CellValue>>::new();
        let mut current_row = None::<usize>;
        let mut record = Vec::<CellValue>::new();
        for cell in &self.cells {
            let col = cell.col - col_lower;
            if cell.row == row_lower {
                let title = cell.to_value().to_string();
                if !title.trim().is_empty() {
                    headers[col] = title;
                }
                continue;
            }
            if current_row != Some(cell.row) {
                flush_record(&mut rows, &mut record);
                record = vec![CellValue::Empty; width];
                current_row = Some(cell.row);
            }
            record[col] = cell.to_value();
        }
        flush_record(&mut rows, &mut record);

        tracing::debug!(file = %self.file_name, sheet = %self.name, columns = width, rows = rows.len(), "Sheet converted to table");
        Table::new(&self.name, headers, rows)
    }
}

/// Moves a completed record into `rows` unless every value in it is empty.
fn flush_record(rows: &mut Vec<Vec<CellValue>>, record: &mut Vec<CellValue>) {
    let record = std::mem::take(record);
    if record.iter().any(|value| !value.is_empty()) {
        rows.push(record);
    }
}
