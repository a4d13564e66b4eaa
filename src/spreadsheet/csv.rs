use crate::error::DinheiroError;
use crate::helpers::reader::UnifiedReader;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::table::Table;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::path::Path;

/// UTF-8 byte order mark written by spreadsheet exports
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A delimited text export holding exactly one sheet
pub(crate) struct CsvSpreadsheet {
    /// File name of the spreadsheet
    pub(crate) name: String,
    /// The single sheet, named after the file stem
    table: Table,
}

impl CsvSpreadsheet {
    /// Opens and parses a CSV file
    ///
    /// Bytes are decoded as UTF-8 when valid and as Windows-1252 otherwise.
    /// The delimiter is `;` when the header line holds more semicolons than
    /// commas, which is how locales with a decimal comma export CSV.
    pub(crate) fn open(file_name: &str) -> Result<CsvSpreadsheet, DinheiroError> {
        let bytes = UnifiedReader::new(file_name)?.into_bytes()?;
        let text = decode(&bytes);
        let sheet_name = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_owned());
        let table = parse(&sheet_name, &text)?;
        Ok(CsvSpreadsheet {
            name: file_name.to_owned(),
            table,
        })
    }
}

impl Spreadsheet for CsvSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        vec![self.table.name.to_owned()]
    }

    fn read_sheet(&mut self, sheet_name: &str) -> Result<Table, DinheiroError> {
        if sheet_name == self.table.name {
            Ok(self.table.clone())
        } else {
            Err(SpreadsheetError::SheetNotFoundError(self.name.to_owned(), sheet_name.to_owned()))?
        }
    }
}

/// Decodes raw bytes, stripping a UTF-8 BOM and falling back to Windows-1252.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}

/// Picks `;` or `,` by counting both in the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// A plain finite number; `inf` and `NaN` spellings stay text.
fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Parses CSV text into a table, typing each column as a whole.
///
/// A column is numeric when every non-empty cell parses as a plain number;
/// otherwise all of its cells stay text, so `"34.50"` next to `"R$ 10,00"`
/// is kept as text and normalized like its neighbours.
pub(crate) fn parse(sheet_name: &str, text: &str) -> Result<Table, DinheiroError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::<Vec<String>>::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().any(|field| !field.trim().is_empty()) {
            records.push(record.iter().map(|field| field.to_owned()).collect());
        }
    }
    if records.is_empty() {
        return Ok(Table::new(sheet_name, Vec::new(), Vec::new()));
    }

    let header = records.remove(0);
    let width = records.iter().map(Vec::len).chain([header.len()]).max().unwrap_or_default();
    let headers: Vec<String> = (0..width)
        .map(|index| match header.get(index).map(|title| title.trim()) {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => Table::unnamed_header(index),
        })
        .collect();

    let numeric: Vec<bool> = (0..width)
        .map(|index| {
            let mut values = records
                .iter()
                .filter_map(|record| record.get(index))
                .map(|field| field.trim())
                .filter(|field| !field.is_empty())
                .peekable();
            values.peek().is_some() && values.all(|field| parse_number(field).is_some())
        })
        .collect();

    let rows = records
        .into_iter()
        .map(|record| {
            (0..width)
                .map(|index| {
                    let field = record.get(index).map(String::as_str).unwrap_or_default();
                    match parse_number(field) {
                        Some(number) if numeric[index] => CellValue::Number(number),
                        _ => CellValue::from(field),
                    }
                })
                .collect()
        })
        .collect();

    tracing::debug!(sheet = sheet_name, columns = width, "CSV parsed");
    Ok(Table::new(sheet_name, headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_with_numeric_column() {
        let table = parse("PEC", "Ticker,Preço Bazin\nBBAS3,34.50\nITUB4,\n").unwrap();
        assert_eq!(table.headers, vec!["Ticker", "Preço Bazin"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), &CellValue::Number(34.5));
        assert_eq!(table.cell(1, 1), &CellValue::Empty);
    }

    #[test]
    fn semicolon_separated_with_localized_values() {
        let table = parse("PEC", "Ticker;Empresa;Preço Bazin;DY (%)\nBBAS3;Banco do Brasil;R$ 34,50;8,2%\n").unwrap();
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.cell(0, 2), &CellValue::Text("R$ 34,50".to_owned()));
        assert_eq!(table.cell(0, 3), &CellValue::Text("8,2%".to_owned()));
    }

    #[test]
    fn mixed_column_stays_text() {
        let table = parse("PEC", "Ticker,Bazin\nBBAS3,34.50\nITUB4,\"R$ 10,00\"\n").unwrap();
        assert_eq!(table.cell(0, 1), &CellValue::Text("34.50".to_owned()));
        assert_eq!(table.cell(1, 1), &CellValue::Text("R$ 10,00".to_owned()));
    }

    #[test]
    fn non_finite_spellings_stay_text() {
        let table = parse("PEC", "Ticker,Bazin,DY\nBBAS3,inf,NaN\nITUB4,40,6\n").unwrap();
        assert_eq!(table.cell(0, 1), &CellValue::Text("inf".to_owned()));
        assert_eq!(table.cell(0, 2), &CellValue::Text("NaN".to_owned()));
        assert_eq!(table.cell(1, 1), &CellValue::Text("40".to_owned()));
    }

    #[test]
    fn quoted_multiline_cell_is_kept_whole() {
        let table = parse("PEC", "Ticker,Bazin\n\"BBAS3\nR$ 34,57\",30\n").unwrap();
        assert_eq!(table.cell(0, 0), &CellValue::Text("BBAS3\nR$ 34,57".to_owned()));
    }

    #[test]
    fn blank_headers_and_rows() {
        let table = parse("PEC", "Ticker,,Bazin\n,,\nBBAS3,x,1\n").unwrap();
        assert_eq!(table.headers, vec!["Ticker", "Unnamed: 1", "Bazin"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = parse("PEC", "").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn decode_handles_bom_and_latin1() {
        assert_eq!(decode(b"\xEF\xBB\xBFTicker"), "Ticker");
        assert_eq!(decode(b"Pre\xE7o"), "Preço");
    }

    #[test]
    fn open_reads_file_as_single_sheet() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("PEC - Página1.csv");
        std::fs::write(&path, "Ticker;Bazin\nBBAS3;34,5\n").unwrap();

        let mut spreadsheet = CsvSpreadsheet::open(path.to_str().unwrap()).unwrap();
        assert_eq!(spreadsheet.sheet_names(), vec!["PEC - Página1"]);
        let table = spreadsheet.read_sheet("PEC - Página1").unwrap();
        assert_eq!(table.cell(0, 1), &CellValue::Text("34,5".to_owned()));
        assert!(spreadsheet.read_sheet("Other").is_err());
    }
}
