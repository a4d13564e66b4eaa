//! Builds small XLSX workbooks on disk for tests.
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Writes a minimal but valid workbook: numbers become numeric cells,
/// `#...` values become error cells, everything else becomes text.
pub(crate) struct WorkbookBuilder {
    sheets: Vec<(String, Vec<Vec<String>>)>,
    shared_strings: bool,
    styles: Option<String>,
}

impl WorkbookBuilder {
    pub(crate) fn new() -> Self {
        WorkbookBuilder {
            sheets: Vec::new(),
            shared_strings: false,
            styles: None,
        }
    }

    /// Stores text through the shared string table instead of inline strings.
    pub(crate) fn shared_strings(mut self) -> Self {
        self.shared_strings = true;
        self
    }

    /// Adds a raw `xl/styles.xml` part.
    pub(crate) fn styles(mut self, styles: &str) -> Self {
        self.styles = Some(styles.to_owned());
        self
    }

    pub(crate) fn sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect();
        self.sheets.push((name.to_owned(), rows));
        self
    }

    /// Writes the workbook into `directory` and returns its path.
    pub(crate) fn write(&self, directory: &Path, file_name: &str) -> String {
        let path = directory.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        let mut strings = Vec::<String>::new();

        let mut workbook = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr/><sheets>"#);
        let mut relationships = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        for (index, (name, rows)) in self.sheets.iter().enumerate() {
            let number = index + 1;
            workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{number}" r:id="rId{number}"/>"#, escape(name)));
            relationships.push_str(&format!(r#"<Relationship Id="rId{number}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{number}.xml"/>"#));

            let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#);
            for (row_index, row) in rows.iter().enumerate() {
                xml.push_str(&format!(r#"<row r="{}">"#, row_index + 1));
                for (col_index, value) in row.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    let reference = crate::spreadsheet::reference::index_to_reference(row_index, col_index);
                    if value.parse::<f64>().is_ok() {
                        xml.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                    } else if let Some(style) = value.strip_prefix("@date:") {
                        xml.push_str(&format!(r#"<c r="{reference}" s="1"><v>{style}</v></c>"#));
                    } else if value.starts_with('#') {
                        xml.push_str(&format!(r#"<c r="{reference}" t="e"><v>{}</v></c>"#, escape(value)));
                    } else if self.shared_strings {
                        xml.push_str(&format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, strings.len()));
                        strings.push(value.to_owned());
                    } else {
                        xml.push_str(&format!(r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#, escape(value)));
                    }
                }
                xml.push_str("</row>");
            }
            xml.push_str("</sheetData></worksheet>");
            zip.start_file(format!("xl/worksheets/sheet{number}.xml"), options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        workbook.push_str("</sheets></workbook>");
        relationships.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(relationships.as_bytes()).unwrap();

        if self.shared_strings {
            let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#, strings.len());
            for string in &strings {
                xml.push_str(&format!("<si><t>{}</t></si>", escape(string)));
            }
            xml.push_str("</sst>");
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        if let Some(styles) = &self.styles {
            zip.start_file("xl/styles.xml", options).unwrap();
            zip.write_all(styles.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
        path.to_string_lossy().to_string()
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
