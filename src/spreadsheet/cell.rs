use crate::error::DinheiroError;
use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers (epoch independent)
    NumberTime,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Currency and percentage formats stay numeric; only date/time codes change the type.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_bracket && !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, _) => Self::NumberTime,
            (false, false, _) => Self::Number,
        }
    }
}

/// Raw value of a spreadsheet cell as handed to the valuation core.
///
/// Header names and cell contents carry no formatting guarantee, so the
/// reader keeps them untyped: numbers stay numbers, text stays text, and
/// anything else (dates, times) is kept as its display text under `Other`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Other(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(value) | CellValue::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_owned())
        }
    }
}

/// Represents a single cell in a spreadsheet with position, type, and value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the file
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the stored text into an untyped [`CellValue`].
    /// A numeric cell whose text does not parse degrades to text instead of failing.
    pub(crate) fn to_value(&self) -> CellValue {
        let converted = match self.kind {
            CellType::Empty | CellType::Error | CellType::SharedString => Ok(CellValue::Empty),
            CellType::Boolean => Ok(CellValue::Number(if self.value == "1" { 1.0 } else { 0.0 })),
            CellType::Number => Ok(self.value.trim().parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or_else(|_| CellValue::Text(self.value.to_owned()))),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false).map(CellValue::Other),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true).map(CellValue::Other),
            CellType::NumberDate1900 => to_date_string(&self.value, false).map(CellValue::Other),
            CellType::NumberDate1904 => to_date_string(&self.value, true).map(CellValue::Other),
            CellType::NumberTime => to_time_string(&self.value).map(CellValue::Other),
            CellType::IsoDateTime => Ok(CellValue::Other(self.value.replace('T', " "))),
            CellType::InlineString => Ok(CellValue::from(self.value.as_str())),
        };
        converted.unwrap_or_else(|error| {
            tracing::debug!(reference = %self.reference(), %error, "Keeping unconvertible cell as text");
            CellValue::Other(self.value.to_owned())
        })
    }
}

/// Converts Excel numeric date to ISO date string.
/// Handles Lotus 1-2-3 leap year bug for 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, DinheiroError> {
    let days = value.trim().parse::<f64>().map_err(|_| DinheiroError::WithContextError(format!("parse '{}' to date failed", value)))?.trunc() as i64;
    let duration = Duration::days(
        days + if is_1904 {
            1462
        } else if days < 60 {
            1
        } else {
            0
        },
    );
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .ok_or_else(|| DinheiroError::WithContextError("invalid epoch".to_owned()))?;
    Ok((epoch + duration).format("%Y-%m-%d").to_string())
}

/// Converts Excel numeric time (fraction of a day) to ISO time string.
fn to_time_string(value: &str) -> Result<String, DinheiroError> {
    let factor = value.trim().parse::<f64>().map_err(|_| DinheiroError::WithContextError(format!("parse '{}' to time failed", value)))?;
    let mut seconds = (factor.fract() * 86_400f64).round() as i64;
    let hours = seconds / 3_600; seconds %= 3_600;
    let minutes = seconds / 60; seconds %= 60;
    Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Converts Excel numeric datetime to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, DinheiroError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 1, col: 2, kind, value: value.to_owned() }
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", false), CellType::NumberTime);
        assert_eq!(CellType::parse_custom_number_format("\"R$\"\\ #,##0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[$R$-416] #,##0.00;[Red]-#,##0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("0.00%", false), CellType::Number);
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("10", false), None);
    }

    #[test]
    fn to_value_by_kind() {
        assert_eq!(cell(CellType::Number, "34.5").to_value(), CellValue::Number(34.5));
        assert_eq!(cell(CellType::Boolean, "1").to_value(), CellValue::Number(1.0));
        assert_eq!(cell(CellType::InlineString, "BBAS3").to_value(), CellValue::Text("BBAS3".to_owned()));
        assert_eq!(cell(CellType::InlineString, "").to_value(), CellValue::Empty);
        assert_eq!(cell(CellType::Error, "#N/A").to_value(), CellValue::Empty);
        assert_eq!(cell(CellType::NumberDate1900, "45292").to_value(), CellValue::Other("2024-01-01".to_owned()));
        assert_eq!(cell(CellType::NumberTime, "0.5").to_value(), CellValue::Other("12:00:00".to_owned()));
        assert_eq!(cell(CellType::IsoDateTime, "2024-01-01T10:00:00").to_value(), CellValue::Other("2024-01-01 10:00:00".to_owned()));
    }

    #[test]
    fn unparsable_number_stays_text() {
        assert_eq!(cell(CellType::Number, "R$ 10").to_value(), CellValue::Text("R$ 10".to_owned()));
        assert_eq!(cell(CellType::NumberDate1900, "abc").to_value(), CellValue::Other("abc".to_owned()));
    }

    #[test]
    fn reference_of_cell() {
        assert_eq!(cell(CellType::Number, "1").reference(), "C2");
    }
}
