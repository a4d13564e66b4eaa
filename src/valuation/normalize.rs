//! Cell value normalization.
//!
//! Every function here is total: malformed input degrades to `0.0` (or an
//! empty string) so that one corrupt cell never blocks the rest of a sheet.
use crate::spreadsheet::CellValue;
use regex::Regex;
use std::sync::LazyLock;

/// Currency prefix used by Brazilian spreadsheets
const CURRENCY_PREFIX: &str = "R$";

/// Exchange suffix such as `.SA` appended to tickers by quote providers
static EXCHANGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Z]{2}$").expect("Hardcode regex pattern"));

/// Returns the part of `text` before the first line break.
fn first_line(text: &str) -> &str {
    text.split(['\n', '\r']).next().unwrap_or_default()
}

/// Converts a currency or percentage cell into a number.
///
/// Finite numbers pass through unchanged. Text is reduced to its first line, the
/// `R$` prefix and thousands-separator periods are removed, the decimal comma
/// becomes a period and a trailing `%` is dropped before parsing.
/// Anything that still fails to parse, and any other cell type, yields `0.0`.
pub fn normalize_currency(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(number) if number.is_finite() => *number,
        CellValue::Number(_) => 0.0,
        CellValue::Text(text) => parse_localized(text).unwrap_or(0.0),
        CellValue::Empty | CellValue::Other(_) => 0.0,
    }
}

/// Like [`normalize_currency`], then scales fractions in `(0, 1)` to percent units.
///
/// Sheets store a yield either as `8.5` or as the fraction `0.085`; both come
/// out as `8.5`. Only fields known to be percentages go through this.
pub fn normalize_percentage(value: &CellValue) -> f64 {
    let value = normalize_currency(value);
    if value > 0.0 && value < 1.0 {
        value * 100.0
    } else {
        value
    }
}

fn parse_localized(text: &str) -> Option<f64> {
    let cleaned = first_line(text)
        .replace(CURRENCY_PREFIX, "")
        .replace('.', "")
        .replace(',', ".");
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_suffix('%').unwrap_or(cleaned).trim();
    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Canonical ticker: first line, trimmed, uppercased, exchange suffix removed.
pub fn normalize_ticker(value: &CellValue) -> String {
    let text = value.to_string();
    let ticker = first_line(&text).trim().to_uppercase();
    strip_exchange_suffix(&ticker).to_owned()
}

/// Removes a trailing `.XX` exchange suffix (e.g. `.SA`) from an uppercased ticker.
pub fn strip_exchange_suffix(ticker: &str) -> &str {
    match EXCHANGE_SUFFIX.find(ticker) {
        Some(suffix) => &ticker[..suffix.start()],
        None => ticker,
    }
}

/// Free text of a cell, trimmed; `None` when there is nothing to show.
pub fn normalize_text(value: &CellValue) -> Option<String> {
    let text = value.to_string();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}
