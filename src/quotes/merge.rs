use crate::quotes::QuoteMap;
use crate::quotes::QuoteSource;
use std::collections::HashSet;

/// Distinct non-empty tickers in order of first appearance.
pub fn distinct_tickers<'a, I>(tickers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    tickers
        .into_iter()
        .filter(|ticker| !ticker.is_empty() && seen.insert(*ticker))
        .map(str::to_owned)
        .collect()
}

/// Prices the whole ticker set with a single call to `source`.
///
/// An empty set never reaches the source.
pub fn fetch_quotes(source: &dyn QuoteSource, tickers: &[String]) -> QuoteMap {
    if tickers.is_empty() {
        return QuoteMap::new();
    }
    let quotes = source.fetch_prices(tickers);
    let missing: Vec<&str> = tickers
        .iter()
        .filter(|ticker| !quotes.contains_key(*ticker))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        tracing::debug!(?missing, "Tickers without quote");
    }
    quotes
}

/// Quoted price for `ticker`, or `0.0` when the snapshot has none.
pub fn price_of(quotes: &QuoteMap, ticker: &str) -> f64 {
    quotes.get(ticker).copied().unwrap_or(0.0)
}
