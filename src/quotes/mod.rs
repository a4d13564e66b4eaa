//! # Quotes
//!
//! Live prices are an external capability: given tickers, return a partial
//! `ticker -> price` map. Sources never fail; unknown tickers and transport
//! errors are simply absent from the result, and the merger reads any
//! missing ticker as price `0.0`.
pub mod cache;
pub mod merge;
pub mod panorama;
pub mod yahoo;

use crate::error::DinheiroError;
use crate::error::ResultMessage;
use crate::helpers::reader::UnifiedReader;
use std::collections::HashMap;
use thiserror::Error;

/// Point-in-time snapshot of `ticker -> last price`
pub type QuoteMap = HashMap<String, f64>;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Invalid price {1} for '{0}'")]
    InvalidPrice(String, f64),

    #[error("Quote server answered {1} for '{0}'")]
    StatusError(String, u16),

    #[error("Quote server returned no chart data")]
    NoChartData,
}

/// Anything able to price a batch of tickers.
pub trait QuoteSource {
    /// Returns prices for the tickers it knows; unknown tickers are omitted
    fn fetch_prices(&self, tickers: &[String]) -> QuoteMap;
}

impl<S: QuoteSource + ?Sized> QuoteSource for Box<S> {
    fn fetch_prices(&self, tickers: &[String]) -> QuoteMap {
        (**self).fetch_prices(tickers)
    }
}

/// Source that never knows a price, used when quotes are disabled
#[derive(Clone, Copy, Debug, Default)]
pub struct NoQuoteSource;

impl QuoteSource for NoQuoteSource {
    fn fetch_prices(&self, _tickers: &[String]) -> QuoteMap {
        QuoteMap::new()
    }
}

/// Fixed prices, typically loaded from a `{"TICKER": price}` JSON file.
#[derive(Clone, Debug, Default)]
pub struct StaticQuoteSource {
    prices: QuoteMap,
}

impl StaticQuoteSource {
    pub fn new(prices: QuoteMap) -> Self {
        StaticQuoteSource { prices }
    }

    /// Loads prices from a local path or URL.
    ///
    /// Keys are normalized like spreadsheet tickers, so `"petr4.sa"` prices
    /// `PETR4`. Negative or non-finite prices are rejected.
    pub fn from_file(file_name: &str) -> Result<Self, DinheiroError> {
        Self::load(file_name).with_prefix(&format!("Failed to load prices from '{}'", file_name))
    }

    fn load(file_name: &str) -> Result<Self, DinheiroError> {
        let bytes = UnifiedReader::new(file_name)?.into_bytes()?;
        let raw: HashMap<String, f64> = serde_json::from_slice(&bytes)?;
        let mut prices = QuoteMap::with_capacity(raw.len());
        for (ticker, price) in raw {
            if !price.is_finite() || price < 0.0 {
                return Err(QuoteError::InvalidPrice(ticker, price).into());
            }
            let ticker = crate::valuation::normalize::strip_exchange_suffix(&ticker.trim().to_uppercase()).to_owned();
            prices.insert(ticker, price);
        }
        tracing::debug!(file = file_name, prices = prices.len(), "Static prices loaded");
        Ok(StaticQuoteSource { prices })
    }
}

impl QuoteSource for StaticQuoteSource {
    fn fetch_prices(&self, tickers: &[String]) -> QuoteMap {
        tickers
            .iter()
            .filter_map(|ticker| self.prices.get(ticker).map(|price| (ticker.to_owned(), *price)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn static_source_omits_unknown_tickers() {
        let source = StaticQuoteSource::new([("BBAS3".to_owned(), 28.9)].into_iter().collect());
        let quotes = source.fetch_prices(&tickers(&["BBAS3", "XXXX3"]));
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes["BBAS3"], 28.9);
    }

    #[test]
    fn no_quote_source_is_empty() {
        assert!(NoQuoteSource.fetch_prices(&tickers(&["BBAS3"])).is_empty());
    }

    #[test]
    fn loads_prices_from_json() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("prices.json");
        std::fs::write(&path, r#"{"bbas3.sa": 28.9, "ITUB4": 32}"#).unwrap();

        let source = StaticQuoteSource::from_file(path.to_str().unwrap()).unwrap();
        let quotes = source.fetch_prices(&tickers(&["BBAS3", "ITUB4"]));
        assert_eq!(quotes["BBAS3"], 28.9);
        assert_eq!(quotes["ITUB4"], 32.0);
    }

    #[test]
    fn rejects_negative_prices() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("prices.json");
        std::fs::write(&path, r#"{"BBAS3": -1}"#).unwrap();

        let error = StaticQuoteSource::from_file(path.to_str().unwrap()).err().unwrap();
        assert!(error.to_string().contains("Invalid price -1 for 'BBAS3'"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("prices.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(StaticQuoteSource::from_file(path.to_str().unwrap()).is_err());
    }
}
