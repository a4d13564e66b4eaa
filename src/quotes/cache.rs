//! Time-to-live cache in front of a quote source.
//!
//! For callers that keep a quote source alive across several valuations,
//! such as a service re-rendering the same sheet. Each price is cached per
//! ticker, so overlapping batches only fetch the tickers that are missing or
//! expired. Tickers the source could not price are not cached and are
//! retried on the next call. Expired entries are dropped whenever new prices
//! are stored.
use crate::quotes::QuoteMap;
use crate::quotes::QuoteSource;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// Default price lifetime in seconds
pub const DEFAULT_TTL_SECONDS: i64 = 300;

#[derive(Debug, Clone)]
struct CacheEntry {
    price: f64,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(price: f64, ttl: Duration) -> Self {
        CacheEntry {
            price,
            expires_at: Utc::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Wraps `inner`, serving prices younger than the TTL from memory.
pub struct CachedQuoteSource<S> {
    inner: S,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl<S: QuoteSource> CachedQuoteSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL_SECONDS)
    }

    pub fn with_ttl(inner: S, ttl_seconds: i64) -> Self {
        CachedQuoteSource {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    fn cached(&self, tickers: &[String]) -> QuoteMap {
        let Ok(entries) = self.entries.read() else {
            return QuoteMap::new();
        };
        tickers
            .iter()
            .filter_map(|ticker| {
                entries
                    .get(ticker)
                    .filter(|entry| !entry.is_expired())
                    .map(|entry| (ticker.to_owned(), entry.price))
            })
            .collect()
    }
}

impl<S: QuoteSource> QuoteSource for CachedQuoteSource<S> {
    fn fetch_prices(&self, tickers: &[String]) -> QuoteMap {
        let mut quotes = self.cached(tickers);
        let missing: Vec<String> = tickers
            .iter()
            .filter(|ticker| !quotes.contains_key(*ticker))
            .cloned()
            .collect();
        tracing::debug!(hits = quotes.len(), misses = missing.len(), "Quote cache lookup");
        if missing.is_empty() {
            return quotes;
        }

        let fetched = self.inner.fetch_prices(&missing);
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| !entry.is_expired());
            for (ticker, price) in &fetched {
                entries.insert(ticker.to_owned(), CacheEntry::new(*price, self.ttl));
            }
        }
        quotes.extend(fetched);
        quotes
    }
}
