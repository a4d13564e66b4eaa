use crate::error::DinheiroError;
use crate::error::ResultMessage;
use crate::quotes::panorama::HistorySource;
use crate::quotes::QuoteError;
use crate::quotes::QuoteMap;
use crate::quotes::QuoteSource;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo rejects requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) dinheiro-data";

/// Most symbols Yahoo accepts in one spark request
pub const SPARK_BATCH_SIZE: usize = 20;

#[derive(Debug, Deserialize)]
struct SparkResponse {
    spark: Spark,
}

#[derive(Debug, Deserialize)]
struct Spark {
    #[serde(default)]
    result: Option<Vec<SparkResult>>,
}

#[derive(Debug, Deserialize)]
struct SparkResult {
    symbol: String,
    #[serde(default)]
    response: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<IndicatorQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct IndicatorQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Daily closes, oldest first, without the gaps Yahoo reports as `null`
    fn closes(&self) -> Vec<f64> {
        self.indicators
            .quote
            .first()
            .map(|quote| quote.close.iter().flatten().copied().filter(|close| close.is_finite()).collect())
            .unwrap_or_default()
    }

    /// Last close, or the live market price when no close is available
    fn last_price(&self) -> Option<f64> {
        self.closes()
            .last()
            .copied()
            .or(self.meta.regular_market_price)
            .filter(|price| price.is_finite() && *price > 0.0)
    }
}

/// Charts keyed by symbol. Symbols Yahoo does not know are simply absent.
fn parse_spark(body: &[u8]) -> Result<HashMap<String, ChartResult>, DinheiroError> {
    let response: SparkResponse = serde_json::from_slice(body)?;
    let charts = response
        .spark
        .result
        .ok_or(QuoteError::NoChartData)?
        .into_iter()
        .filter_map(|result| {
            let symbol = result.symbol;
            result.response.into_iter().next().map(|chart| (symbol, chart))
        })
        .collect();
    Ok(charts)
}

/// Quotes from the Yahoo Finance spark endpoint.
///
/// Symbols are requested in batches of [`SPARK_BATCH_SIZE`], one request per
/// batch. A failed batch is logged and the remaining batches are skipped, so
/// an unreachable server costs at most one timeout.
pub struct YahooQuoteSource {
    client: reqwest::blocking::Client,
    base_url: String,
    symbol_suffix: String,
}

impl YahooQuoteSource {
    pub fn new(base_url: &str, symbol_suffix: &str, timeout: Duration) -> Result<Self, DinheiroError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(YahooQuoteSource {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            symbol_suffix: symbol_suffix.to_owned(),
        })
    }

    /// Exchange symbol for a spreadsheet ticker, e.g. `BBAS3` -> `BBAS3.SA`
    fn symbol_for(&self, ticker: &str) -> String {
        format!("{}{}", ticker, self.symbol_suffix)
    }

    fn spark(&self, symbols: &[String]) -> Result<HashMap<String, ChartResult>, DinheiroError> {
        let url = format!("{}/v8/finance/spark", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.join(",").as_str()), ("range", "5d"), ("interval", "1d")])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            Err(QuoteError::StatusError(symbols.join(","), status.as_u16()))?;
        }
        let body = response.bytes()?;
        parse_spark(&body)
    }

    /// Charts for every symbol that could be fetched.
    fn charts(&self, symbols: &[String]) -> HashMap<String, ChartResult> {
        let mut charts = HashMap::with_capacity(symbols.len());
        for batch in symbols.chunks(SPARK_BATCH_SIZE) {
            match self.spark(batch).with_prefix(&format!("Failed to fetch quotes for {} symbols", batch.len())) {
                Ok(batch_charts) => charts.extend(batch_charts),
                Err(error) => {
                    tracing::warn!(%error, "Quotes unavailable");
                    break;
                }
            }
        }
        charts
    }
}

impl QuoteSource for YahooQuoteSource {
    fn fetch_prices(&self, tickers: &[String]) -> QuoteMap {
        let symbols: Vec<String> = tickers.iter().map(|ticker| self.symbol_for(ticker)).collect();
        let charts = self.charts(&symbols);
        let mut quotes = QuoteMap::with_capacity(tickers.len());
        for (ticker, symbol) in tickers.iter().zip(&symbols) {
            match charts.get(symbol).and_then(ChartResult::last_price) {
                Some(price) => {
                    tracing::trace!(symbol = %symbol, price, "Quote fetched");
                    quotes.insert(ticker.to_owned(), price);
                }
                None => tracing::debug!(symbol = %symbol, "No price in chart"),
            }
        }
        tracing::info!(requested = tickers.len(), priced = quotes.len(), "Quotes fetched");
        quotes
    }
}

impl HistorySource for YahooQuoteSource {
    fn fetch_closes(&self, symbols: &[String]) -> HashMap<String, Vec<f64>> {
        self.charts(symbols)
            .into_iter()
            .map(|(symbol, chart)| (symbol, chart.closes()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use std::io::BufReader;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::sync::Mutex;

    const SPARK: &str = r#"{
        "spark": {
            "result": [
                {"symbol": "BBAS3.SA", "response": [{
                    "meta": {"currency": "BRL", "symbol": "BBAS3.SA", "regularMarketPrice": 28.95},
                    "timestamp": [1, 2, 3],
                    "indicators": {"quote": [{"close": [28.1, null, 28.9]}]}
                }]},
                {"symbol": "BRL=X", "response": [{
                    "meta": {"regularMarketPrice": 5.1},
                    "indicators": {"quote": [{"close": [null]}]}
                }]},
                {"symbol": "XXXX3.SA", "response": []}
            ],
            "error": null
        }
    }"#;

    /// Serves `body` to every connection, counting connections and keeping request lines.
    fn serve(body: &'static str) -> (String, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (counter, lines) = (connections.clone(), requests.clone());
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = stream.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                lines.lock().unwrap().push(request_line);
                let mut header = String::new();
                while reader.read_line(&mut header).unwrap() > 2 {
                    header.clear();
                }
                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                )
                .unwrap();
            }
        });
        (address, connections, requests)
    }

    #[test]
    fn parses_closes_and_price() {
        let charts = parse_spark(SPARK.as_bytes()).unwrap();
        assert_eq!(charts["BBAS3.SA"].closes(), vec![28.1, 28.9]);
        assert_eq!(charts["BBAS3.SA"].last_price(), Some(28.9));
        assert!(!charts.contains_key("XXXX3.SA"));
    }

    #[test]
    fn falls_back_to_market_price() {
        let charts = parse_spark(SPARK.as_bytes()).unwrap();
        assert!(charts["BRL=X"].closes().is_empty());
        assert_eq!(charts["BRL=X"].last_price(), Some(5.1));
    }

    #[test]
    fn missing_result_is_an_error() {
        let body = r#"{"spark": {"result": null, "error": {"code": "Bad Request"}}}"#;
        assert!(matches!(
            parse_spark(body.as_bytes()),
            Err(DinheiroError::QuoteError(QuoteError::NoChartData))
        ));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_spark(b"<html>").is_err());
    }

    #[test]
    fn appends_exchange_suffix() {
        let source = YahooQuoteSource::new(DEFAULT_BASE_URL, ".SA", Duration::from_secs(1)).unwrap();
        assert_eq!(source.symbol_for("BBAS3"), "BBAS3.SA");
    }

    #[test]
    fn whole_batch_in_one_request() {
        let (address, connections, requests) = serve(SPARK);
        let source = YahooQuoteSource::new(&address, ".SA", Duration::from_secs(5)).unwrap();
        let tickers: Vec<String> = ["BBAS3", "ITUB4", "PETR4", "VALE3", "XXXX3"].iter().map(|t| t.to_string()).collect();

        let quotes = source.fetch_prices(&tickers);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes["BBAS3"], 28.9);
        assert_eq!(connections.load(Ordering::SeqCst), 1);
        let request = requests.lock().unwrap()[0].clone();
        assert!(request.starts_with("GET /v8/finance/spark?symbols=BBAS3.SA%2CITUB4.SA%2CPETR4.SA"));
    }

    #[test]
    fn large_sets_are_split_into_batches() {
        let (address, connections, _) = serve(SPARK);
        let source = YahooQuoteSource::new(&address, "", Duration::from_secs(5)).unwrap();
        let symbols: Vec<String> = (0..SPARK_BATCH_SIZE + 1).map(|index| format!("S{}", index)).collect();

        assert!(source.fetch_closes(&symbols).contains_key("BBAS3.SA"));
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unreachable_server_yields_empty_quotes() {
        let source = YahooQuoteSource::new("http://127.0.0.1:9", ".SA", Duration::from_millis(200)).unwrap();
        assert!(source.fetch_prices(&["BBAS3".to_owned()]).is_empty());
        assert!(source.fetch_closes(&["^BVSP".to_owned()]).is_empty());
    }
}
