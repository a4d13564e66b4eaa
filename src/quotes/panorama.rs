//! Market overview: a few named panels of symbols with their last daily move.
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// Rows every panel is padded to
pub const PANEL_ROWS: usize = 6;

/// Name of the placeholder rows used for padding
pub const PLACEHOLDER: &str = "-";

/// Recent daily closes for raw exchange symbols (`^BVSP`, `BRL=X`, `PETR4.SA`).
pub trait HistorySource {
    /// Closes per symbol, oldest first; symbols that fail are omitted
    fn fetch_closes(&self, symbols: &[String]) -> HashMap<String, Vec<f64>>;
}

/// One symbol shown in a panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSymbol {
    /// Label shown to the user
    pub name: String,
    /// Symbol sent to the history source
    pub symbol: String,
}

/// A named group of symbols.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub title: String,
    pub symbols: Vec<PanelSymbol>,
}

/// Last daily move of one symbol.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMove {
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl MarketMove {
    /// Derives the move from closes, oldest first.
    ///
    /// Fewer than two closes give all zeros.
    pub fn from_closes(name: &str, closes: &[f64]) -> Self {
        match closes {
            [.., previous, last] => {
                let change = last - previous;
                let change_percent = if *previous != 0.0 { change / previous * 100.0 } else { 0.0 };
                MarketMove {
                    name: name.to_owned(),
                    price: *last,
                    change,
                    change_percent,
                }
            }
            _ => Self::zero(name),
        }
    }

    fn zero(name: &str) -> Self {
        MarketMove {
            name: name.to_owned(),
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketPanel {
    pub title: String,
    pub moves: Vec<MarketMove>,
}

/// Fetches every panel symbol in one batch and builds the padded panels.
pub fn build_panorama(source: &dyn HistorySource, panels: &[PanelSpec]) -> Vec<MarketPanel> {
    let symbols: Vec<String> = panels
        .iter()
        .flat_map(|panel| panel.symbols.iter().map(|entry| entry.symbol.to_owned()))
        .collect();
    let closes = if symbols.is_empty() {
        HashMap::new()
    } else {
        source.fetch_closes(&symbols)
    };
    tracing::debug!(symbols = symbols.len(), fetched = closes.len(), "Panorama history fetched");

    panels
        .iter()
        .map(|panel| {
            let mut moves: Vec<MarketMove> = panel
                .symbols
                .iter()
                .map(|entry| {
                    let history = closes.get(&entry.symbol).map(Vec::as_slice).unwrap_or_default();
                    MarketMove::from_closes(&entry.name, history)
                })
                .collect();
            while moves.len() < PANEL_ROWS {
                moves.push(MarketMove::zero(PLACEHOLDER));
            }
            MarketPanel {
                title: panel.title.to_owned(),
                moves,
            }
        })
        .collect()
}

fn panel(title: &str, entries: &[(&str, &str)]) -> PanelSpec {
    PanelSpec {
        title: title.to_owned(),
        symbols: entries
            .iter()
            .map(|(name, symbol)| PanelSymbol {
                name: name.to_string(),
                symbol: symbol.to_string(),
            })
            .collect(),
    }
}

/// Indices & currencies, crypto & commodities, and top Brazilian stocks.
pub fn default_panels() -> Vec<PanelSpec> {
    vec![
        panel(
            "INDICES_MOEDAS",
            &[
                ("IBOVESPA", "^BVSP"),
                ("IFIX (FIIs)", "IFIX.SA"),
                ("S&P 500", "^GSPC"),
                ("NASDAQ", "^IXIC"),
                ("DÓLAR", "BRL=X"),
                ("EURO", "EURBRL=X"),
            ],
        ),
        panel(
            "CRIPTO_COMMODITIES",
            &[
                ("BITCOIN", "BTC-USD"),
                ("ETHEREUM", "ETH-USD"),
                ("SOLANA", "SOL-USD"),
                ("OURO", "GC=F"),
                ("PETRÓLEO", "BZ=F"),
                ("PRATA", "SI=F"),
            ],
        ),
        panel(
            "TOP_BRASIL",
            &[
                ("VALE", "VALE3.SA"),
                ("PETROBRAS", "PETR4.SA"),
                ("ITAU", "ITUB4.SA"),
                ("BANCO BRASIL", "BBAS3.SA"),
                ("WEG", "WEGE3.SA"),
                ("AMBEV", "ABEV3.SA"),
            ],
        ),
    ]
}
