use crate::quotes::merge::price_of;
use crate::quotes::QuoteMap;
use crate::valuation::logos::logo_url;
use crate::valuation::normalize::normalize_currency;
use crate::valuation::normalize::normalize_percentage;
use crate::valuation::normalize::normalize_text;
use crate::valuation::normalize::normalize_ticker;
use crate::valuation::schema::ColumnRole;
use crate::valuation::schema::ValuationSheet;
use crate::spreadsheet::CellValue;
use serde::Serialize;

/// Margin assigned when no live price is available; sorts after any real margin.
pub const NO_QUOTE_MARGIN: f64 = -999.0;

/// Safety margin of `fair_price` over `current_price`, in percent units.
///
/// Returns [`NO_QUOTE_MARGIN`] unless `current_price` is positive.
pub fn margin_percent(fair_price: f64, current_price: f64) -> f64 {
    if current_price > 0.0 {
        (fair_price - current_price) / current_price * 100.0
    } else {
        NO_QUOTE_MARGIN
    }
}

/// One normalized spreadsheet row, before any quote is attached.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetAsset {
    pub ticker: String,
    pub display_name: String,
    pub fair_price: f64,
    pub dividend_yield: f64,
    pub dividend_per_share: f64,
}

/// Normalizes every data row of the valuation sheet.
///
/// Rows whose ticker cell is empty are skipped. Missing optional columns
/// yield `0.0`, and a missing company name falls back to the ticker.
pub fn extract_assets(sheet: &ValuationSheet) -> Vec<SheetAsset> {
    let column = |row: &[CellValue], role: ColumnRole| -> CellValue {
        sheet
            .roles
            .index(role)
            .and_then(|index| row.get(index))
            .cloned()
            .unwrap_or_default()
    };

    let mut assets = Vec::with_capacity(sheet.table.rows.len());
    for (number, row) in sheet.table.rows.iter().enumerate() {
        let ticker = normalize_ticker(&column(row, ColumnRole::Ticker));
        if ticker.is_empty() {
            tracing::trace!(sheet = %sheet.table.name, row = number, "Skipping row without ticker");
            continue;
        }
        let display_name = normalize_text(&column(row, ColumnRole::CompanyName)).unwrap_or_else(|| ticker.to_owned());
        assets.push(SheetAsset {
            fair_price: normalize_currency(&column(row, ColumnRole::FairPrice)),
            dividend_yield: normalize_percentage(&column(row, ColumnRole::DividendYield)),
            dividend_per_share: normalize_currency(&column(row, ColumnRole::DividendPerShare)),
            display_name,
            ticker,
        });
    }
    assets
}

/// A fully derived row of the two output views.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub ticker: String,
    pub display_name: String,
    pub logo_url: String,
    pub fair_price: f64,
    pub dividend_yield: f64,
    pub dividend_per_share: f64,
    pub current_price: f64,
    pub margin_percent: f64,
}

impl AssetRecord {
    pub fn new(asset: SheetAsset, current_price: f64) -> Self {
        AssetRecord {
            logo_url: logo_url(&asset.ticker),
            margin_percent: margin_percent(asset.fair_price, current_price),
            ticker: asset.ticker,
            display_name: asset.display_name,
            fair_price: asset.fair_price,
            dividend_yield: asset.dividend_yield,
            dividend_per_share: asset.dividend_per_share,
            current_price,
        }
    }
}

/// Attaches the quoted price to every asset; unquoted tickers get `0.0`.
pub fn build_records(assets: Vec<SheetAsset>, quotes: &QuoteMap) -> Vec<AssetRecord> {
    assets
        .into_iter()
        .map(|asset| {
            let price = price_of(quotes, &asset.ticker);
            AssetRecord::new(asset, price)
        })
        .collect()
}

/// Records with a fair price, highest margin first.
pub fn radar_view(records: &[AssetRecord]) -> Vec<AssetRecord> {
    let mut view: Vec<AssetRecord> = records.iter().filter(|record| record.fair_price > 0.0).cloned().collect();
    view.sort_by(|a, b| b.margin_percent.total_cmp(&a.margin_percent));
    view
}

/// Records paying dividends, highest yield first.
pub fn dividend_view(records: &[AssetRecord]) -> Vec<AssetRecord> {
    let mut view: Vec<AssetRecord> = records.iter().filter(|record| record.dividend_yield > 0.0).cloned().collect();
    view.sort_by(|a, b| b.dividend_yield.total_cmp(&a.dividend_yield));
    view
}

/// The two ranked views derived from one valuation sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    /// Name of the sheet the views were derived from
    pub sheet: Option<String>,
    pub radar: Vec<AssetRecord>,
    pub dividends: Vec<AssetRecord>,
}

impl Valuation {
    /// Both views empty, used when no valuation sheet exists
    pub fn empty() -> Self {
        Valuation::default()
    }
}

/// Derives both views from the assets of one sheet and a quote snapshot.
pub fn evaluate_assets(sheet_name: &str, assets: Vec<SheetAsset>, quotes: &QuoteMap) -> Valuation {
    let records = build_records(assets, quotes);
    Valuation {
        sheet: Some(sheet_name.to_owned()),
        radar: radar_view(&records),
        dividends: dividend_view(&records),
    }
}
