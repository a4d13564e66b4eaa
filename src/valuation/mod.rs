//! # Valuation
//!
//! Turns an untyped spreadsheet into two ranked views:
//!
//! - **Radar**: assets with a fair price ("Bazin" ceiling), ordered by safety
//!   margin `(fair - current) / current * 100`, unquoted assets last.
//! - **Dividends**: assets with a positive dividend yield, highest first.
//!
//! Column discovery is a keyword search over headers ([`schema`]); cell text
//! such as `"R$ 1.234,56"` or `"8,2%"` is normalized to plain numbers
//! ([`normalize`]); live prices come from any [`QuoteSource`].
pub mod engine;
pub mod logos;
pub mod normalize;
pub mod schema;

use crate::error::DinheiroError;
use crate::quotes::merge::distinct_tickers;
use crate::quotes::merge::fetch_quotes;
use crate::quotes::QuoteSource;
use crate::spreadsheet::Criteria;
use crate::spreadsheet::Spreadsheet;
use thiserror::Error;

pub use crate::valuation::engine::AssetRecord;
pub use crate::valuation::engine::Valuation;
pub use crate::valuation::schema::ColumnRole;
pub use crate::valuation::schema::ColumnRoleMap;
pub use crate::valuation::schema::ValuationSheet;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("No usable valuation data in '{0}': no sheet has both a ticker and a Bazin column")]
    SchemaNotFound(String),
}

/// Runs the whole pipeline over one spreadsheet.
///
/// Quotes are requested once for the distinct tickers of the selected sheet.
/// Fails with [`ValuationError::SchemaNotFound`] when no candidate sheet has
/// ticker and fair-price columns.
pub fn value_spreadsheet(
    spreadsheet: &mut dyn Spreadsheet,
    criteria: &Criteria,
    quote_source: &dyn QuoteSource,
) -> Result<Valuation, DinheiroError> {
    let sheet = schema::find_valuation_sheet(spreadsheet, criteria)?;
    let assets = engine::extract_assets(&sheet);
    let tickers = distinct_tickers(assets.iter().map(|asset| asset.ticker.as_str()));
    let quotes = fetch_quotes(quote_source, &tickers);

    let asset_count = assets.len();
    let valuation = engine::evaluate_assets(&sheet.table.name, assets, &quotes);
    tracing::info!(
        file = %spreadsheet.name(),
        sheet = %sheet.table.name,
        assets = asset_count,
        quoted = quotes.len(),
        radar = valuation.radar.len(),
        dividends = valuation.dividends.len(),
        "Valuation complete"
    );
    Ok(valuation)
}
