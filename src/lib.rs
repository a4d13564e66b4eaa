//! # Dinheiro Data
//!
//! Valuation core for investor spreadsheets. Reads a loosely-structured
//! workbook or CSV export, finds the columns that matter by keyword, cleans
//! localized numbers such as `R$ 1.234,56` and `8,2%`, prices every ticker
//! against a quote source and derives two ranked views.
//!
//! ## Features
//!
//! - **Spreadsheet ingestion**: Excel workbooks (`.xlsx`, `.xlsm`) parsed from
//!   the ZIP package and delimited exports (`.csv`, `.txt`), local or over HTTP
//! - **Schema discovery**: ticker, company, fair price ("Bazin"), dividend yield
//!   and dividend per share columns located by header keyword
//! - **Total normalization**: malformed cells degrade to zero instead of failing
//! - **Fair-price radar**: safety margin against the live price, unquoted assets last
//! - **Dividend projection**: assets ranked by dividend yield
//! - **Market panorama**: daily moves of indices, currencies, crypto and top stocks
//!
//! ## Example
//!
//! ```no_run
//! use dinheiro_data::quotes::StaticQuoteSource;
//! use dinheiro_data::spreadsheet::{open_spreadsheet, Criteria};
//! use dinheiro_data::valuation::value_spreadsheet;
//!
//! let mut spreadsheet = open_spreadsheet("PEC.xlsx")?;
//! let prices = StaticQuoteSource::new([("BBAS3".to_owned(), 28.90)].into_iter().collect());
//! let valuation = value_spreadsheet(spreadsheet.as_mut(), &Criteria::default(), &prices)?;
//! for record in &valuation.radar {
//!     println!("{} {:.2}%", record.ticker, record.margin_percent);
//! }
//! # Ok::<(), dinheiro_data::error::DinheiroError>(())
//! ```
mod helpers;

pub mod config;
pub mod error;
pub mod logging;
pub mod quotes;
pub mod report;
pub mod spreadsheet;
pub mod valuation;

pub use crate::error::DinheiroError;
pub use crate::valuation::AssetRecord;
pub use crate::valuation::Valuation;
