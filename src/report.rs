//! Plain-text and JSON rendering of valuation results.
use crate::error::DinheiroError;
use crate::quotes::panorama::MarketPanel;
use crate::valuation::engine::NO_QUOTE_MARGIN;
use crate::valuation::AssetRecord;
use crate::valuation::ColumnRole;
use crate::valuation::ColumnRoleMap;
use crate::valuation::Valuation;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything one command prints.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    /// Informational message, e.g. why the views are empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<&'a Valuation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panorama: Option<&'a [MarketPanel]>,
}

/// Column roles resolved for one sheet, as shown by the `columns` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetColumns {
    pub sheet: String,
    pub valuation_sheet: bool,
    pub columns: Vec<(ColumnRole, String)>,
}

impl SheetColumns {
    pub fn new(sheet: &str, roles: &ColumnRoleMap) -> Self {
        SheetColumns {
            sheet: sheet.to_owned(),
            valuation_sheet: roles.is_valuation_sheet(),
            columns: roles
                .resolved()
                .map(|(role, column)| (role, column.header.to_owned()))
                .collect(),
        }
    }
}

/// Formats `value` as Brazilian currency, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, fraction)
}

/// Formats a percent-unit value with a decimal comma, e.g. `8,20%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value).replace('.', ",")
}

fn format_margin(record: &AssetRecord) -> String {
    if record.margin_percent == NO_QUOTE_MARGIN {
        "sem cotação".to_owned()
    } else {
        format_percent(record.margin_percent)
    }
}

fn format_price(value: f64) -> String {
    if value > 0.0 { format_brl(value) } else { "-".to_owned() }
}

fn write_radar(out: &mut String, records: &[AssetRecord]) -> std::fmt::Result {
    writeln!(out, "RADAR DE PREÇO JUSTO")?;
    if records.is_empty() {
        return writeln!(out, "  (vazio)");
    }
    writeln!(out, "  {:<8} {:<24} {:>14} {:>14} {:>12}", "TICKER", "EMPRESA", "ATUAL", "BAZIN", "MARGEM")?;
    for record in records {
        writeln!(
            out,
            "  {:<8} {:<24} {:>14} {:>14} {:>12}",
            record.ticker,
            truncate(&record.display_name, 24),
            format_price(record.current_price),
            format_brl(record.fair_price),
            format_margin(record)
        )?;
    }
    Ok(())
}

fn write_dividends(out: &mut String, records: &[AssetRecord]) -> std::fmt::Result {
    writeln!(out, "PROJEÇÃO DE DIVIDENDOS")?;
    if records.is_empty() {
        return writeln!(out, "  (vazio)");
    }
    writeln!(out, "  {:<8} {:<24} {:>10} {:>14} {:>14}", "TICKER", "EMPRESA", "DY", "DPA", "ATUAL")?;
    for record in records {
        writeln!(
            out,
            "  {:<8} {:<24} {:>10} {:>14} {:>14}",
            record.ticker,
            truncate(&record.display_name, 24),
            format_percent(record.dividend_yield),
            format_brl(record.dividend_per_share),
            format_price(record.current_price)
        )?;
    }
    Ok(())
}

fn write_panorama(out: &mut String, panels: &[MarketPanel]) -> std::fmt::Result {
    for panel in panels {
        writeln!(out, "{}", panel.title)?;
        for change in &panel.moves {
            if change.is_placeholder() {
                writeln!(out, "  {:<16} {:>14} {:>10}", change.name, "-", "-")?;
            } else {
                writeln!(
                    out,
                    "  {:<16} {:>14} {:>10}",
                    change.name,
                    format!("{:.2}", change.price).replace('.', ","),
                    format_percent(change.change_percent)
                )?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_owned()
    } else {
        let mut truncated: String = text.chars().take(width - 1).collect();
        truncated.push('…');
        truncated
    }
}

fn render_text(report: &Report) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    if let Some(panels) = report.panorama {
        write_panorama(&mut out, panels)?;
    }
    if let Some(notice) = &report.notice {
        writeln!(out, "{}", notice)?;
    }
    if let Some(valuation) = report.valuation {
        if let Some(sheet) = &valuation.sheet {
            writeln!(out, "Planilha: {}\n", sheet)?;
        }
        write_radar(&mut out, &valuation.radar)?;
        writeln!(out)?;
        write_dividends(&mut out, &valuation.dividends)?;
    }
    Ok(out)
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String, DinheiroError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => render_text(report)
            .map_err(|error| DinheiroError::WithContextError(format!("Failed to render report: {}", error))),
    }
}

pub fn render_columns(columns: &[SheetColumns], format: OutputFormat) -> Result<String, DinheiroError> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(columns)?);
    }
    let mut out = String::new();
    for sheet in columns {
        let marker = if sheet.valuation_sheet { " *" } else { "" };
        out.push_str(&format!("{}{}\n", sheet.sheet, marker));
        if sheet.columns.is_empty() {
            out.push_str("  (nenhuma coluna reconhecida)\n");
        }
        for (role, header) in &sheet.columns {
            out.push_str(&format!("  {:<20} {}\n", role.to_string(), header));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::panorama::MarketMove;
    use crate::valuation::engine::SheetAsset;
    use crate::valuation::schema::resolve_columns;

    fn record(ticker: &str, fair_price: f64, price: f64) -> AssetRecord {
        AssetRecord::new(
            SheetAsset {
                ticker: ticker.to_owned(),
                display_name: "Banco do Brasil".to_owned(),
                fair_price,
                dividend_yield: 8.2,
                dividend_per_share: 2.83,
            },
            price,
        )
    }

    #[test]
    fn brazilian_currency() {
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(34.5), "R$ 34,50");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(-12.3), "-R$ 12,30");
        assert_eq!(format_percent(19.377), "19,38%");
    }

    #[test]
    fn text_report() {
        let valuation = Valuation {
            sheet: Some("Página1".to_owned()),
            radar: vec![record("BBAS3", 34.5, 28.9), record("ITUB4", 40.0, 0.0)],
            dividends: vec![record("BBAS3", 34.5, 28.9)],
        };
        let report = Report {
            valuation: Some(&valuation),
            ..Default::default()
        };
        let text = render(&report, OutputFormat::Text).unwrap();
        assert!(text.contains("Planilha: Página1"));
        assert!(text.contains("19,38%"));
        assert!(text.contains("sem cotação"));
        assert!(text.contains("R$ 2,83"));
    }

    #[test]
    fn json_report_skips_missing_parts() {
        let report = Report {
            notice: Some("Nenhuma planilha".to_owned()),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["notice"], "Nenhuma planilha");
        assert!(json.get("valuation").is_none());
    }

    #[test]
    fn panorama_text() {
        let panels = vec![MarketPanel {
            title: "INDICES_MOEDAS".to_owned(),
            moves: vec![MarketMove::from_closes("IBOVESPA", &[100.0, 110.0]), MarketMove::from_closes("-", &[])],
        }];
        let report = Report {
            panorama: Some(panels.as_slice()),
            ..Default::default()
        };
        let text = render(&report, OutputFormat::Text).unwrap();
        assert!(text.contains("INDICES_MOEDAS"));
        assert!(text.contains("10,00%"));
    }

    #[test]
    fn columns_listing() {
        let headers = vec!["Ticker".to_owned(), "Preço Bazin".to_owned()];
        let columns = vec![SheetColumns::new("Página1", &resolve_columns(&headers))];
        let text = render_columns(&columns, OutputFormat::Text).unwrap();
        assert!(text.starts_with("Página1 *"));
        assert!(text.contains("fair price"));

        let json = render_columns(&columns, OutputFormat::Json).unwrap();
        assert!(json.contains("\"valuationSheet\": true"));
        assert!(json.contains("\"fairPrice\""));
    }
}
