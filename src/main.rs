use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use dinheiro_data::config::Config;
use dinheiro_data::config::QuoteProvider;
use dinheiro_data::logging::init_logging;
use dinheiro_data::quotes::panorama::build_panorama;
use dinheiro_data::quotes::panorama::MarketPanel;
use dinheiro_data::quotes::yahoo::YahooQuoteSource;
use dinheiro_data::quotes::NoQuoteSource;
use dinheiro_data::quotes::QuoteSource;
use dinheiro_data::quotes::StaticQuoteSource;
use dinheiro_data::report::render;
use dinheiro_data::report::render_columns;
use dinheiro_data::report::OutputFormat;
use dinheiro_data::report::Report;
use dinheiro_data::report::SheetColumns;
use dinheiro_data::spreadsheet::open_spreadsheet;
use dinheiro_data::valuation::schema::resolve_columns;
use dinheiro_data::valuation::value_spreadsheet;
use dinheiro_data::DinheiroError;
use dinheiro_data::Valuation;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dinheiro")]
#[command(about = "Fair-price radar and dividend projection from investor spreadsheets")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./dinheiro.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank assets by safety margin and by dividend yield
    Radar {
        /// Spreadsheet path or URL (defaults to the configured fallback files)
        file: Option<String>,
        /// JSON file of fixed prices used instead of live quotes
        #[arg(long)]
        prices: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Skip the market panorama
        #[arg(long)]
        no_panorama: bool,
    },
    /// Show the column roles recognized in every candidate sheet
    Columns {
        file: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the market panorama only
    Panorama {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// The explicit input, or the first configured fallback file that exists.
fn resolve_input(file: Option<String>, config: &Config) -> Result<String> {
    if let Some(file) = file {
        return Ok(file);
    }
    match config.sheet.fallback_files.iter().find(|candidate| Path::new(candidate).is_file()) {
        Some(candidate) => {
            tracing::info!(file = %candidate, "Using fallback spreadsheet");
            Ok(candidate.to_owned())
        }
        None => bail!(
            "No spreadsheet given and none of the fallback files exist: {}",
            config.sheet.fallback_files.join(", ")
        ),
    }
}

fn yahoo_source(config: &Config) -> Result<YahooQuoteSource> {
    let source = YahooQuoteSource::new(&config.quotes.base_url, &config.quotes.symbol_suffix, config.quote_timeout())
        .context("Failed to create quote client")?;
    Ok(source)
}

fn quote_source(config: &Config, prices: Option<&str>) -> Result<Box<dyn QuoteSource>> {
    if let Some(prices) = prices {
        return Ok(Box::new(StaticQuoteSource::from_file(prices)?));
    }
    let source: Box<dyn QuoteSource> = match config.quote_provider()? {
        QuoteProvider::Yahoo => Box::new(yahoo_source(config)?),
        QuoteProvider::None => Box::new(NoQuoteSource),
    };
    Ok(source)
}

fn panorama(config: &Config) -> Result<Option<Vec<MarketPanel>>> {
    if config.quote_provider()? == QuoteProvider::None {
        tracing::info!("Quote provider disabled, skipping panorama");
        return Ok(None);
    }
    let source = yahoo_source(config)?;
    Ok(Some(build_panorama(&source, &config.panorama.panels)))
}

fn radar(config: &Config, file: Option<String>, prices: Option<String>, format: OutputFormat, no_panorama: bool) -> Result<()> {
    let input = resolve_input(file, config)?;
    let mut spreadsheet = open_spreadsheet(&input).with_context(|| format!("Failed to open spreadsheet '{}'", input))?;
    let criteria = config.criteria()?;
    let source = quote_source(config, prices.as_deref())?;

    let (valuation, notice) = match value_spreadsheet(spreadsheet.as_mut(), &criteria, &*source) {
        Ok(valuation) => (valuation, None),
        Err(DinheiroError::ValuationError(error)) => {
            tracing::warn!(%error, "No valuation sheet found");
            (Valuation::empty(), Some(error.to_string()))
        }
        Err(error) => return Err(error).with_context(|| format!("Failed to read spreadsheet '{}'", input)),
    };

    let panels = if no_panorama || !config.panorama.enabled {
        None
    } else {
        panorama(config)?
    };
    let report = Report {
        notice,
        valuation: Some(&valuation),
        panorama: panels.as_deref(),
    };
    print!("{}", render(&report, format)?);
    Ok(())
}

fn columns(config: &Config, file: Option<String>, format: OutputFormat) -> Result<()> {
    let input = resolve_input(file, config)?;
    let mut spreadsheet = open_spreadsheet(&input).with_context(|| format!("Failed to open spreadsheet '{}'", input))?;
    let tables = spreadsheet.read_sheets(&config.criteria()?)?;
    let columns: Vec<SheetColumns> = tables
        .iter()
        .map(|table| SheetColumns::new(&table.name, &resolve_columns(&table.headers)))
        .collect();
    print!("{}", render_columns(&columns, format)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Radar {
            file,
            prices,
            format,
            no_panorama,
        } => radar(&config, file, prices, format, no_panorama),
        Commands::Columns { file, format } => columns(&config, file, format),
        Commands::Panorama { format } => {
            let panels = panorama(&config)?.unwrap_or_default();
            let report = Report {
                panorama: Some(panels.as_slice()),
                ..Default::default()
            };
            print!("{}", render(&report, format)?);
            Ok(())
        }
    }
}
