//! Tally CLI binary.
//!
//! Provides a command-line interface for ranking, screening and backtesting
//! the companies of a local data directory.

mod integration;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use integration::document_loader::load_universe;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration as StdDuration;
use tally::{
    FsDocumentSource, Pipeline, TallyConfig, TickerUniverse, attach_prices, default_data_dir,
};
use tally_data::{Contracts, RawReport, Selection, StatementReader};
use tally_output::{
    BacktestSummary, ContractOverview, ExportFormat, Exporter, ReportBuilder, RankingSummary,
};
use tally_ranking::registry::rules_by_category;
use tally_ranking::{BackTester, Period, RuleCategory, Screener};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally: financial-statement reconciliation and ranking", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UniverseArgs {
    /// Comma-separated tickers (defaults to every ticker of the data directory)
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Evaluate at this date instead of the latest fiscal period
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Fiscal years to go back
    #[arg(long, default_value = "0")]
    years_back: usize,
}

#[derive(Args)]
struct OutputArgs {
    /// Write the result to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format (csv, json or pretty); guessed from the file extension by default
    #[arg(long)]
    format: Option<ExportFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank contracts with the configured rules
    Rank {
        #[command(flatten)]
        universe: UniverseArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Number of contracts shown
        #[arg(long, default_value = "25")]
        top: usize,

        /// Print Markdown instead of a text table
        #[arg(long)]
        markdown: bool,

        /// Write a JSON report of the run to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Screen contracts with the configured filters, then rank the rest
    Screen {
        #[command(flatten)]
        universe: UniverseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Backtest the configured ranking on daily prices
    Backtest {
        #[command(flatten)]
        universe: UniverseArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// First ranking date
        #[arg(long)]
        start: NaiveDate,

        /// Last ranking date (defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Distance between ranking dates (daily, weekly, monthly, annual)
        #[arg(long)]
        frequency: Option<Period>,

        /// Forward return window in days
        #[arg(long)]
        window: Option<i64>,
    },

    /// Overview of descriptive data and headline metrics
    Overview {
        #[command(flatten)]
        universe: UniverseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Reconcile one SEC report and print the resolved fields
    Resolve {
        /// `RawReport` JSON file
        file: PathBuf,
    },

    /// List the preset rules
    Rules,

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TallyConfig::from_path(path)?,
        None => TallyConfig::default(),
    };
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(default_data_dir)
        .ok_or("no data directory given and no platform data directory found")?;

    match cli.command {
        Commands::Rank {
            universe,
            output,
            top,
            markdown,
            report,
        } => {
            let contracts = load_contracts(&config, &data_dir, &universe).await?;
            let at = selection(&universe);
            let table = config.ranking()?.rank(&contracts, &at);

            let summary = RankingSummary::new(&table, Some(top));
            if markdown {
                println!("{}", summary.to_markdown());
            } else {
                println!("{}", summary.to_ascii_table());
            }
            write_output(&table, &output)?;

            if let Some(path) = report {
                ReportBuilder::new()
                    .title("ranking")
                    .as_of(universe.date)
                    .years_back(universe.years_back)
                    .contents_from(&table)?
                    .build()
                    .export_to_file(&path, ExportFormat::PrettyJson)?;
                println!("Report written to {}", path.display());
            }
        }
        Commands::Screen { universe, output } => {
            let contracts = load_contracts(&config, &data_dir, &universe).await?;
            let at = selection(&universe);
            let screened = Screener::screen(&contracts, &config.filters()?, &at);
            println!("{}", screened.report());

            let table = config.ranking()?.rank(&screened.contracts, &at);
            println!("{}", RankingSummary::new(&table, None).to_ascii_table());
            write_output(&table, &output)?;
        }
        Commands::Backtest {
            universe,
            output,
            start,
            end,
            frequency,
            window,
        } => {
            let mut backtest = config.backtest.clone();
            if let Some(frequency) = frequency {
                backtest.frequency = frequency;
            }
            if let Some(window) = window {
                backtest.window_days = window;
            }
            if universe.years_back > 0 {
                backtest.years_back = universe.years_back;
            }
            let end = end.unwrap_or_else(|| Utc::now().date_naive());

            let contracts = load_contracts(&config, &data_dir, &universe).await?;
            let source = FsDocumentSource::open(&data_dir)?;
            let report = BackTester::new(backtest).run(&config.ranking()?, &contracts, start, end, &source);

            println!("{}", BacktestSummary::new(&report).to_ascii_table());
            write_output(&report, &output)?;
        }
        Commands::Overview { universe, output } => {
            let mut contracts = load_contracts(&config, &data_dir, &universe).await?;
            let source = FsDocumentSource::open(&data_dir)?;
            attach_prices(&mut contracts, &source);

            let overview = ContractOverview::new(&contracts, &selection(&universe));
            let frame = overview.to_frame()?;
            println!("Overview of {} contracts, {} columns", frame.height(), frame.width());
            if output.output.is_none() {
                print!("{}", overview.export_to_string(ExportFormat::Csv)?);
            }
            write_output(&overview, &output)?;
        }
        Commands::Resolve { file } => {
            resolve_report(&config, &file)?;
        }
        Commands::Rules => {
            list_rules();
        }
        Commands::Config => {
            println!("{}", config.to_json()?);
        }
    }

    Ok(())
}

const fn selection(args: &UniverseArgs) -> Selection {
    let at = match args.date {
        Some(date) => Selection::at(date),
        None => Selection::latest(),
    };
    at.with_years_back(args.years_back)
}

async fn load_contracts(
    config: &TallyConfig,
    data_dir: &Path,
    args: &UniverseArgs,
) -> Result<Contracts, Box<dyn std::error::Error>> {
    let source = FsDocumentSource::open(data_dir)?;
    let tickers = if args.tickers.is_empty() {
        source.tickers()?
    } else {
        args.tickers.clone()
    };
    let universe = TickerUniverse::new(tickers, config.universe.clone());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let documents = load_universe(&source, &universe, Some(&pb)).await;
    pb.finish_with_message(format!("Loaded {} tickers", documents.len()));

    let outcome = Pipeline::new(config).assemble(documents)?;
    for error in &outcome.errors {
        eprintln!("Warning: {}", error);
    }
    info!(
        contracts = outcome.contracts.len(),
        missing = outcome.missing.len(),
        "contracts ready"
    );

    let mut contracts = outcome.contracts;
    if args.date.is_some() {
        attach_prices(&mut contracts, &source);
    }
    Ok(contracts)
}

fn write_output(value: &dyn Exporter, args: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &args.output else {
        return Ok(());
    };
    let format = args
        .format
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or_default();
    value.export_to_file(path, format)?;
    println!("Written to {} ({})", path.display(), format.extension());
    Ok(())
}

fn resolve_report(config: &TallyConfig, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = RawReport::from_path(file)?;
    let reader = StatementReader::new(&config.resolution);

    println!("\n{} ({})", report.ticker, report.source);
    println!("{}", "=".repeat(60));
    for kind in config.resolution.sheets.keys() {
        match reader.read_statement(&report, *kind) {
            Ok(record) => {
                println!("{} statement, fiscal year {} ({})", kind, record.fiscal_year, record.fiscal_year_end);
                for (field, value) in &record.values {
                    println!("  {:<30} {:>16.2}", field, value);
                }
            }
            Err(e) => println!("{} statement: {}", kind, e),
        }
    }
    Ok(())
}

fn list_rules() {
    println!("\nPreset Rules:");
    println!("{}", "=".repeat(60));
    for (category, title) in [
        (RuleCategory::Solidity, "Solidity"),
        (RuleCategory::Profitability, "Profitability"),
        (RuleCategory::Valuation, "Valuation"),
    ] {
        println!("\n{}:", title);
        for info in rules_by_category(category) {
            println!("  {:<22} {}", info.name, info.description);
            println!("  {:<22} reads {}", "", info.required_fields.join(", "));
        }
    }
}
