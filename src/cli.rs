//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::chart::build_chart_views;
use crate::domain::config_validation::{
    confidence, parse_date, pool_size, validate_run_config, windows,
};
use crate::domain::error::TraderError;
use crate::domain::ohlcv::{dedupe_by_date, to_points};
use crate::domain::pipeline::{compute_indicators, EnrichedSeries, PipelineParams};
use crate::domain::returns::MissingPolicy;
use crate::domain::risk::RiskSummary;
use crate::domain::run_config::{
    ReportFormat, RunConfig, DEFAULT_DB_PATH, DEFAULT_END_DATE, DEFAULT_START_DATE,
    DEFAULT_SYMBOL, DEFAULT_YAHOO_BASE_URL,
};
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::store_port::PriceStore;

#[derive(Parser, Debug)]
#[command(
    name = "idxtrader",
    about = "Index price history, moving-average signals and historical VaR"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download, store, reload, compute indicators and render charts
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Read prices from a CSV file (or directory of <SYMBOL>.csv) instead of downloading
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        db: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download prices and append them to the store
    Ingest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        db: Option<String>,
    },
    /// Compute indicators from the stored history and render charts
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        db: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show row count and date range of the store
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        db: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            csv,
            db,
            output,
        } => run_full(config.as_ref(), csv.as_ref(), db, output),
        Command::Ingest { config, csv, db } => run_ingest(config.as_ref(), csv.as_ref(), db),
        Command::Analyze { config, db, output } => run_analyze(config.as_ref(), db, output),
        Command::Info { config, db } => run_info(config.as_ref(), db),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, TraderError> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| TraderError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, TraderError> {
    validate_run_config(config)?;

    let (ma_short, ma_long, rsi_window) = windows(config)?;
    let report_format = config
        .get_string("report", "format")
        .and_then(|f| ReportFormat::parse(&f))
        .unwrap_or(ReportFormat::Html);
    let report_output = config
        .get_string("report", "output")
        .map(PathBuf::from)
        .unwrap_or_else(|| report_format.default_output());

    Ok(RunConfig {
        symbol: config
            .get_string("source", "symbol")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
        start_date: parse_date(config, "start_date", DEFAULT_START_DATE)?,
        end_date: parse_date(config, "end_date", DEFAULT_END_DATE)?,
        base_url: config
            .get_string("source", "base_url")
            .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
        db_path: config
            .get_string("sqlite", "path")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        pool_size: pool_size(config)?,
        dedupe_on_load: config.get_bool("sqlite", "dedupe_on_load", false),
        pipeline: PipelineParams {
            ma_short,
            ma_long,
            rsi_window,
            var_confidence: confidence(config)?,
            missing_policy: if config.get_bool("risk", "propagate_gaps", false) {
                MissingPolicy::Propagate
            } else {
                MissingPolicy::Skip
            },
        },
        report_format,
        report_output,
    })
}

fn resolve_run_config(
    config_path: Option<&PathBuf>,
    db_override: Option<String>,
    output_override: Option<PathBuf>,
) -> Result<RunConfig, TraderError> {
    let config = load_config(config_path)?;
    let mut run_config = build_run_config(&config)?;
    if let Some(db) = db_override {
        run_config.db_path = db;
    }
    if let Some(output) = output_override {
        run_config.report_output = output;
    }
    Ok(run_config)
}

fn open_store(run_config: &RunConfig) -> Result<SqliteAdapter, TraderError> {
    let store = SqliteAdapter::open(&run_config.db_path, run_config.pool_size)?;
    store.initialize_schema()?;
    Ok(store)
}

fn open_source(
    run_config: &RunConfig,
    csv: Option<&PathBuf>,
) -> Result<Box<dyn PriceSource>, TraderError> {
    if let Some(path) = csv {
        info!("Reading prices from {}", path.display());
        return Ok(Box::new(CsvAdapter::new(path.clone())));
    }

    #[cfg(feature = "yahoo")]
    {
        use crate::adapters::yahoo_adapter::YahooAdapter;
        Ok(Box::new(YahooAdapter::new(&run_config.base_url)?))
    }

    #[cfg(not(feature = "yahoo"))]
    {
        Err(TraderError::DataSource {
            symbol: run_config.symbol.clone(),
            reason: "yahoo feature is required for downloads (use --csv)".into(),
        })
    }
}

pub fn chart_port_for(run_config: &RunConfig) -> Box<dyn ChartPort> {
    match run_config.report_format {
        ReportFormat::Html => Box::new(HtmlReportAdapter::new(format!(
            "{} Indicator Report",
            run_config.symbol
        ))),
        ReportFormat::Svg => Box::new(SvgChartAdapter::new()),
    }
}

/// Fetch the configured range and append it to the store.
pub fn ingest(
    source: &dyn PriceSource,
    store: &dyn PriceStore,
    run_config: &RunConfig,
) -> Result<usize, TraderError> {
    info!(
        "Downloading {} from {} to {}",
        run_config.symbol, run_config.start_date, run_config.end_date
    );
    let records = source.fetch_prices(
        &run_config.symbol,
        run_config.start_date,
        run_config.end_date,
    )?;

    if records.is_empty() {
        return Err(TraderError::NoData {
            symbol: run_config.symbol.clone(),
        });
    }

    let written = store.append(&records)?;
    info!("Stored {} rows", written);
    Ok(written)
}

/// Reload the full store and run the indicator pipeline over it.
pub fn analyze(store: &dyn PriceStore, run_config: &RunConfig) -> Result<EnrichedSeries, TraderError> {
    let records = store.load_all()?;
    if records.is_empty() {
        return Err(TraderError::NoData {
            symbol: run_config.symbol.clone(),
        });
    }

    let loaded = records.len();
    let unique = dedupe_by_date(records.clone());
    let duplicates = loaded - unique.len();
    let records = if run_config.dedupe_on_load {
        if duplicates > 0 {
            info!("Collapsed {} duplicate dates", duplicates);
        }
        unique
    } else {
        if duplicates > 0 {
            warn!(
                "Store holds {} rows sharing a date; set [sqlite] dedupe_on_load to collapse them",
                duplicates
            );
        }
        records
    };

    if records.len() < run_config.pipeline.ma_long {
        warn!(
            "Only {} rows; the {}-day average and the signal stay undefined",
            records.len(),
            run_config.pipeline.ma_long
        );
    }

    info!("Computing indicators over {} rows", records.len());
    Ok(compute_indicators(&to_points(&records), &run_config.pipeline))
}

/// Build the chart views, render them and return the risk summary.
pub fn render(
    series: &EnrichedSeries,
    symbol: &str,
    chart_port: &dyn ChartPort,
    output: &Path,
) -> Result<(RiskSummary, Vec<PathBuf>), TraderError> {
    let risk = series.risk_summary()?;
    let views = build_chart_views(series, symbol);
    let written = chart_port.render(&views, &risk, output)?;
    for path in &written {
        info!("Chart written to: {}", path.display());
    }
    Ok((risk, written))
}

fn analyze_and_render(store: &dyn PriceStore, run_config: &RunConfig) -> Result<(), TraderError> {
    let series = analyze(store, run_config)?;
    let chart_port = chart_port_for(run_config);
    let (risk, _) = render(
        &series,
        &run_config.symbol,
        chart_port.as_ref(),
        &run_config.report_output,
    )?;
    println!("{risk}");
    Ok(())
}

fn run_full(
    config_path: Option<&PathBuf>,
    csv: Option<&PathBuf>,
    db: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), TraderError> {
    let run_config = resolve_run_config(config_path, db, output)?;
    let store = open_store(&run_config)?;
    let source = open_source(&run_config, csv)?;

    ingest(source.as_ref(), &store, &run_config)?;
    analyze_and_render(&store, &run_config)
}

fn run_ingest(
    config_path: Option<&PathBuf>,
    csv: Option<&PathBuf>,
    db: Option<String>,
) -> Result<(), TraderError> {
    let run_config = resolve_run_config(config_path, db, None)?;
    let store = open_store(&run_config)?;
    let source = open_source(&run_config, csv)?;

    let written = ingest(source.as_ref(), &store, &run_config)?;
    println!("{} rows appended to {}", written, run_config.db_path);
    Ok(())
}

fn run_analyze(
    config_path: Option<&PathBuf>,
    db: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), TraderError> {
    let run_config = resolve_run_config(config_path, db, output)?;
    let store = open_store(&run_config)?;
    analyze_and_render(&store, &run_config)
}

fn run_info(config_path: Option<&PathBuf>, db: Option<String>) -> Result<(), TraderError> {
    let run_config = resolve_run_config(config_path, db, None)?;
    let store = open_store(&run_config)?;

    match store.date_range()? {
        Some((first, last, count)) => {
            let unique = dedupe_by_date(store.load_all()?).len();
            println!(
                "{}: {} rows ({} distinct dates), {} to {}",
                run_config.db_path, count, unique, first, last
            );
        }
        None => println!("{}: no data", run_config.db_path),
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), TraderError> {
    let config = load_config(Some(config_path))?;
    let run_config = build_run_config(&config)?;

    println!("symbol:      {}", run_config.symbol);
    println!(
        "range:       {} to {}",
        run_config.start_date, run_config.end_date
    );
    println!("store:       {}", run_config.db_path);
    println!(
        "indicators:  SMA({}), SMA({}), RSI({})",
        run_config.pipeline.ma_short, run_config.pipeline.ma_long, run_config.pipeline.rsi_window
    );
    println!(
        "risk:        VaR at {:.0}%",
        run_config.pipeline.var_confidence * 100.0
    );
    println!(
        "report:      {:?} -> {}",
        run_config.report_format,
        run_config.report_output.display()
    );
    println!("\nConfiguration is valid.");
    Ok(())
}
