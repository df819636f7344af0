//! CLI entry point for the food-waste dashboard pipeline.
//!
//! Provides subcommands for emitting the full dashboard report as JSON,
//! exporting each table as CSV, and logging a short summary.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use food_waste_dash::aggregators::aggregate::busiest_weekday_per_year;
use food_waste_dash::aggregators::report::build_report;
use food_waste_dash::normalize::weekday_label;
use food_waste_dash::{
    config::DashboardConfig,
    dataset::Dataset,
    output::{export_tables, print_pretty, write_json},
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_INPUT: &str = "data/2022~2024 경기도 일별 지자체 음식물 쓰레기 배출내역.csv";

#[derive(Parser)]
#[command(name = "food_waste_dash")]
#[command(about = "Aggregates daily municipal food-waste disposal records", long_about = None)]
struct Cli {
    /// JSON config file (defaults to $FOOD_WASTE_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every dashboard table and print it as JSON
    Report {
        /// Disposal records CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export each dashboard table as its own CSV file
    Export {
        /// Disposal records CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Directory to write the tables into
        #[arg(short = 'd', long, default_value = "tables")]
        output_dir: PathBuf,

        /// Gzip compress each table
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Log record counts, busiest weekdays and the recommended site
    Summary {
        /// Disposal records CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/food_waste_dash.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("food_waste_dash.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { input, output } => {
            let dataset = load_dataset(&input, &config)?;
            let report = build_report(&dataset, &config);
            print_pretty(&report);
            write_json(&report, output.as_deref())?;
        }
        Commands::Export {
            input,
            output_dir,
            gzip,
        } => {
            let dataset = load_dataset(&input, &config)?;
            let report = build_report(&dataset, &config);
            let paths = export_tables(&report, &output_dir, gzip)?;
            for path in &paths {
                info!(path = %path.display(), "Table exported");
            }
        }
        Commands::Summary { input } => {
            let dataset = load_dataset(&input, &config)?;
            summarize(&dataset, &config);
        }
    }

    Ok(())
}

/// Loads the dataset, logging the diagnostic before the error ends the run.
fn load_dataset(input: &Path, config: &DashboardConfig) -> Result<Dataset> {
    match Dataset::load(input, config) {
        Ok(dataset) => Ok(dataset),
        Err(e) => {
            error!(error = %e, "Input could not be loaded; no tables were produced");
            Err(e.into())
        }
    }
}

/// Logs the headline facts of every dashboard view.
fn summarize(dataset: &Dataset, config: &DashboardConfig) {
    if dataset.is_empty() {
        warn!(
            source = %dataset.source().display(),
            "No records survived normalization; every table is empty"
        );
    }
    let report = build_report(dataset, config);
    let counts = report.normalize;

    info!(
        source = %report.source,
        encoding = %report.encoding,
        rows_read = counts.rows_read,
        rows_kept = counts.rows_kept,
        unparsable_date = counts.unparsable_date,
        invalid_mass = counts.invalid_mass,
        total_tons = dataset.total_tons(),
        "Dataset summary"
    );

    for year in &report.yearly {
        info!(year = year.year, tons = year.tons, "Yearly total");
    }

    for (year, weekday, ratio) in busiest_weekday_per_year(&report.weekday_ratio) {
        info!(year, weekday = weekday_label(weekday), percent = ratio, "Busiest weekday");
    }

    match &report.geo.recommended {
        Some(site) => info!(
            municipality = %site.municipality,
            tons = site.tons,
            lat = site.lat,
            lon = site.lon,
            "Recommended RFID disposal unit site"
        ),
        None => warn!("No records; no installation site to recommend"),
    }

    match &report.yoy_weekday {
        Some(yoy) => {
            for row in &yoy.rows {
                info!(
                    from_year = yoy.from_year,
                    to_year = yoy.to_year,
                    weekday = weekday_label(row.weekday),
                    diff = row.diff,
                    "Weekday share change"
                );
            }
        }
        None => warn!("Fewer than two years of data; no year-over-year comparison"),
    }
}
