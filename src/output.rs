//! Output formatting and persistence for dashboard reports.
//!
//! Supports pretty-printing, JSON serialization, and one CSV file per table.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregators::types::DashboardReport;

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &DashboardReport) {
    debug!("{:#?}", report);
}

/// Writes the report as pretty JSON to `path`, or to stdout when `None`.
pub fn write_json(report: &DashboardReport, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(file, report)?;
            info!(path = %path.display(), "Report written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, report)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

/// Serializes `rows` as CSV into `sink` and hands the sink back.
fn write_rows<W: Write, T: Serialize>(sink: W, rows: &[T]) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))
}

/// Writes one table to `dir/name.csv`, or `dir/name.csv.gz` when `gzip`.
///
/// An empty table produces an empty file.
pub fn write_table<T: Serialize>(
    dir: &Path,
    name: &str,
    rows: &[T],
    gzip: bool,
) -> Result<PathBuf> {
    let path = if gzip {
        dir.join(format!("{name}.csv.gz"))
    } else {
        dir.join(format!("{name}.csv"))
    };
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;

    if gzip {
        let encoder = write_rows(GzEncoder::new(file, Compression::default()), rows)?;
        encoder.finish()?;
    } else {
        write_rows(file, rows)?;
    }

    debug!(path = %path.display(), rows = rows.len(), "Table written");
    Ok(path)
}

/// Exports every table of `report` into `dir`, creating it if needed.
///
/// Returns the written paths in table order.
pub fn export_tables(report: &DashboardReport, dir: &Path, gzip: bool) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let yoy_rows = report
        .yoy_weekday
        .as_ref()
        .map(|yoy| yoy.rows.as_slice())
        .unwrap_or_default();

    let paths = vec![
        write_table(dir, "weekday_ratio", &report.weekday_ratio, gzip)?,
        write_table(dir, "monthly", &report.monthly, gzip)?,
        write_table(dir, "yearly", &report.yearly, gzip)?,
        write_table(dir, "label_cloud", &report.label_cloud, gzip)?,
        write_table(dir, "geo", &report.geo.sites, gzip)?,
        write_table(dir, "yoy_weekday", yoy_rows, gzip)?,
    ];

    info!(dir = %dir.display(), tables = paths.len(), gzip, "Tables exported");
    Ok(paths)
}
