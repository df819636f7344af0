//! The in-memory dataset every aggregation reads from.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::error::LoadError;
use crate::loader::load_records;
use crate::normalize::{DisposalRecord, NormalizeReport, normalize};

/// Normalized disposal records loaded once per run.
///
/// Built by [`Dataset::load`] and handed by reference to each aggregation;
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    encoding: String,
    records: Vec<DisposalRecord>,
    report: NormalizeReport,
}

impl Dataset {
    /// Loads, decodes and normalizes the file at `path`.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] is fatal: the caller should stop without rendering.
    pub fn load(path: &Path, config: &DashboardConfig) -> Result<Self, LoadError> {
        let (table, raw) = load_records(path, config)?;
        let normalized = normalize(raw);
        let report = normalized.report;

        if report.rows_kept < report.rows_read {
            warn!(
                dropped = report.rows_read - report.rows_kept,
                unparsable_date = report.unparsable_date,
                invalid_mass = report.invalid_mass,
                "Rows excluded from every table"
            );
        }
        info!(
            source = %path.display(),
            encoding = %table.encoding,
            records = report.rows_kept,
            "Dataset loaded"
        );

        Ok(Self {
            source: path.to_path_buf(),
            encoding: table.encoding,
            records: normalized.records,
            report,
        })
    }

    /// Wraps records that are already normalized.
    pub fn from_records(records: Vec<DisposalRecord>) -> Self {
        let report = NormalizeReport {
            rows_read: records.len(),
            rows_kept: records.len(),
            ..Default::default()
        };
        Self {
            source: PathBuf::new(),
            encoding: String::new(),
            records,
            report,
        }
    }

    pub fn records(&self) -> &[DisposalRecord] {
        &self.records
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn report(&self) -> NormalizeReport {
        self.report
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn total_tons(&self) -> f64 {
        self.records.iter().map(|r| r.tons).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, month: u32, day: u32, grams: f64) -> DisposalRecord {
        DisposalRecord::new("수원시", year, month, day, grams).unwrap()
    }

    #[test]
    fn test_years_are_distinct_and_sorted() {
        let dataset = Dataset::from_records(vec![
            record(2024, 1, 1, 1.0),
            record(2022, 1, 1, 1.0),
            record(2024, 5, 1, 1.0),
        ]);
        assert_eq!(dataset.years(), vec![2022, 2024]);
        assert_eq!(dataset.report().rows_kept, 3);
    }

    #[test]
    fn test_total_tons() {
        let dataset =
            Dataset::from_records(vec![record(2024, 1, 1, 500.0), record(2024, 1, 2, 1500.0)]);
        assert_eq!(dataset.total_tons(), 2.0);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn test_all_rows_dropped_leaves_empty_dataset() {
        let path = std::env::temp_dir().join("food_waste_dash_test_only_bad_rows.csv");
        std::fs::write(
            &path,
            "기초지자체,배출연도,배출월,배출일,배출량(g)\n수원시,2023,13,1,100\n",
        )
        .unwrap();

        let dataset = Dataset::load(&path, &DashboardConfig::default()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.report().rows_read, 1);
        assert_eq!(dataset.total_tons(), 0.0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_short_row_counts_as_unparsable_date() {
        let path = std::env::temp_dir().join("food_waste_dash_test_short_row.csv");
        std::fs::write(
            &path,
            "기초지자체,배출연도,배출월,배출일,배출량(g)\n수원시,2023,1,2,1000\n성남시,2023,1\n",
        )
        .unwrap();

        let dataset = Dataset::load(&path, &DashboardConfig::default()).unwrap();
        let report = dataset.report();
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.unparsable_date, 1);
        assert_eq!(dataset.records()[0].municipality, "수원시");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Dataset::load(Path::new("/no/such/input.csv"), &DashboardConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
