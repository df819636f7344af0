//! Row normalization: calendar date, weekday and tons.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::RowRejection;
use crate::loader::RawRecord;

/// Monday-first weekday labels used by every weekday table.
pub const WEEKDAY_LABELS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

pub const GRAMS_PER_TON: f64 = 1000.0;

/// Returns the fixed label of `weekday`.
pub fn weekday_label(weekday: Weekday) -> &'static str {
    WEEKDAY_LABELS[weekday.num_days_from_monday() as usize]
}

/// A single disposal record with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisposalRecord {
    pub municipality: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub mass_grams: f64,

    // derived
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub tons: f64,
}

/// Counters describing one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub unparsable_date: usize,
    pub invalid_mass: usize,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<DisposalRecord>,
    pub report: NormalizeReport,
}

impl DisposalRecord {
    /// Builds a record from already-typed parts.
    ///
    /// # Errors
    ///
    /// Returns [`RowRejection`] when the parts do not form a calendar date
    /// or the mass is not finite.
    pub fn new(
        municipality: impl Into<String>,
        year: i32,
        month: u32,
        day: u32,
        mass_grams: f64,
    ) -> Result<Self, RowRejection> {
        let date = compose_date(year, month, day).ok_or_else(|| RowRejection::UnparsableDate {
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        })?;
        if !mass_grams.is_finite() {
            return Err(RowRejection::InvalidMass(mass_grams.to_string()));
        }

        Ok(Self {
            municipality: municipality.into(),
            year,
            month,
            day,
            mass_grams,
            date,
            weekday: date.weekday(),
            tons: mass_grams / GRAMS_PER_TON,
        })
    }

    /// Parses and validates one raw row.
    pub fn from_raw(raw: &RawRecord) -> Result<Self, RowRejection> {
        let unparsable = || RowRejection::UnparsableDate {
            year: raw.year.clone(),
            month: raw.month.clone(),
            day: raw.day.clone(),
        };

        let year = parse_integral(&raw.year)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(unparsable)?;
        let month = parse_integral(&raw.month)
            .and_then(|m| u32::try_from(m).ok())
            .ok_or_else(unparsable)?;
        let day = parse_integral(&raw.day)
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(unparsable)?;
        if compose_date(year, month, day).is_none() {
            return Err(unparsable());
        }

        let mass_grams = raw
            .mass_grams
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite())
            .ok_or_else(|| RowRejection::InvalidMass(raw.mass_grams.clone()))?;

        Self::new(raw.municipality.trim(), year, month, day, mass_grams)
    }
}

impl From<&DisposalRecord> for RawRecord {
    fn from(record: &DisposalRecord) -> Self {
        RawRecord {
            municipality: record.municipality.clone(),
            year: record.year.to_string(),
            month: record.month.to_string(),
            day: record.day.to_string(),
            mass_grams: record.mass_grams.to_string(),
        }
    }
}

/// Four-digit years only, matching what a `YYYY-MM-DD` string can carry.
fn compose_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses an integer, also accepting integral float text like `2023.0`.
fn parse_integral(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

/// Normalizes raw rows, dropping the ones that do not form a calendar date
/// or carry no usable mass.
///
/// Accepts anything convertible into [`RawRecord`], including
/// `&DisposalRecord`, so already-normalized data passes through unchanged.
pub fn normalize<I>(rows: I) -> Normalized
where
    I: IntoIterator,
    I::Item: Into<RawRecord>,
{
    let mut out = Normalized::default();

    for (index, row) in rows.into_iter().enumerate() {
        out.report.rows_read += 1;
        let raw: RawRecord = row.into();

        match DisposalRecord::from_raw(&raw) {
            Ok(record) => out.records.push(record),
            Err(rejection) => {
                debug!(row = index, reason = %rejection, "Row dropped");
                match rejection {
                    RowRejection::UnparsableDate { .. } => out.report.unparsable_date += 1,
                    RowRejection::InvalidMass(_) => out.report.invalid_mass += 1,
                }
            }
        }
    }

    out.report.rows_kept = out.records.len();
    out
}
