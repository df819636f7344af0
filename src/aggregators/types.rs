//! Result tables produced by the aggregation pipeline.

use chrono::{DateTime, Utc, Weekday};
use serde::{Serialize, Serializer};

use crate::normalize::{NormalizeReport, weekday_label};

fn serialize_weekday<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_label(*weekday))
}

/// How a share of a parent-group total is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioScale {
    /// 0.0 – 1.0
    Fraction,
    /// 0.0 – 100.0
    Percent,
}

/// One weekday's summed tons within a year and its share of that year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayRatioRow {
    pub year: i32,
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub tons: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotalRow {
    pub month: u32,
    pub tons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTotalRow {
    pub year: i32,
    pub tons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityTotal {
    pub municipality: String,
    pub tons: f64,
}

/// Change of a weekday's share between two successive years present in the
/// data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayRatioDiff {
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub from_year: i32,
    pub to_year: i32,
    pub from_ratio: f64,
    pub to_ratio: f64,
    pub diff: f64,
}

/// Year-over-year weekday table for the most recent pair of years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YoyWeekdayDiff {
    pub from_year: i32,
    pub to_year: i32,
    pub rows: Vec<WeekdayRatioDiff>,
}

/// A municipality placed in the label cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCloudEntry {
    pub rank: usize,
    pub municipality: String,
    pub tons: f64,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub highlighted: bool,
}

/// A municipality placed on the map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoSite {
    pub rank: usize,
    pub municipality: String,
    pub tons: f64,
    pub lat: f64,
    pub lon: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoView {
    pub sites: Vec<GeoSite>,
    /// The highest-volume site, suggested for an RFID disposal unit.
    pub recommended: Option<GeoSite>,
}

/// Every table behind the dashboard, computed from one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub encoding: String,
    pub normalize: NormalizeReport,
    pub weekday_ratio: Vec<WeekdayRatioRow>,
    pub monthly: Vec<MonthlyTotalRow>,
    pub yearly: Vec<YearlyTotalRow>,
    pub label_cloud: Vec<LabelCloudEntry>,
    pub geo: GeoView,
    pub yoy_weekday: Option<YoyWeekdayDiff>,
}
