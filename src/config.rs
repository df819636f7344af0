//! Run configuration: encodings to probe, column names, top-K sizes and
//! placement seeds.
//!
//! Stored as a JSON object on disk; every field is optional and falls back
//! to the defaults of the Gyeonggi-do disposal export:
//! ```json
//! {
//!   "encodings": ["utf-8-sig", "cp949"],
//!   "columns": { "municipality": "기초지자체", "mass_grams": "배출량(g)" },
//!   "geo": { "top_k": 10, "seed": 0 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;

/// Encodings tried in order until one decodes and parses the input.
pub const DEFAULT_ENCODINGS: &[&str] = &[
    "utf-8-sig",
    "utf-8",
    "cp949",
    "euc-kr",
    "ISO-8859-1",
    "mac_roman",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub encodings: Vec<String>,
    pub delimiter: char,
    pub columns: ColumnNames,
    pub label_cloud: LabelCloudConfig,
    pub geo: GeoConfig,
}

/// Header names of the five columns the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub municipality: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub mass_grams: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LabelCloudConfig {
    pub top_k: usize,
    pub seed: u64,
}

/// Top-K size, seed and the synthetic coordinate box of the map view.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub top_k: usize,
    pub seed: u64,
    pub lat_origin: f64,
    pub lon_origin: f64,
    pub span: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
            delimiter: ',',
            columns: ColumnNames::default(),
            label_cloud: LabelCloudConfig::default(),
            geo: GeoConfig::default(),
        }
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            municipality: "기초지자체".into(),
            year: "배출연도".into(),
            month: "배출월".into(),
            day: "배출일".into(),
            mass_grams: "배출량(g)".into(),
        }
    }
}

impl Default for LabelCloudConfig {
    fn default() -> Self {
        Self { top_k: 30, seed: 42 }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            seed: 0,
            lat_origin: 37.2,
            lon_origin: 127.0,
            span: 0.5,
        }
    }
}

impl ColumnNames {
    /// Column names in the order the loader resolves them.
    pub fn required(&self) -> [&str; 5] {
        [
            self.municipality.as_str(),
            self.year.as_str(),
            self.month.as_str(),
            self.day.as_str(),
            self.mass_grams.as_str(),
        ]
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        Self::from_json(&content).with_context(|| format!("invalid config file {path}"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        if config.delimiter_byte().is_none() {
            anyhow::bail!("delimiter {:?} must be a single ASCII character", config.delimiter);
        }
        Ok(config)
    }

    /// Resolves the config from an explicit path, then `FOOD_WASTE_CONFIG`,
    /// then the built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var("FOOD_WASTE_CONFIG") {
                Ok(p) if !p.is_empty() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// The delimiter as a csv byte, or `None` when it is not ASCII.
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}
