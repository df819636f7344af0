//! Delimited-text loader with encoding probing.
//!
//! Municipal exports arrive as UTF-8 (with or without BOM) or in a legacy
//! Korean code page, and nothing in the file says which. The loader tries
//! each configured encoding in order and keeps the first one that both
//! decodes strictly and parses as a rectangular table.

use std::borrow::Cow;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use tracing::{debug, info, warn};

use crate::config::{ColumnNames, DashboardConfig};
use crate::error::{EncodingAttempt, LoadError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A decoder resolved from a configured label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 with an optional leading byte-order mark removed.
    Utf8Sig,
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    /// Resolves a label, accepting the common aliases WHATWG does not list.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8-sig" | "utf8-sig" => Some(Self::Utf8Sig),
            "cp949" | "ms949" | "uhc" => Some(Self::Whatwg(encoding_rs::EUC_KR)),
            "mac-roman" | "macroman" => Some(Self::Whatwg(encoding_rs::MACINTOSH)),
            _ => Encoding::for_label(label.trim().as_bytes()).map(Self::Whatwg),
        }
    }

    /// Decodes `bytes` without replacement characters.
    ///
    /// Returns `None` when the bytes are malformed for this encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Self::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            Self::Whatwg(encoding) => {
                encoding.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

/// The first successful parse of the input file.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// The configured label that decoded the file.
    pub encoding: String,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

/// Positions of the required columns inside a [`RawTable`] header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    municipality: usize,
    year: usize,
    month: usize,
    day: usize,
    mass_grams: usize,
}

/// One input row with the required columns still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub municipality: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub mass_grams: String,
}

impl Schema {
    /// Locates every required column, failing with the full list of the
    /// ones that are missing.
    pub fn resolve(headers: &StringRecord, columns: &ColumnNames) -> Result<Self, LoadError> {
        let found: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let position = |name: &str| found.iter().position(|h| h == name.trim());

        let required = columns.required();
        let missing: Vec<String> = required
            .iter()
            .copied()
            .filter(|&name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns { missing, found });
        }

        let [municipality, year, month, day, mass_grams] =
            required.map(|name| position(name).unwrap_or_default());
        Ok(Self {
            municipality,
            year,
            month,
            day,
            mass_grams,
        })
    }

    pub fn record(&self, row: &StringRecord) -> RawRecord {
        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        RawRecord {
            municipality: field(self.municipality),
            year: field(self.year),
            month: field(self.month),
            day: field(self.day),
            mass_grams: field(self.mass_grams),
        }
    }
}

/// Parses already-decoded text as a delimited table with a header row.
///
/// Short rows are kept; their missing fields read as empty and the
/// normalizer drops them. A row wider than the header fails the parse.
fn parse_table(text: &str, delimiter: u8) -> Result<(StringRecord, Vec<StringRecord>), String> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("no header row".to_string());
    }

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    if let Some(row) = rows.iter().find(|row| row.len() > headers.len()) {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        return Err(format!(
            "line {line} has {} fields but the header has {}",
            row.len(),
            headers.len()
        ));
    }
    Ok((headers, rows))
}

/// Tries each encoding label in order on `bytes` and returns the first
/// table that decodes and parses.
///
/// # Errors
///
/// Returns [`LoadError::UnreadableInput`] listing every attempt when no
/// label works.
pub fn probe_encodings(
    path: &Path,
    bytes: &[u8],
    encodings: &[String],
    delimiter: u8,
) -> Result<RawTable, LoadError> {
    let mut attempts = Vec::with_capacity(encodings.len());

    for label in encodings {
        let Some(encoding) = TextEncoding::from_label(label) else {
            warn!(label = %label, "Unknown encoding label, skipping");
            attempts.push(EncodingAttempt {
                label: label.clone(),
                reason: "unknown encoding label".to_string(),
            });
            continue;
        };

        let Some(text) = encoding.decode(bytes) else {
            debug!(label = %label, "Input is not valid under encoding");
            attempts.push(EncodingAttempt {
                label: label.clone(),
                reason: "malformed byte sequence".to_string(),
            });
            continue;
        };

        match parse_table(&text, delimiter) {
            Ok((headers, rows)) => {
                info!(encoding = %label, rows = rows.len(), "Input decoded");
                return Ok(RawTable {
                    encoding: label.clone(),
                    headers,
                    rows,
                });
            }
            Err(reason) => {
                debug!(label = %label, reason = %reason, "Decoded input did not parse");
                attempts.push(EncodingAttempt {
                    label: label.clone(),
                    reason,
                });
            }
        }
    }

    Err(LoadError::UnreadableInput {
        path: path.to_path_buf(),
        attempts,
    })
}

/// Reads the file at `path` and returns the decoded table together with the
/// typed records of its required columns.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_records(
    path: &Path,
    config: &DashboardConfig,
) -> Result<(RawTable, Vec<RawRecord>), LoadError> {
    let delimiter = config
        .delimiter_byte()
        .ok_or(LoadError::InvalidDelimiter(config.delimiter))?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(bytes = bytes.len(), "Input file read");

    let table = probe_encodings(path, &bytes, &config.encodings, delimiter)?;
    let schema = Schema::resolve(&table.headers, &config.columns)?;
    let records = table.rows.iter().map(|row| schema.record(row)).collect();

    Ok((table, records))
}
