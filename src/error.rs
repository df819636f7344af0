//! Error types for loading and normalizing disposal records.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while turning an input file into a [`Dataset`].
///
/// Any of these stops the run before a single table is produced.
///
/// [`Dataset`]: crate::dataset::Dataset
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open input file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "could not read {} under any configured encoding ({})",
        path.display(),
        Attempts(attempts)
    )]
    UnreadableInput {
        path: PathBuf,
        attempts: Vec<EncodingAttempt>,
    },
    #[error("delimiter {0:?} must be a single ASCII character")]
    InvalidDelimiter(char),
    #[error("input is missing required column(s) {missing:?}; found {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

/// One failed decode/parse attempt under a single encoding label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingAttempt {
    pub label: String,
    pub reason: String,
}

struct Attempts<'a>(&'a [EncodingAttempt]);

impl fmt::Display for Attempts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no encodings configured");
        }
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", attempt.label, attempt.reason)?;
        }
        Ok(())
    }
}

/// Why a single row was left out of the normalized dataset.
///
/// Rejections are counted and logged, never propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("year={year:?} month={month:?} day={day:?} is not a calendar date")]
    UnparsableDate {
        year: String,
        month: String,
        day: String,
    },
    #[error("mass {0:?} is not a finite number of grams")]
    InvalidMass(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_input_lists_every_attempt() {
        let err = LoadError::UnreadableInput {
            path: PathBuf::from("data.csv"),
            attempts: vec![
                EncodingAttempt {
                    label: "utf-8".into(),
                    reason: "malformed byte sequence".into(),
                },
                EncodingAttempt {
                    label: "cp949".into(),
                    reason: "ragged row".into(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("data.csv"));
        assert!(message.contains("utf-8: malformed byte sequence; cp949: ragged row"));
    }

    #[test]
    fn test_unreadable_input_without_encodings() {
        let err = LoadError::UnreadableInput {
            path: PathBuf::from("x.csv"),
            attempts: vec![],
        };
        assert!(err.to_string().contains("no encodings configured"));
    }
}
