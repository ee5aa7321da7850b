//! History log parsing (columnar storage for one simulated object)
//!
//! A MESA-style history log is a plain-text table: line 1 names the header
//! scalars, line 2 holds their values, the next non-blank line names the
//! data columns, and every remaining non-blank line is one numeric row.
//! Parsing produces a [`HistoryRecord`]: an immutable columnar store keyed
//! by field name, with every column sharing the file's data-row count.
//!
//! An optional rounding pass reformats each sample to a fixed number of
//! fractional digits in scientific notation and reparses it, shrinking the
//! emitted document. The pass runs once at load time and is idempotent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// A scalar from a history file's two-line header.
///
/// Header tokens that parse as numbers become [`HeaderValue::Number`];
/// everything else is kept as text with surrounding double quotes stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Numeric header scalar
    Number(f64),
    /// Textual header scalar (e.g. a version string)
    Text(String),
}

impl HeaderValue {
    fn parse(token: &str) -> Self {
        token.parse::<f64>().map_or_else(
            |_| Self::Text(token.trim_matches('"').to_string()),
            Self::Number,
        )
    }

    /// Get the numeric value, if this scalar is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

/// Options controlling how a history file is loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    fields: Option<Vec<String>>,
    precision: Option<usize>,
}

impl LoadOptions {
    /// Create options that keep every column unrounded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: None,
            precision: None,
        }
    }

    /// Restrict the usable field set to an explicit subset, in subset order.
    ///
    /// A subset name absent from the file fails the load.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Round every sample to `precision` fractional digits in scientific
    /// notation (so `1.23456789` at precision 3 stores `1.235`).
    #[must_use]
    pub const fn precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// The configured rounding precision, if any.
    #[must_use]
    pub const fn rounding(&self) -> Option<usize> {
        self.precision
    }
}

/// Round a sample to `precision` fractional digits in scientific notation.
///
/// Matches the formatting-based reduction applied to history data: the value
/// is printed as `d.dddde±ee` and reparsed, so repeated application with the
/// same precision is a fixed point.
#[must_use]
pub fn round_to_precision(value: f64, precision: usize) -> f64 {
    format!("{value:.precision$e}")
        .parse()
        .unwrap_or(value)
}

/// The parsed, in-memory representation of one history log file.
///
/// ## Invariants
///
/// - every column shares one common length (the file's data-row count)
/// - field names are unique within the record
/// - header keys are unique
///
/// The record is immutable after creation, aside from the rounding pass
/// applied once at load time and the display columns installed during
/// series alignment.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    path: PathBuf,
    header: Vec<(String, HeaderValue)>,
    names: Vec<String>,
    columns: HashMap<String, Vec<f64>>,
    num_rows: usize,
}

impl HistoryRecord {
    /// Load and parse one history file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read,
    /// [`Error::MalformedHeader`] / [`Error::MalformedTable`] if it does not
    /// have the expected shape, and [`Error::FieldNotFound`] if an explicit
    /// field subset names a column the file does not carry.
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let record = Self::parse(path, &text, options)?;
        debug!(
            path = %path.display(),
            rows = record.num_rows,
            fields = record.names.len(),
            "loaded history file"
        );
        Ok(record)
    }

    /// Parse history-file text already in memory.
    ///
    /// # Errors
    ///
    /// Same parse failures as [`HistoryRecord::load`], with `path` used only
    /// for error reporting.
    pub fn parse(path: &Path, text: &str, options: &LoadOptions) -> Result<Self> {
        let malformed_header = |reason: &str| Error::MalformedHeader {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let mut lines = text.lines().enumerate();

        // Two fixed header lines: names, then values.
        let (_, names_line) = lines
            .next()
            .ok_or_else(|| malformed_header("file is empty"))?;
        let header_names: Vec<&str> = names_line.split_whitespace().collect();
        if header_names.is_empty() {
            return Err(malformed_header("header name line is blank"));
        }

        let (_, values_line) = lines
            .next()
            .ok_or_else(|| malformed_header("missing header value line"))?;
        let header_values: Vec<&str> = values_line.split_whitespace().collect();
        if header_values.len() != header_names.len() {
            return Err(malformed_header(&format!(
                "expected {} header values, found {}",
                header_names.len(),
                header_values.len()
            )));
        }

        let mut header = Vec::with_capacity(header_names.len());
        for (name, value) in header_names.iter().zip(&header_values) {
            if header.iter().any(|(existing, _)| existing == name) {
                return Err(malformed_header(&format!("duplicate header key '{name}'")));
            }
            header.push(((*name).to_string(), HeaderValue::parse(value)));
        }

        // First non-blank line after the header names the columns.
        let (column_line_no, column_line) = lines
            .by_ref()
            .find(|(_, line)| !line.trim().is_empty())
            .ok_or_else(|| malformed_header("missing column name line"))?;
        let column_names: Vec<String> = column_line
            .split_whitespace()
            .map(ToString::to_string)
            .collect();
        for (i, name) in column_names.iter().enumerate() {
            if column_names[..i].contains(name) {
                return Err(Error::MalformedTable {
                    path: path.to_path_buf(),
                    line: column_line_no + 1,
                    reason: format!("duplicate column name '{name}'"),
                });
            }
        }

        // Remaining non-blank lines are numeric rows, one value per column.
        let mut data: Vec<Vec<f64>> = vec![Vec::new(); column_names.len()];
        let mut num_rows = 0;
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != column_names.len() {
                return Err(Error::MalformedTable {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    reason: format!(
                        "expected {} values, found {}",
                        column_names.len(),
                        tokens.len()
                    ),
                });
            }
            for (column, token) in data.iter_mut().zip(&tokens) {
                let value: f64 = token.parse().map_err(|_| Error::MalformedTable {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    reason: format!("invalid numeric value '{token}'"),
                })?;
                column.push(value);
            }
            num_rows += 1;
        }

        // Field selection: an explicit subset wins, otherwise all columns
        // in file order.
        let names: Vec<String> = match &options.fields {
            Some(subset) => {
                for field in subset {
                    if !column_names.contains(field) {
                        return Err(Error::FieldNotFound {
                            field: field.clone(),
                            path: path.to_path_buf(),
                        });
                    }
                }
                subset.clone()
            }
            None => column_names.clone(),
        };

        let mut columns: HashMap<String, Vec<f64>> = column_names
            .into_iter()
            .zip(data)
            .filter(|(name, _)| names.contains(name))
            .collect();

        if let Some(precision) = options.precision {
            for column in columns.values_mut() {
                for value in column.iter_mut() {
                    *value = round_to_precision(*value, precision);
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            header,
            names,
            columns,
            num_rows,
        })
    }

    /// The usable field names, in order.
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    /// One column's samples, if the field exists.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// All columns, keyed by name (includes installed display columns).
    #[must_use]
    pub const fn columns(&self) -> &HashMap<String, Vec<f64>> {
        &self.columns
    }

    /// Number of data rows in the file.
    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Header scalars in file order.
    #[must_use]
    pub fn header(&self) -> &[(String, HeaderValue)] {
        &self.header
    }

    /// Look up one header scalar by key.
    #[must_use]
    pub fn header_value(&self, key: &str) -> Option<&HeaderValue> {
        self.header
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Look up a numeric header scalar by key.
    #[must_use]
    pub fn header_number(&self, key: &str) -> Option<f64> {
        self.header_value(key).and_then(HeaderValue::as_number)
    }

    /// The file this record was parsed from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Install the `x_data`/`y_data` display columns from two resolved
    /// fields.
    ///
    /// These back the plot's default display state and are overwritten
    /// client-side when the viewer switches fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldNotFound`] if either field is absent.
    pub fn set_display_columns(&mut self, x_field: &str, y_field: &str) -> Result<()> {
        let x = self
            .columns
            .get(x_field)
            .ok_or_else(|| Error::FieldNotFound {
                field: x_field.to_string(),
                path: self.path.clone(),
            })?
            .clone();
        let y = self
            .columns
            .get(y_field)
            .ok_or_else(|| Error::FieldNotFound {
                field: y_field.to_string(),
                path: self.path.clone(),
            })?
            .clone();
        self.columns.insert("x_data".to_string(), x);
        self.columns.insert("y_data".to_string(), y);
        Ok(())
    }
}
