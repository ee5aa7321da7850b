//! Multi-series alignment
//!
//! Given several [`HistoryRecord`]s (one per simulated object), resolve the
//! field vocabulary common to all of them and one (x, y) field pair valid
//! across every record. Requested fields that are not universally available
//! fall back to the first two common-vocabulary entries, with a notice.
//!
//! Alignment is strictly sequential and single-pass; records are consumed
//! and carried inside the resulting [`SeriesSet`].

use std::collections::HashSet;

use tracing::warn;

use crate::history::HistoryRecord;
use crate::{Error, Result};

/// Optional caller-requested axis fields.
#[derive(Debug, Clone, Default)]
pub struct AxisRequest {
    x_field: Option<String>,
    y_field: Option<String>,
}

impl AxisRequest {
    /// Request nothing; both axes resolve from the records.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x_field: None,
            y_field: None,
        }
    }

    /// Request an x-axis field.
    #[must_use]
    pub fn x_field(mut self, field: impl Into<String>) -> Self {
        self.x_field = Some(field.into());
        self
    }

    /// Request a y-axis field.
    #[must_use]
    pub fn y_field(mut self, field: impl Into<String>) -> Self {
        self.y_field = Some(field.into());
        self
    }
}

/// An ordered set of aligned records with one resolved (x, y) pair.
///
/// ## Invariants
///
/// - the common vocabulary holds at least two entries (alignment fails
///   otherwise)
/// - `x_field` and `y_field` belong to the vocabulary and to every record's
///   field set
/// - every record carries `x_data`/`y_data` display columns populated from
///   the resolved pair
#[derive(Debug, Clone)]
pub struct SeriesSet {
    records: Vec<HistoryRecord>,
    fields: Vec<String>,
    x_field: String,
    y_field: String,
}

impl SeriesSet {
    /// Align records onto a common vocabulary and resolve the (x, y) pair.
    ///
    /// Vocabulary resolution: identical per-record field lists are used
    /// directly, preserving file order; differing lists reduce to their
    /// sorted set intersection.
    ///
    /// Axis resolution: a requested field is the candidate; with no request
    /// the records' own defaults (first field for x, second for y)
    /// propagate when they all agree, else the first two vocabulary
    /// entries. A candidate missing from any record is forced to the
    /// vocabulary default and a notice is logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCommonFields`] when fewer than two field names
    /// are common to all records (including the empty-record-list case).
    pub fn align(mut records: Vec<HistoryRecord>, request: &AxisRequest) -> Result<Self> {
        let fields = Self::common_fields(&records);
        if fields.len() < 2 {
            return Err(Error::NoCommonFields {
                found: fields.len(),
            });
        }

        let x_field = Self::resolve_axis(&records, request.x_field.as_deref(), &fields, 0, "x");
        let y_field = Self::resolve_axis(&records, request.y_field.as_deref(), &fields, 1, "y");

        for record in &mut records {
            record.set_display_columns(&x_field, &y_field)?;
        }

        Ok(Self {
            records,
            fields,
            x_field,
            y_field,
        })
    }

    fn common_fields(records: &[HistoryRecord]) -> Vec<String> {
        let Some(first) = records.first() else {
            return Vec::new();
        };

        if records
            .iter()
            .all(|r| r.field_names() == first.field_names())
        {
            return first.field_names().to_vec();
        }

        let mut common: HashSet<&String> = first.field_names().iter().collect();
        for record in &records[1..] {
            let names: HashSet<&String> = record.field_names().iter().collect();
            common.retain(|name| names.contains(*name));
        }
        let mut fields: Vec<String> = common.into_iter().cloned().collect();
        fields.sort();
        fields
    }

    /// Resolve one axis to a field present in every record.
    ///
    /// `default_index` is 0 for x and 1 for y; callers guarantee the common
    /// vocabulary holds at least two entries.
    fn resolve_axis(
        records: &[HistoryRecord],
        requested: Option<&str>,
        common: &[String],
        default_index: usize,
        axis: &str,
    ) -> String {
        let candidate = requested.map_or_else(
            || {
                let defaults: Vec<Option<&String>> = records
                    .iter()
                    .map(|r| r.field_names().get(default_index))
                    .collect();
                match defaults.first() {
                    Some(Some(first)) if defaults.iter().all(|d| *d == Some(*first)) => {
                        (*first).clone()
                    }
                    _ => common[default_index].clone(),
                }
            },
            ToString::to_string,
        );

        let available_everywhere = records
            .iter()
            .all(|r| r.field_names().contains(&candidate));
        if available_everywhere {
            candidate
        } else {
            let fallback = common[default_index].clone();
            warn!(
                axis,
                requested = %candidate,
                "field not present in every record, setting {axis} quantity to {fallback}"
            );
            fallback
        }
    }

    /// The aligned records, in input order.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// The resolved common field vocabulary.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The resolved x-axis field.
    #[must_use]
    pub fn x_field(&self) -> &str {
        &self.x_field
    }

    /// The resolved y-axis field.
    #[must_use]
    pub fn y_field(&self) -> &str {
        &self.y_field
    }
}
