//! Error types for mesa-viz
//!
//! Every failure is immediate and unrecovered: a record that fails to parse
//! aborts the whole batch, there is no partial-output mode.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// mesa-viz error types
#[derive(Error, Debug)]
pub enum Error {
    /// History file header does not match the expected two-line layout
    #[error("malformed header in {}: {reason}", .path.display())]
    MalformedHeader {
        /// File that failed to parse
        path: PathBuf,
        /// What was wrong with the header lines
        reason: String,
    },

    /// A data row does not align into the declared columns
    #[error("malformed table in {} (line {line}): {reason}", .path.display())]
    MalformedTable {
        /// File that failed to parse
        path: PathBuf,
        /// 1-based line number of the offending row
        line: usize,
        /// What was wrong with the row
        reason: String,
    },

    /// A requested field is not present in a history file
    #[error("field '{field}' not found in {}", .path.display())]
    FieldNotFound {
        /// The missing field name
        field: String,
        /// File whose field set was searched
        path: PathBuf,
    },

    /// Fewer than two field names are common to all records, so no (x, y)
    /// pair can be resolved
    #[error("records share {found} common field(s), need at least 2 to resolve an (x, y) pair")]
    NoCommonFields {
        /// Number of fields common to every record
        found: usize,
    },

    /// No history files were found under the given source roots
    #[error("no '{file_name}' files found under {}", .root.display())]
    NoHistoryFiles {
        /// The file name searched for
        file_name: String,
        /// Root directory that was scanned
        root: PathBuf,
    },

    /// Column data could not be serialized into a client-side data source
    #[error("data source serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
