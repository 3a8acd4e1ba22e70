//! Error types surfaced by data table access.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors raised while building a [`DataTable`](super::DataTable) or reading
/// records from it.
///
/// Row numbers are 1-based and count the header row, so they line up with
/// the table as written in the feature file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataTableError {
    /// The table has no rows at all, so there is no header.
    #[error("data table requires a header row")]
    MissingHeader,
    /// The header row repeats a column name.
    #[error("data table header contains duplicate column '{column}'")]
    DuplicateHeader {
        /// Repeated column name.
        column: String,
    },
    /// A row contains more or fewer cells than the header.
    #[error("data table row {row_number} has {actual} cells but expected {expected}")]
    UnevenRow {
        /// 1-based index of the row that failed, including the header.
        row_number: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of cells present in the offending row.
        actual: usize,
    },
    /// A column name lookup failed.
    #[error("data table row {row_number} is missing column '{column}'")]
    MissingColumn {
        /// 1-based index of the row that failed, including the header.
        row_number: usize,
        /// Name of the column that was requested.
        column: String,
    },
    /// Parsing a cell into a typed value failed.
    #[error("row {row_number}, column '{column}': {source}")]
    CellParse {
        /// 1-based index of the row that failed, including the header.
        row_number: usize,
        /// Column holding the cell.
        column: String,
        /// Root cause reported by the cell parser.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A record type rejected a row as a whole.
    #[error("row {row_number}: {source}")]
    RowParse {
        /// 1-based index of the row that failed, including the header.
        row_number: usize,
        /// Root cause reported by the record parser.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}
