//! Record-shaped access to table rows.
//!
//! Types that map a row onto named fields implement [`TableRecord`] and read
//! cells by column name through [`TableRow`].

use std::error::Error as StdError;
use std::str::FromStr;

use super::DataTableError;

/// Implemented by types built from one data row.
pub trait TableRecord: Sized {
    /// Build the record from a row.
    ///
    /// # Errors
    ///
    /// Implementors return [`DataTableError`] describing the failing cell.
    fn from_row(row: TableRow<'_>) -> Result<Self, DataTableError>;
}

/// One data row together with the table header.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'t> {
    header: &'t [String],
    row_number: usize,
    cells: &'t [String],
}

impl<'t> TableRow<'t> {
    pub(super) fn new(header: &'t [String], row_number: usize, cells: &'t [String]) -> Self {
        Self {
            header,
            row_number,
            cells,
        }
    }

    /// 1-based row number, counting the header.
    #[must_use]
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    /// Cells in column order.
    #[must_use]
    pub fn cells(&self) -> &'t [String] {
        self.cells
    }

    /// Cell text under `column`.
    ///
    /// # Errors
    ///
    /// Returns [`DataTableError::MissingColumn`] when the header lacks the
    /// column.
    pub fn get(&self, column: &str) -> Result<&'t str, DataTableError> {
        self.header
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.cells.get(index))
            .map(String::as_str)
            .ok_or_else(|| DataTableError::MissingColumn {
                row_number: self.row_number,
                column: column.to_string(),
            })
    }

    /// Parse the trimmed cell under `column` with [`FromStr`].
    ///
    /// # Errors
    ///
    /// Returns [`DataTableError::MissingColumn`] or
    /// [`DataTableError::CellParse`].
    pub fn parse<T>(&self, column: &str) -> Result<T, DataTableError>
    where
        T: FromStr,
        T::Err: StdError + Send + Sync + 'static,
    {
        self.get(column)?
            .trim()
            .parse::<T>()
            .map_err(|err| DataTableError::CellParse {
                row_number: self.row_number,
                column: column.to_string(),
                source: Box::new(err),
            })
    }
}
