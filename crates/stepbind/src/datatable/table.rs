//! The table value handed to bindings.

use super::{DataTableError, TableRecord, TableRow};

/// A step data table: one header row naming the columns, then data rows of
/// the same width.
///
/// # Examples
///
/// ```
/// use stepbind::DataTable;
///
/// let table = DataTable::from_rows(vec![
///     vec!["name".into(), "qty".into()],
///     vec!["apple".into(), "3".into()],
/// ])?;
/// assert_eq!(table.header(), ["name", "qty"]);
/// assert_eq!(table.column("qty")?, vec!["3"]);
/// # Ok::<(), stepbind::DataTableError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Build a table from raw rows, the first of which is the header.
    ///
    /// # Errors
    ///
    /// Returns [`DataTableError::MissingHeader`] for an empty input,
    /// [`DataTableError::DuplicateHeader`] when a column name repeats and
    /// [`DataTableError::UnevenRow`] when a row's width differs from the
    /// header's.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, DataTableError> {
        let mut iter = rows.into_iter();
        let header = iter.next().ok_or(DataTableError::MissingHeader)?;
        for (index, column) in header.iter().enumerate() {
            if header.iter().take(index).any(|seen| seen == column) {
                return Err(DataTableError::DuplicateHeader {
                    column: column.clone(),
                });
            }
        }
        let rows: Vec<Vec<String>> = iter.collect();
        for (index, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(DataTableError::UnevenRow {
                    row_number: index + 2,
                    expected: header.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { header, rows })
    }

    /// Column names in order.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, excluding the header.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows including the header, as written in the feature file.
    #[must_use]
    pub fn raw_rows(&self) -> Vec<&[String]> {
        std::iter::once(self.header.as_slice())
            .filter(|header| !header.is_empty())
            .chain(self.rows.iter().map(Vec::as_slice))
            .collect()
    }

    /// Zero-based position of a column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    /// Every cell of the named column, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns [`DataTableError::MissingColumn`] when no column has that
    /// name.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, DataTableError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| DataTableError::MissingColumn {
                row_number: 1,
                column: name.to_string(),
            })?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(index).map(String::as_str))
            .collect())
    }

    /// Header-aware views over the data rows.
    pub fn data_rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| TableRow::new(&self.header, index + 2, cells))
    }

    /// Parse every data row into a record.
    ///
    /// # Errors
    ///
    /// Returns the first [`DataTableError`] reported by
    /// [`TableRecord::from_row`].
    pub fn records<T: TableRecord>(&self) -> Result<Vec<T>, DataTableError> {
        self.data_rows().map(T::from_row).collect()
    }
}
