use std::collections::HashSet;

use crate::{Cell, TableError};

/// A row-major table with named columns.
///
/// Rows are always densely indexed from zero; every operation returning a new table
/// re-indexes its rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    // The column names, unique within the table.
    columns: Vec<String>,
    // The rows, each with exactly `columns.len()` cells.
    rows: Vec<Vec<Cell>>,
}

/// A borrowed view of a single table row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    index: usize,
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    /// The position of the row in its table.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the cell of the given column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.cells[i])
    }

    /// Get all the cells of the row in column order.
    #[inline]
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

impl Table {
    /// Create an empty table with the given columns.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] if two columns share a name.
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table from columns and rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row at the end of the table.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Get the column names.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Check if the table has a column.
    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get a row by position.
    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|cells| RowRef {
            index,
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate over the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| RowRef {
            index,
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate over the cells of a column.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell>, TableError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Project the table onto a subset of columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table, TableError> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Table::from_rows(names.iter().map(|s| s.to_string()).collect(), rows)
    }

    /// Get the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    // crate internals used by the relational operations

    pub(crate) fn raw_rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub(crate) fn from_parts_unchecked(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![Cell::Int(1), Cell::from("x")],
                vec![Cell::Int(2), Cell::Missing],
                vec![Cell::Int(3), Cell::from("z")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_duplicate_columns() {
        let res = Table::new(vec!["a".to_string(), "a".to_string()]);
        assert_eq!(res, Err(TableError::DuplicateColumn("a".to_string())));
    }

    #[test]
    fn test_push_row_width_mismatch() {
        let mut table = Table::new(vec!["a".to_string()]).unwrap();
        let res = table.push_row(vec![Cell::Int(1), Cell::Int(2)]);
        assert_eq!(
            res,
            Err(TableError::RowWidthMismatch {
                expected: 1,
                got: 2
            })
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_row_access() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.num_columns(), 2);

        let row = table.row(1).unwrap();
        assert_eq!(row.index(), 1);
        assert_eq!(row.get("a"), Some(&Cell::Int(2)));
        assert_eq!(row.get("b"), Some(&Cell::Missing));
        assert_eq!(row.get("c"), None);
        assert!(table.row(3).is_none());
    }

    #[test]
    fn test_column_iter() {
        let table = sample();
        let a = table.column("a").unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(a, vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]);
        assert!(table.column("nope").is_err());
    }

    #[test]
    fn test_select_and_head() {
        let table = sample();
        let sel = table.select(&["b", "a"]).unwrap();
        assert_eq!(sel.columns(), &["b".to_string(), "a".to_string()]);
        assert_eq!(sel.row(2).unwrap().cells(), &[Cell::from("z"), Cell::Int(3)]);

        let head = table.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(table.head(10).len(), 3);

        assert_eq!(
            table.select(&["c"]),
            Err(TableError::ColumnNotFound("c".to_string()))
        );
    }
}
