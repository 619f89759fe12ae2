use std::collections::HashMap;

use crate::{Cell, RowRef, Table, TableError};

/// Suffixes appended to column names present on both sides of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSuffixes {
    /// Suffix for the left-hand columns.
    pub left: String,
    /// Suffix for the right-hand columns.
    pub right: String,
}

impl Default for JoinSuffixes {
    fn default() -> Self {
        Self {
            left: "_x".to_string(),
            right: "_y".to_string(),
        }
    }
}

/// The relational operations needed to align two row sets.
pub trait Relation: Sized {
    /// Keep the rows matching the predicate, preserving their order.
    fn filter<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&RowRef<'_>) -> bool;

    /// Add a column computed from each row. An existing column with the same name is
    /// overwritten in place.
    fn with_column<F>(&self, name: &str, derive: F) -> Self
    where
        F: FnMut(&RowRef<'_>) -> Cell;

    /// Inner equi-join on `self.left_on == right.right_on`.
    ///
    /// Output rows follow the left order and, for each left row, the right order.
    /// Missing and null keys never match.
    fn inner_join(
        &self,
        right: &Self,
        left_on: &str,
        right_on: &str,
        suffixes: &JoinSuffixes,
    ) -> Result<Self, TableError>;

    /// Stable ascending sort by one column, see [`Cell::sort_cmp`].
    fn sort_by_column(&self, column: &str) -> Result<Self, TableError>;
}

// hashable projection of the cells that can act as join keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Str(String),
    Int(i64),
    Bool(bool),
    Float(u64),
}

fn join_key(cell: &Cell) -> Option<JoinKey> {
    match cell {
        Cell::Str(s) => Some(JoinKey::Str(s.clone())),
        Cell::Int(v) => Some(JoinKey::Int(*v)),
        Cell::Bool(v) => Some(JoinKey::Bool(*v)),
        Cell::Float(v) if !v.is_nan() => Some(JoinKey::Float((*v + 0.0).to_bits())),
        _ => None,
    }
}

fn output_columns(
    left: &[String],
    right: &[String],
    left_on: &str,
    right_on: &str,
    suffixes: &JoinSuffixes,
) -> (Vec<String>, Vec<usize>) {
    // a key shared by name is emitted once, from the left side
    let shared_key = left_on == right_on;

    let mut columns = Vec::with_capacity(left.len() + right.len());
    for name in left {
        if right.contains(name) && !(shared_key && name == left_on) {
            columns.push(format!("{name}{}", suffixes.left));
        } else {
            columns.push(name.clone());
        }
    }

    let mut right_indices = Vec::with_capacity(right.len());
    for (i, name) in right.iter().enumerate() {
        if shared_key && name == right_on {
            continue;
        }
        if left.contains(name) {
            columns.push(format!("{name}{}", suffixes.right));
        } else {
            columns.push(name.clone());
        }
        right_indices.push(i);
    }

    (columns, right_indices)
}

impl Relation for Table {
    fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&RowRef<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.cells().to_vec())
            .collect();
        Table::from_parts_unchecked(self.columns().to_vec(), rows)
    }

    fn with_column<F>(&self, name: &str, mut derive: F) -> Self
    where
        F: FnMut(&RowRef<'_>) -> Cell,
    {
        let existing = self.column_index(name);
        let rows = self
            .rows()
            .map(|row| {
                let value = derive(&row);
                let mut cells = row.cells().to_vec();
                match existing {
                    Some(i) => cells[i] = value,
                    None => cells.push(value),
                }
                cells
            })
            .collect();

        let mut columns = self.columns().to_vec();
        if existing.is_none() {
            columns.push(name.to_string());
        }
        Table::from_parts_unchecked(columns, rows)
    }

    fn inner_join(
        &self,
        right: &Self,
        left_on: &str,
        right_on: &str,
        suffixes: &JoinSuffixes,
    ) -> Result<Self, TableError> {
        let left_idx = self
            .column_index(left_on)
            .ok_or_else(|| TableError::ColumnNotFound(left_on.to_string()))?;
        let right_idx = right
            .column_index(right_on)
            .ok_or_else(|| TableError::ColumnNotFound(right_on.to_string()))?;

        let (columns, right_indices) =
            output_columns(self.columns(), right.columns(), left_on, right_on, suffixes);
        let mut joined = Table::new(columns)?;

        let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (i, row) in right.raw_rows().iter().enumerate() {
            if let Some(key) = join_key(&row[right_idx]) {
                index.entry(key).or_default().push(i);
            }
        }

        for left_row in self.raw_rows() {
            let Some(matches) = join_key(&left_row[left_idx]).and_then(|k| index.get(&k)) else {
                continue;
            };
            for &j in matches {
                let right_row = &right.raw_rows()[j];
                let mut cells = left_row.clone();
                cells.extend(right_indices.iter().map(|&k| right_row[k].clone()));
                joined.push_row(cells)?;
            }
        }

        log::debug!(
            "inner join on {left_on}/{right_on}: {} x {} rows -> {} rows",
            self.len(),
            right.len(),
            joined.len()
        );

        Ok(joined)
    }

    fn sort_by_column(&self, column: &str) -> Result<Self, TableError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;

        let (columns, mut rows) = self.clone().into_parts();
        // slice::sort_by is stable
        rows.sort_by(|a, b| a[idx].sort_cmp(&b[idx]));

        Ok(Table::from_parts_unchecked(columns, rows))
    }
}
