use std::cmp::Ordering;
use std::fmt;

/// A single value stored in a [`Table`](crate::Table).
///
/// `Missing` marks a column that was absent for a given row, while `Null` is an
/// explicit null coming from the source data.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// The column was not present for this row.
    Missing,
    /// Explicit null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
    /// Non-scalar value kept as-is (lists and objects nested in lists).
    Json(serde_json::Value),
}

impl Cell {
    /// Check if the cell has no value, either missing or null.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing | Cell::Null)
    }

    /// Get the cell as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the cell as an integer. Floats are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the cell as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the cell as a raw json value.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Cell::Json(v) => Some(v),
            _ => None,
        }
    }

    // numbers < bools < strings < json < missing/null/NaN
    fn rank(&self) -> u8 {
        match self {
            Cell::Int(_) => 0,
            Cell::Float(v) if !v.is_nan() => 0,
            Cell::Bool(_) => 1,
            Cell::Str(_) => 2,
            Cell::Json(_) => 3,
            Cell::Float(_) | Cell::Missing | Cell::Null => 4,
        }
    }

    /// Total order used to sort rows by a column.
    ///
    /// Numeric cells compare by value regardless of int/float storage. Missing values
    /// and NaN sort last.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        let (ra, rb) = (self.rank(), other.rank());
        if ra != rb {
            return ra.cmp(&rb);
        }

        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a.cmp(b),
            (Cell::Bool(a), Cell::Bool(b)) => a.cmp(b),
            (Cell::Str(a), Cell::Str(b)) => a.cmp(b),
            (Cell::Json(a), Cell::Json(b)) => a.to_string().cmp(&b.to_string()),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing | Cell::Null => Ok(()),
            Cell::Bool(true) => write!(f, "True"),
            Cell::Bool(false) => write!(f, "False"),
            Cell::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing `.0` and is shortest round-trip
            Cell::Float(v) => write!(f, "{v:?}"),
            Cell::Str(s) => write!(f, "{s}"),
            Cell::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Str(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Str(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}
