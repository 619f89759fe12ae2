use posealign_table::{Cell, Table};

/// Column holding the ground-truth rotation matrix.
pub const ROTATION_COLUMN: &str = "viewpoint.R";

/// Column holding the ground-truth translation vector.
pub const TRANSLATION_COLUMN: &str = "viewpoint.T";

/// Error types for the viewpoint module.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ViewpointError {
    /// The table has no such column.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A cell does not hold a list with the expected shape.
    #[error("Invalid shape for {column} at row {row}")]
    InvalidShape {
        /// Row position in the table.
        row: usize,
        /// Column name.
        column: String,
    },
}

/// A ground-truth camera viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    /// Row-major 3x3 rotation matrix.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector.
    pub translation: [f64; 3],
}

fn as_vec3(value: &serde_json::Value) -> Option<[f64; 3]> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    Some([items[0].as_f64()?, items[1].as_f64()?, items[2].as_f64()?])
}

fn as_mat33(value: &serde_json::Value) -> Option<[[f64; 3]; 3]> {
    let rows = value.as_array()?;
    if rows.len() != 3 {
        return None;
    }
    Some([as_vec3(&rows[0])?, as_vec3(&rows[1])?, as_vec3(&rows[2])?])
}

/// Decode the viewpoint of every row of a flattened annotations table.
///
/// Rows without a viewpoint, i.e. missing or null cells, yield `None`.
pub fn extract_viewpoints(table: &Table) -> Result<Vec<Option<Viewpoint>>, ViewpointError> {
    for column in [ROTATION_COLUMN, TRANSLATION_COLUMN] {
        if !table.has_column(column) {
            return Err(ViewpointError::ColumnNotFound(column.to_string()));
        }
    }

    table
        .rows()
        .map(|row| {
            let rotation = row.get(ROTATION_COLUMN).unwrap_or(&Cell::Missing);
            let translation = row.get(TRANSLATION_COLUMN).unwrap_or(&Cell::Missing);
            if rotation.is_missing() && translation.is_missing() {
                return Ok(None);
            }

            let invalid = |column: &str| ViewpointError::InvalidShape {
                row: row.index(),
                column: column.to_string(),
            };

            Ok(Some(Viewpoint {
                rotation: rotation
                    .as_json()
                    .and_then(as_mat33)
                    .ok_or_else(|| invalid(ROTATION_COLUMN))?,
                translation: translation
                    .as_json()
                    .and_then(as_vec3)
                    .ok_or_else(|| invalid(TRANSLATION_COLUMN))?,
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::parse_frame_annotations;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_extract_viewpoints() {
        let table = parse_frame_annotations(&json!([
            {"frame_number": 0, "viewpoint": {
                "R": [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
                "T": [0.25, -3, 12.5]
            }},
            {"frame_number": 1}
        ]))
        .unwrap();

        let viewpoints = extract_viewpoints(&table).unwrap();
        assert_eq!(viewpoints.len(), 2);

        let vp = viewpoints[0].as_ref().unwrap();
        assert_relative_eq!(vp.rotation[0][1], -1.0);
        assert_relative_eq!(vp.rotation[1][0], 1.0);
        assert_relative_eq!(vp.translation[1], -3.0);
        assert_relative_eq!(vp.translation[2], 12.5);
        assert!(viewpoints[1].is_none());
    }

    #[test]
    fn test_extract_viewpoints_invalid_shape() {
        let table = parse_frame_annotations(&json!([
            {"viewpoint": {"R": [[1.0, 0.0], [0.0, 1.0]], "T": [0.0, 0.0, 0.0]}}
        ]))
        .unwrap();

        assert_eq!(
            extract_viewpoints(&table),
            Err(ViewpointError::InvalidShape {
                row: 0,
                column: ROTATION_COLUMN.to_string()
            })
        );
    }

    #[test]
    fn test_extract_viewpoints_missing_column() {
        let table = parse_frame_annotations(&json!([{"frame_number": 1}])).unwrap();
        assert_eq!(
            extract_viewpoints(&table),
            Err(ViewpointError::ColumnNotFound(ROTATION_COLUMN.to_string()))
        );
    }
}
