use posealign_table::{Cell, JoinSuffixes, Relation, Table};

use crate::AlignError;

/// Configuration of the column names used to align poses with annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignConfig {
    /// Pose column holding the image file name.
    pub pose_key_column: String,
    /// Annotation column holding the sequence name.
    pub sequence_column: String,
    /// Annotation column holding the frame number.
    pub frame_column: String,
    /// Annotation column holding the image path.
    pub image_path_column: String,
    /// Name of the derived annotation column holding the image file name.
    pub key_column: String,
    /// Suffixes for columns present in both tables.
    pub suffixes: JoinSuffixes,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            pose_key_column: "name".to_string(),
            sequence_column: "sequence_name".to_string(),
            frame_column: "frame_number".to_string(),
            image_path_column: "image.path".to_string(),
            key_column: "filename".to_string(),
            suffixes: JoinSuffixes {
                left: "_pose".to_string(),
                right: "_gt".to_string(),
            },
        }
    }
}

impl AlignConfig {
    /// Set the annotation column holding the image path.
    pub fn with_image_path_column(mut self, column: impl Into<String>) -> Self {
        self.image_path_column = column.into();
        self
    }

    /// Set the annotation column holding the frame number.
    pub fn with_frame_column(mut self, column: impl Into<String>) -> Self {
        self.frame_column = column.into();
        self
    }

    /// Set the suffixes for columns present in both tables.
    pub fn with_suffixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.suffixes = JoinSuffixes {
            left: left.into(),
            right: right.into(),
        };
        self
    }
}

/// Last `/`-separated component of a path.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Align poses with the annotations of one sequence using the default column names.
///
/// See [`align_with_config`].
pub fn align(poses: &Table, annotations: &Table, target_sequence: &str) -> Result<Table, AlignError> {
    align_with_config(poses, annotations, target_sequence, &AlignConfig::default())
}

/// Align poses with the annotations of one sequence.
///
/// The annotations are filtered to `target_sequence`, keyed by the file name of their
/// image path and inner-joined with the poses on the pose name. The result holds the
/// pose columns followed by the annotation columns and the derived key, sorted by frame
/// number with ties kept in join order.
///
/// An empty result is not an error.
pub fn align_with_config(
    poses: &Table,
    annotations: &Table,
    target_sequence: &str,
    config: &AlignConfig,
) -> Result<Table, AlignError> {
    if !annotations.has_column(&config.sequence_column) {
        log::warn!(
            "annotations have no {} column, no frame can match",
            config.sequence_column
        );
    }

    let in_sequence = annotations.filter(|row| {
        row.get(&config.sequence_column).and_then(Cell::as_str) == Some(target_sequence)
    });
    log::info!(
        "{} of {} annotations belong to sequence {target_sequence}",
        in_sequence.len(),
        annotations.len()
    );

    let mut without_path = 0usize;
    let keyed = in_sequence.with_column(&config.key_column, |row| {
        match row.get(&config.image_path_column).and_then(Cell::as_str) {
            Some(path) => Cell::from(file_name_of(path)),
            None => {
                without_path += 1;
                Cell::Missing
            }
        }
    });
    if without_path > 0 {
        log::warn!(
            "{without_path} annotations have no {} and are skipped",
            config.image_path_column
        );
    }

    let joined = poses.inner_join(
        &keyed,
        &config.pose_key_column,
        &config.key_column,
        &config.suffixes,
    )?;

    if joined.is_empty() {
        log::info!("no pose matched an annotation of sequence {target_sequence}");
        return Ok(joined);
    }

    // the frame column is renamed if the poses carry one too
    let frame_column = if poses.has_column(&config.frame_column) {
        format!("{}{}", config.frame_column, config.suffixes.right)
    } else {
        config.frame_column.clone()
    };

    let aligned = joined.sort_by_column(&frame_column)?;
    log::info!("aligned {} of {} poses", aligned.len(), poses.len());

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posealign_io::{annotations::parse_frame_annotations, colmap::{poses_to_table, PoseRecord}};
    use posealign_table::TableError;
    use serde_json::json;

    fn pose(name: &str, image_id: u32) -> PoseRecord {
        PoseRecord {
            name: name.to_string(),
            image_id,
            camera_id: 1,
            rotation: [1.0, 0.0, 0.0, 0.0],
            translation: [0.0, 0.0, image_id as f64],
        }
    }

    fn names(table: &Table, column: &str) -> Vec<String> {
        table
            .column(column)
            .unwrap()
            .map(|c| c.as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("apple/110_13051/images/frame000001.jpg"), "frame000001.jpg");
        assert_eq!(file_name_of("frame.jpg"), "frame.jpg");
        assert_eq!(file_name_of("dir/"), "");
    }

    #[test]
    fn test_align_orders_by_frame_number() {
        let poses = poses_to_table(&[pose("f1.jpg", 1), pose("f2.jpg", 2)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "frame_number": 5, "image": {"path": "s/images/f1.jpg"}},
            {"sequence_name": "s", "frame_number": 3, "image": {"path": "s/images/f2.jpg"}},
        ]))
        .unwrap();

        let aligned = align(&poses, &annotations, "s").unwrap();
        assert_eq!(names(&aligned, "name"), vec!["f2.jpg", "f1.jpg"]);
        assert_eq!(names(&aligned, "filename"), vec!["f2.jpg", "f1.jpg"]);
        assert_eq!(
            aligned.columns(),
            &[
                "name",
                "image_id",
                "qw",
                "qx",
                "qy",
                "qz",
                "tx",
                "ty",
                "tz",
                "sequence_name",
                "frame_number",
                "image.path",
                "filename"
            ]
            .map(String::from)[..]
        );
    }

    #[test]
    fn test_align_filters_sequence() {
        let poses = poses_to_table(&[pose("a.jpg", 1), pose("b.jpg", 2)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "keep", "frame_number": 1, "image": {"path": "keep/a.jpg"}},
            {"sequence_name": "other", "frame_number": 0, "image": {"path": "other/b.jpg"}},
            {"sequence_name": "Keep", "frame_number": 2, "image": {"path": "Keep/b.jpg"}},
        ]))
        .unwrap();

        let aligned = align(&poses, &annotations, "keep").unwrap();
        assert_eq!(aligned.len(), 1);
        assert_eq!(names(&aligned, "name"), vec!["a.jpg"]);
    }

    #[test]
    fn test_align_unknown_sequence_is_empty() {
        let poses = poses_to_table(&[pose("a.jpg", 1)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "frame_number": 1, "image": {"path": "s/a.jpg"}},
        ]))
        .unwrap();

        let aligned = align(&poses, &annotations, "nope").unwrap();
        assert!(aligned.is_empty());
    }

    #[test]
    fn test_align_empty_annotations() {
        let poses = poses_to_table(&[pose("a.jpg", 1)]).unwrap();
        let annotations = parse_frame_annotations(&json!([])).unwrap();

        let aligned = align(&poses, &annotations, "s").unwrap();
        assert!(aligned.is_empty());
        assert!(aligned.has_column("filename"));
    }

    #[test]
    fn test_align_drops_unmatched_and_pathless() {
        let poses = poses_to_table(&[pose("a.jpg", 1), pose("b.jpg", 2), pose("c.jpg", 3)])
            .unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "frame_number": 9, "image": {"path": "s/c.jpg"}},
            {"sequence_name": "s", "frame_number": 8},
            {"sequence_name": "s", "frame_number": 7, "image": {"path": "s/z.jpg"}},
            {"sequence_name": "s", "frame_number": 1, "image": {"path": "s/a.jpg"}},
        ]))
        .unwrap();

        let aligned = align(&poses, &annotations, "s").unwrap();
        assert_eq!(names(&aligned, "name"), vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_align_ties_keep_join_order() {
        let poses = poses_to_table(&[pose("b.jpg", 1), pose("a.jpg", 2)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "frame_number": 4, "image": {"path": "s/a.jpg"}},
            {"sequence_name": "s", "frame_number": 4, "image": {"path": "s/b.jpg"}},
        ]))
        .unwrap();

        let aligned = align(&poses, &annotations, "s").unwrap();
        // join order follows the poses
        assert_eq!(names(&aligned, "name"), vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_align_column_collision_suffixes() {
        let poses = poses_to_table(&[pose("a.jpg", 1)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "frame_number": 0, "name": "gt-name", "image": {"path": "s/a.jpg"}},
        ]))
        .unwrap();

        let aligned = align(&poses, &annotations, "s").unwrap();
        let row = aligned.row(0).unwrap();
        assert_eq!(row.get("name_pose"), Some(&Cell::from("a.jpg")));
        assert_eq!(row.get("name_gt"), Some(&Cell::from("gt-name")));
        assert_eq!(row.get("name"), None);
    }

    #[test]
    fn test_align_custom_config() {
        let poses = poses_to_table(&[pose("a.jpg", 1), pose("b.jpg", 2)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "idx": 2, "rgb": {"file": "x/a.jpg"}},
            {"sequence_name": "s", "idx": 1, "rgb": {"file": "x/b.jpg"}},
        ]))
        .unwrap();

        let config = AlignConfig::default()
            .with_image_path_column("rgb.file")
            .with_frame_column("idx");
        let aligned = align_with_config(&poses, &annotations, "s", &config).unwrap();
        assert_eq!(names(&aligned, "name"), vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_align_missing_frame_column() {
        let poses = poses_to_table(&[pose("a.jpg", 1)]).unwrap();
        let annotations = parse_frame_annotations(&json!([
            {"sequence_name": "s", "image": {"path": "s/a.jpg"}},
        ]))
        .unwrap();

        let res = align(&poses, &annotations, "s");
        assert!(matches!(
            res,
            Err(AlignError::Table(TableError::ColumnNotFound(_)))
        ));
    }
}
