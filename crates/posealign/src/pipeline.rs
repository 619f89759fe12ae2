use std::path::{Path, PathBuf};

use posealign_io::{
    annotations::read_frame_annotations,
    colmap::{poses_to_table, read_images_txt},
    csv::{write_csv, CsvOptions},
};
use posealign_table::Table;

use crate::{align::align_with_config, AlignConfig, AlignError};

/// Configuration of one alignment run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Path to the predicted poses, a COLMAP images.txt file.
    pub poses_path: PathBuf,
    /// Path to the ground-truth frame annotations JSON file.
    pub annotations_path: PathBuf,
    /// Name of the sequence to keep from the annotations.
    pub target_sequence: String,
    /// Path of the output file.
    pub output_path: PathBuf,
    /// Column names used for the alignment.
    pub align: AlignConfig,
    /// Output formatting.
    pub csv: CsvOptions,
}

impl PipelineConfig {
    /// Create a new configuration writing to `aligned_<sequence>.csv` in the working directory.
    pub fn new(
        poses_path: impl Into<PathBuf>,
        annotations_path: impl Into<PathBuf>,
        target_sequence: impl Into<String>,
    ) -> Self {
        let target_sequence = target_sequence.into();
        Self {
            poses_path: poses_path.into(),
            annotations_path: annotations_path.into(),
            output_path: default_output_path(&target_sequence),
            target_sequence,
            align: AlignConfig::default(),
            csv: CsvOptions::default(),
        }
    }

    /// Set the output file.
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    /// Set the alignment column names.
    pub fn with_align_config(mut self, align: AlignConfig) -> Self {
        self.align = align;
        self
    }
}

/// The default output file name for a sequence.
pub fn default_output_path(target_sequence: &str) -> PathBuf {
    // sequence names may contain path separators
    let sanitized = target_sequence.replace(['/', '\\'], "_");
    PathBuf::from(format!("aligned_{sanitized}.csv"))
}

/// Read the predicted poses as a table.
pub fn load_poses(path: &Path) -> Result<Table, AlignError> {
    let poses = read_images_txt(path).map_err(|source| AlignError::Poses {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded {} predicted poses", poses.len());

    Ok(poses_to_table(&poses)?)
}

/// Read the ground-truth annotations as a flat table.
pub fn load_annotations(path: &Path) -> Result<Table, AlignError> {
    let annotations = read_frame_annotations(path).map_err(|source| AlignError::Annotations {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "loaded {} ground-truth annotations with {} columns",
        annotations.len(),
        annotations.num_columns()
    );

    Ok(annotations)
}

/// Run the whole alignment: read both inputs, align them and write the result.
///
/// Both inputs are fully parsed before aligning; nothing is written if any stage fails.
///
/// # Returns
///
/// The aligned table, as written to [`PipelineConfig::output_path`].
pub fn run(config: &PipelineConfig) -> Result<Table, AlignError> {
    let poses = load_poses(&config.poses_path)?;
    let annotations = load_annotations(&config.annotations_path)?;

    let aligned = align_with_config(&poses, &annotations, &config.target_sequence, &config.align)?;

    write_csv(&config.output_path, &aligned, &config.csv).map_err(|source| AlignError::Sink {
        path: config.output_path.clone(),
        source,
    })?;
    log::info!(
        "wrote {} aligned poses to {}",
        aligned.len(),
        config.output_path.display()
    );

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posealign_io::{annotations::AnnotationError, colmap::PoseFileError};

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("110_13051_23361"),
            PathBuf::from("aligned_110_13051_23361.csv")
        );
        assert_eq!(default_output_path("a/b"), PathBuf::from("aligned_a_b.csv"));
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new("images.txt", "frame_annotations.json", "seq")
            .with_output_path("out.csv");
        assert_eq!(config.output_path, PathBuf::from("out.csv"));
        assert_eq!(config.target_sequence, "seq");
        assert_eq!(config.align, AlignConfig::default());
    }

    #[test]
    fn test_run_missing_poses_fails_first() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let output = tmp_dir.path().join("out.csv");
        let config = PipelineConfig::new(
            tmp_dir.path().join("images.txt"),
            tmp_dir.path().join("frame_annotations.json"),
            "seq",
        )
        .with_output_path(&output);

        match run(&config) {
            Err(AlignError::Poses {
                source: PoseFileError::InputNotFound(_),
                ..
            }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_run_malformed_annotations() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let poses_path = tmp_dir.path().join("images.txt");
        std::fs::write(&poses_path, "#\n#\n#\n#\n1 1 0 0 0 0 0 0 1 a.jpg\n\n")?;
        let annotations_path = tmp_dir.path().join("frame_annotations.json");
        std::fs::write(&annotations_path, "{not json")?;
        let output = tmp_dir.path().join("out.csv");

        let config =
            PipelineConfig::new(&poses_path, &annotations_path, "seq").with_output_path(&output);
        let err = run(&config).unwrap_err();

        assert!(matches!(
            err,
            AlignError::Annotations {
                source: AnnotationError::MalformedJson(_),
                ..
            }
        ));
        assert!(err.to_string().contains("frame_annotations.json"));
        assert!(!output.exists());
        Ok(())
    }
}
