use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use posealign_table::{Cell, Table, TableError};

use super::{PoseRecord, POSE_COLUMNS};

/// Number of comment and statistics lines at the top of images.txt.
pub const NUM_HEADER_LINES: usize = 4;

const NUM_POSE_TOKENS: usize = 10;

/// Error types for the COLMAP module.
#[derive(Debug, thiserror::Error)]
pub enum PoseFileError {
    /// The file does not exist
    #[error("File does not exist: {0}")]
    InputNotFound(PathBuf),

    /// Error reading the file
    #[error("error reading file")]
    Io(#[from] std::io::Error),

    /// The file is shorter than its header
    #[error("Expected {} header lines, found {found}", NUM_HEADER_LINES)]
    MissingHeader {
        /// Number of lines in the file.
        found: usize,
    },

    /// A pose line could not be decoded
    #[error("Malformed pose line {line}: {reason}")]
    MalformedPoseLine {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },
}

/// Read the images.txt file and return a vector of PoseRecord structs.
///
/// # Arguments
///
/// * `path` - The path to the images.txt file.
///
/// # Returns
///
/// A vector of PoseRecord structs, in file order.
pub fn read_images_txt(path: impl AsRef<Path>) -> Result<Vec<PoseRecord>, PoseFileError> {
    let path = path.as_ref();

    // open the file and create a buffered reader
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PoseFileError::InputNotFound(path.to_path_buf()),
        _ => PoseFileError::Io(e),
    })?;

    let poses = parse_images_txt(BufReader::new(file))?;
    log::debug!("read {} poses from {}", poses.len(), path.display());

    Ok(poses)
}

/// Parse the content of an images.txt file.
///
/// The first [`NUM_HEADER_LINES`] lines are skipped. Every pose then takes two lines:
///
/// ```text
/// IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME
/// POINTS2D[] as (X, Y, POINT3D_ID)
/// ```
///
/// The second line of each pair is not decoded but must be present.
pub fn parse_images_txt<R: BufRead>(reader: R) -> Result<Vec<PoseRecord>, PoseFileError> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;

    if lines.len() < NUM_HEADER_LINES {
        return Err(PoseFileError::MissingHeader { found: lines.len() });
    }

    let poses = lines[NUM_HEADER_LINES..]
        .chunks(2)
        .enumerate()
        .map(|(i, chunk)| {
            let line = NUM_HEADER_LINES + 2 * i + 1;
            match chunk {
                [pose_line, _points2d_line] => parse_pose_line(pose_line)
                    .map_err(|reason| PoseFileError::MalformedPoseLine { line, reason }),
                _ => Err(PoseFileError::MalformedPoseLine {
                    line: line + 1,
                    reason: "missing 2D points line".to_string(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::with_capacity(poses.len());
    for pose in &poses {
        if !seen.insert(pose.name.as_str()) {
            log::warn!("duplicate image name in poses: {}", pose.name);
        }
    }

    Ok(poses)
}

/// Build a table with one row per pose and the [`POSE_COLUMNS`] columns.
pub fn poses_to_table(poses: &[PoseRecord]) -> Result<Table, TableError> {
    let mut table = Table::new(POSE_COLUMNS.iter().map(|s| s.to_string()).collect())?;

    for pose in poses {
        let [qw, qx, qy, qz] = pose.rotation;
        let [tx, ty, tz] = pose.translation;
        table.push_row(vec![
            Cell::from(pose.name.as_str()),
            Cell::from(pose.image_id),
            Cell::from(qw),
            Cell::from(qx),
            Cell::from(qy),
            Cell::from(qz),
            Cell::from(tx),
            Cell::from(ty),
            Cell::from(tz),
        ])?;
    }

    Ok(table)
}

/// Utility functions for parsing COLMAP text files
fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| format!("{}: {}", s, e))
}

fn parse_array<const N: usize>(parts: &[&str]) -> Result<[f64; N], String> {
    parts
        .iter()
        .map(|s| parse_part(s))
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| format!("Invalid number of coordinates, expected {}", N))
}

/// Parse an image line and return a PoseRecord struct.
/// #   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME
fn parse_pose_line(line: &str) -> Result<PoseRecord, String> {
    // split the line into parts by whitespace
    let parts = line.split_whitespace().collect::<Vec<_>>();

    if parts.len() != NUM_POSE_TOKENS {
        return Err(format!(
            "Invalid number of parts: {}, expected {NUM_POSE_TOKENS}",
            parts.len()
        ));
    }

    Ok(PoseRecord {
        image_id: parse_part(parts[0])?,
        rotation: parse_array(&parts[1..5])?,
        translation: parse_array(&parts[5..8])?,
        camera_id: parse_part(parts[8])?,
        name: parts[9].to_string(),
    })
}
