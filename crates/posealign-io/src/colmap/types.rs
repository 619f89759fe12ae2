/// Represents an image pose in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseRecord {
    /// Image name
    pub name: String,
    /// Image id
    pub image_id: u32,
    /// Camera id
    pub camera_id: u32,
    /// Rotation
    pub rotation: [f64; 4], // qw, qx, qy, qz
    /// Translation
    pub translation: [f64; 3], // x, y, z
}

/// Columns of the table built from a set of [`PoseRecord`].
pub const POSE_COLUMNS: [&str; 9] = ["name", "image_id", "qw", "qx", "qy", "qz", "tx", "ty", "tz"];
