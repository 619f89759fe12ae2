use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use posealign_table::{Cell, Table, TableError};
use serde_json::{Map, Value};

/// Separator between the keys of a flattened path.
pub const PATH_SEPARATOR: char = '.';

/// Error types for the annotations module.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// The file does not exist.
    #[error("File does not exist: {0}")]
    InputNotFound(PathBuf),

    /// The file is not valid JSON.
    #[error("Malformed JSON. {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// Any other failure while loading the annotations.
    #[error("Unexpected error while parsing annotations: {0}")]
    Unexpected(String),
}

impl From<TableError> for AnnotationError {
    fn from(e: TableError) -> Self {
        AnnotationError::Unexpected(e.to_string())
    }
}

/// Read a frame annotations JSON file into a flat table.
///
/// # Arguments
///
/// * `path` - The path to the JSON file, usually `frame_annotations.json`.
///
/// # Returns
///
/// One row per annotation with one column per dotted key path.
pub fn read_frame_annotations(path: impl AsRef<Path>) -> Result<Table, AnnotationError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnnotationError::InputNotFound(path.to_path_buf()),
        _ => AnnotationError::Unexpected(e.to_string()),
    })?;

    let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            AnnotationError::Unexpected(e.to_string())
        } else {
            AnnotationError::MalformedJson(e)
        }
    })?;

    let table = parse_frame_annotations(&value)?;
    log::debug!(
        "read {} annotations with {} columns from {}",
        table.len(),
        table.num_columns(),
        path.display()
    );

    Ok(table)
}

/// Flatten an already decoded annotations document.
///
/// The document is either an array of objects, one per frame, or a single object.
/// Columns are the union of the keys of all the records in first-seen order; a record
/// without a given column gets [`Cell::Missing`].
pub fn parse_frame_annotations(value: &Value) -> Result<Table, AnnotationError> {
    let records = match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(flatten_record(map)),
                other => Err(AnnotationError::Unexpected(format!(
                    "record {i} is {}, expected an object",
                    json_kind(other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(map) => vec![flatten_record(map)],
        other => {
            return Err(AnnotationError::Unexpected(format!(
                "document is {}, expected an array of objects",
                json_kind(other)
            )))
        }
    };

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in &records {
        for (key, _) in record {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
    }

    let num_columns = columns.len();
    let mut table = Table::new(columns)?;
    for record in records {
        let mut row = vec![Cell::Missing; num_columns];
        for (key, cell) in record {
            row[positions[&key]] = cell;
        }
        table.push_row(row)?;
    }

    Ok(table)
}

/// Flatten one JSON object into `(dotted.path, value)` pairs.
///
/// Nested objects are expanded recursively, arrays are kept whole. When an already
/// dotted key and a nested path produce the same column, the later one wins.
pub fn flatten_record(record: &Map<String, Value>) -> Vec<(String, Cell)> {
    let mut out = Vec::new();
    let mut positions = HashMap::new();
    flatten_into(record, None, &mut out, &mut positions);
    out
}

fn flatten_into(
    map: &Map<String, Value>,
    prefix: Option<&str>,
    out: &mut Vec<(String, Cell)>,
    positions: &mut HashMap<String, usize>,
) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };

        if let Value::Object(nested) = value {
            flatten_into(nested, Some(&path), out, positions);
            continue;
        }

        let cell = json_to_cell(value);
        match positions.get(&path) {
            Some(&i) => {
                log::warn!("duplicate annotation column {path}, keeping the last value");
                out[i].1 = cell;
            }
            None => {
                positions.insert(path.clone(), out.len());
                out.push((path, cell));
            }
        }
    }
}

fn json_to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => Cell::Int(v),
            (None, Some(v)) => Cell::Float(v),
            (None, None) => Cell::Json(value.clone()),
        },
        Value::String(s) => Cell::Str(s.clone()),
        Value::Array(_) | Value::Object(_) => Cell::Json(value.clone()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
