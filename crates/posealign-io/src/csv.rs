use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use posealign_table::Table;

/// Error types for the csv module.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// Error writing the file
    #[error("error writing file")]
    Io(#[from] std::io::Error),
}

/// Options to write a table as delimited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: char,
    /// Whether to write the 0-based row position as a leading unnamed column.
    pub include_index: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_index: false,
        }
    }
}

impl CsvOptions {
    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write the row position as the first column.
    pub fn with_index(mut self, include_index: bool) -> Self {
        self.include_index = include_index;
        self
    }
}

fn escape_field(field: &str, delimiter: char) -> std::borrow::Cow<'_, str> {
    if field.contains([delimiter, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

fn write_record<W: Write, I, S>(writer: &mut W, fields: I, delimiter: char) -> std::io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            write!(writer, "{delimiter}")?;
        }
        write!(writer, "{}", escape_field(field.as_ref(), delimiter))?;
    }
    writeln!(writer)
}

/// Write a table to any writer: a header line followed by one line per row.
pub fn write_table<W: Write>(
    writer: &mut W,
    table: &Table,
    options: &CsvOptions,
) -> Result<(), CsvError> {
    let index_header = options.include_index.then(String::new);
    write_record(
        writer,
        index_header.iter().chain(table.columns()),
        options.delimiter,
    )?;

    for row in table.rows() {
        let index = options.include_index.then(|| row.index().to_string());
        let cells = row.cells().iter().map(|cell| cell.to_string());
        write_record(writer, index.into_iter().chain(cells), options.delimiter)?;
    }

    Ok(())
}

/// Write a table to a file, replacing it if it exists.
///
/// # Arguments
///
/// * `path` - The path to the output file.
/// * `table` - The table to write.
/// * `options` - The formatting options.
pub fn write_csv(
    path: impl AsRef<Path>,
    table: &Table,
    options: &CsvOptions,
) -> Result<(), CsvError> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_table(&mut writer, table, options)?;
    writer.flush()?;

    log::debug!(
        "wrote {} rows to {}",
        table.len(),
        path.as_ref().display()
    );

    Ok(())
}
