use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// One parsed CSV record, keyed by header name in header order.
///
/// A header that appears twice keeps its first position and holds the value of
/// its last occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `column`, overwriting an earlier value for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse CSV text into rows keyed by the header line.
///
/// Lines may end in `\n` or `\r\n`. The first non-blank line is the header and
/// every later non-blank line becomes one [`Row`]. Rows shorter than the header
/// are padded with empty strings, longer rows lose their extra fields. This
/// never fails: malformed input degrades to whatever the scanner can recover.
///
/// # Examples
/// ```
/// use reportkit::loader::parse_delimited_text;
///
/// let rows = parse_delimited_text("h1,h2\n1,2\n\n3");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].get("h1"), Some("3"));
/// assert_eq!(rows[1].get("h2"), Some(""));
/// ```
pub fn parse_delimited_text(content: &str) -> Vec<Row> {
    parse_csv(content).rows
}

/// Parsed CSV: the header columns next to the rows keyed by them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CsvData {
    /// Header columns in order, a repeated name listed once.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Like [`parse_delimited_text`], but keeps the header line even when no data
/// row follows it.
pub fn parse_csv(content: &str) -> CsvData {
    let mut lines = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(line) => parse_line(line),
        None => return CsvData::default(),
    };

    let rows = lines
        .map(|line| {
            let mut values = parse_line(line).into_iter();
            let mut row = Row::new();
            for column in &header {
                row.insert(column.clone(), values.next().unwrap_or_default());
            }
            row
        })
        .collect();

    let mut headers: Vec<String> = Vec::with_capacity(header.len());
    for column in header {
        if !headers.contains(&column) {
            headers.push(column);
        }
    }
    CsvData { headers, rows }
}

/// Split one CSV line into trimmed fields.
///
/// A doubled quote inside a quoted section is a literal `"`; any other quote
/// toggles quoting and is dropped. Commas only separate fields outside quotes,
/// so the result always holds one more field than there are separating commas.
/// A quote left open at the end of the line does not raise an error: whatever
/// was accumulated becomes the last field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote inside a quoted field
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(current_field.trim().to_string());
                current_field.clear();
            }
            _ => current_field.push(c),
        }
    }

    result.push(current_field.trim().to_string());
    result
}

/// Load rows from a CSV file on disk
///
/// A leading UTF-8 byte order mark is dropped before parsing.
///
/// # Examples
/// ```no_run
/// use reportkit::loader::from_csv;
///
/// match from_csv("courses.csv") {
///     Ok(rows) => println!("loaded {} rows", rows.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Vec<Row>, LoadError> {
    Ok(read_csv(filepath)?.rows)
}

/// Read a CSV file, keeping its header columns.
pub fn read_csv(filepath: impl AsRef<Path>) -> Result<CsvData, LoadError> {
    let path = filepath.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_csv(content.strip_prefix('\u{feff}').unwrap_or(&content));
    debug!("parsed {} rows from {}", data.rows.len(), path.display());
    Ok(data)
}
