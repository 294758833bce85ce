use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header the input file must carry, in its canonical order.
pub const REQUIRED_COLUMNS: [&str; 2] = ["login", "tid"];

/// How the header row is compared against [`REQUIRED_COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Same column set, any order.
    #[default]
    Unordered,
    /// Exactly `login,tid` in that order.
    Strict,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file '{}' is missing or unreadable: {source}", path.display())]
    FileNotFound { path: PathBuf, source: io::Error },
    #[error("expected columns [login, tid] but found [{}]", found.join(", "))]
    Schema { found: Vec<String> },
    #[error("could not read input file: {0}")]
    Csv(#[from] csv::Error),
}

/// One data row of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub login: String,
    pub tid: String,
    /// 1-indexed, header excluded.
    pub row_number: usize,
}

impl InputRow {
    pub fn new(login: &str, tid: &str, row_number: usize) -> Self {
        InputRow {
            login: login.to_owned(),
            tid: tid.to_owned(),
            row_number,
        }
    }
}

pub fn check_columns<'a>(
    headers: impl IntoIterator<Item = &'a str>,
    order: ColumnOrder,
) -> Result<(), LoadError> {
    let found: Vec<&str> = headers.into_iter().collect();
    let accepted = match order {
        ColumnOrder::Strict => found == REQUIRED_COLUMNS,
        ColumnOrder::Unordered => {
            found.len() == REQUIRED_COLUMNS.len()
                && found.iter().copied().collect::<HashSet<_>>()
                    == REQUIRED_COLUMNS.iter().copied().collect::<HashSet<_>>()
        }
    };
    if accepted {
        Ok(())
    } else {
        Err(LoadError::Schema {
            found: found.into_iter().map(str::to_owned).collect(),
        })
    }
}

/// Reads every row of the CSV file at `path`, in file order.
pub fn load(path: &Path, order: ColumnOrder) -> Result<Vec<InputRow>, LoadError> {
    let not_found = |source: io::Error| LoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(not_found)?;
    if !file.metadata().map_err(not_found)?.is_file() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    read_rows(file, order)
}

/// Same as [`load`] over any reader, the header row included. Short rows
/// read missing fields as empty and invalid UTF-8 is replaced, so every data
/// row yields an [`InputRow`] for the validator to judge.
pub fn read_rows<R: io::Read>(source: R, order: ColumnOrder) -> Result<Vec<InputRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|header| String::from_utf8_lossy(header).into_owned())
        .collect();
    check_columns(headers.iter().map(String::as_str), order)?;
    let login_at = column_index(&headers, "login")?;
    let tid_at = column_index(&headers, "tid")?;

    reader
        .byte_records()
        .zip(1..)
        .map(|(record, row_number)| -> Result<InputRow, LoadError> {
            let record = record?;
            let field = |at: usize| {
                record
                    .get(at)
                    .map(|value| String::from_utf8_lossy(value).into_owned())
                    .unwrap_or_default()
            };
            Ok(InputRow {
                login: field(login_at),
                tid: field(tid_at),
                row_number,
            })
        })
        .collect()
}

fn column_index(headers: &[String], name: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| LoadError::Schema {
            found: headers.to_vec(),
        })
}
