//! Parsers for the two CLI input files.
//!
//! The attribute table is whitespace-separated text, one object per line, one
//! column per variable; an `NA` token anywhere in a row marks the whole object
//! as undefined. The contiguity file uses one `id: nbr nbr ...` line per
//! object. Both formats skip blank lines and `#` comment lines.

use std::io::BufRead;

use thiserror::Error;

use okrug_core::{AttributeMatrix, ContiguityGraph, DataError, GraphError};

/// Errors raised while parsing CLI input files.
#[derive(Debug, Error)]
pub enum InputError {
    /// Reading from the underlying stream failed.
    #[error("failed to read input: {source}")]
    Io {
        /// Underlying operating system error.
        #[source]
        source: std::io::Error,
    },
    /// A token could not be parsed as a number.
    #[error("line {line}: `{token}` is not a number")]
    BadNumber {
        /// One-based line number in the input file.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// A contiguity line was missing the `id:` prefix.
    #[error("line {line}: expected `id: neighbour...`")]
    MissingIdPrefix {
        /// One-based line number in the input file.
        line: usize,
    },
    /// A contiguity line named an object id at or beyond the object count.
    #[error("line {line}: object id {id} is out of range for {objects} objects")]
    IdOutOfRange {
        /// One-based line number in the input file.
        line: usize,
        /// The offending object id.
        id: usize,
        /// Number of objects in the run.
        objects: usize,
    },
    /// The attribute matrix failed validation after parsing.
    #[error(transparent)]
    Data(#[from] DataError),
    /// The contiguity graph failed validation after parsing.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn content_lines(
    reader: impl BufRead,
) -> impl Iterator<Item = Result<(usize, String), InputError>> {
    reader
        .lines()
        .enumerate()
        .map(|(index, line)| match line {
            Ok(text) => Ok((index + 1, text)),
            Err(source) => Err(InputError::Io { source }),
        })
        .filter(|entry| match entry {
            Ok((_, text)) => {
                let trimmed = text.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            }
            Err(_) => true,
        })
}

/// Parses an attribute table from `reader`.
///
/// # Errors
/// Returns [`InputError`] on I/O failures, unparseable numbers, or when the
/// resulting matrix is ragged or contains non-finite values.
pub fn parse_attributes(reader: impl BufRead) -> Result<AttributeMatrix, InputError> {
    let mut rows = Vec::new();
    let mut undefined = Vec::new();
    for entry in content_lines(reader) {
        let (line, text) = entry?;
        let mut row = Vec::new();
        let mut is_undefined = false;
        for token in text.split_whitespace() {
            if token.eq_ignore_ascii_case("na") {
                is_undefined = true;
                row.push(0.0);
                continue;
            }
            let value: f64 = token.parse().map_err(|_| InputError::BadNumber {
                line,
                token: token.to_owned(),
            })?;
            row.push(value);
        }
        rows.push(row);
        undefined.push(is_undefined);
    }
    let matrix = AttributeMatrix::from_rows(rows)?;
    Ok(matrix.with_undefined(undefined)?)
}

/// Parses a contiguity file from `reader` for `objects` spatial objects.
///
/// Objects absent from the file have no neighbours. Neighbour ids are
/// validated against `objects` and symmetrised, so listing an edge on one
/// side is sufficient.
///
/// # Errors
/// Returns [`InputError`] on I/O failures, malformed lines, or ids outside
/// `[0, objects)`.
pub fn parse_contiguity(
    reader: impl BufRead,
    objects: usize,
) -> Result<ContiguityGraph, InputError> {
    let mut lists = vec![Vec::new(); objects];
    for entry in content_lines(reader) {
        let (line, text) = entry?;
        let Some((head, tail)) = text.split_once(':') else {
            return Err(InputError::MissingIdPrefix { line });
        };
        let id = parse_id(head.trim(), line, objects)?;
        for token in tail.split_whitespace() {
            let neighbor = parse_id(token, line, objects)?;
            lists[id].push(neighbor as u32);
            lists[neighbor].push(id as u32);
        }
    }
    Ok(ContiguityGraph::from_neighbor_lists(lists)?)
}

fn parse_id(token: &str, line: usize, objects: usize) -> Result<usize, InputError> {
    let id: usize = token.parse().map_err(|_| InputError::BadNumber {
        line,
        token: token.to_owned(),
    })?;
    if id >= objects {
        return Err(InputError::IdOutOfRange { line, id, objects });
    }
    Ok(id)
}
