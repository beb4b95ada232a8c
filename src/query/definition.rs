//! Query file parsing
//!
//! The query file holds one `Name:QueryOrPath` entry per line. Lines starting
//! with `*` are comments. Only the first colon separates the name, so SOQL
//! literals and resource paths may contain colons.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// One named query from the query file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefinition {
    /// Logical table name, used for the output file and the `@Type` parameter
    pub name: String,
    /// SOQL query or raw REST resource path
    pub query_or_path: String,
    /// 1-based line number in the query file
    pub line_number: usize,
}

impl QueryDefinition {
    /// Parse one line of the query file.
    ///
    /// Returns `Ok(None)` for comments and blank lines.
    pub fn parse(line_number: usize, line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.trim().is_empty() || line.starts_with('*') {
            return Ok(None);
        }

        let invalid = || Error::InvalidQueryLine {
            line_number,
            line: line.to_string(),
        };

        let (name, query_or_path) = line.split_once(':').ok_or_else(invalid)?;
        let name = name.trim();
        let query_or_path = query_or_path.trim();
        if name.is_empty() || query_or_path.is_empty() {
            return Err(invalid());
        }

        Ok(Some(Self {
            name: name.to_string(),
            query_or_path: query_or_path.to_string(),
            line_number,
        }))
    }
}

/// Lazily reads query definitions from the query file, one line at a time.
///
/// Yields `Err(Error::QueryFile)` when the file cannot be read (fatal) and
/// `Err(Error::InvalidQueryLine)` for a malformed entry (the caller may skip it).
pub struct QueryFileReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    failed: bool,
}

impl QueryFileReader {
    /// Open the query file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::QueryFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
            failed: false,
        })
    }
}

impl Iterator for QueryFileReader {
    type Item = Result<QueryDefinition>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(Error::QueryFile {
                        path: self.path.display().to_string(),
                        message: e.to_string(),
                    }));
                }
            };
            self.line_number += 1;

            match QueryDefinition::parse(self.line_number, &line) {
                Ok(None) => continue,
                Ok(Some(definition)) => return Some(Ok(definition)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
