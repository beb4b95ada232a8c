//! Output file writer
//!
//! Writes each normalized document to `{output_dir}/{name}-{timestamp}.xml`.

use crate::error::{Error, Result};
use crate::normalize::NormalizedDocument;
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp format of output file names (millisecond resolution)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S-%3f";

/// A results file produced by one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Logical table name
    pub name: String,
    /// Full path of the written file
    pub path: PathBuf,
    /// Timestamp encoded in the file name
    pub created_at: NaiveDateTime,
}

/// Output file name for `name` at `at`
pub fn artifact_file_name(name: &str, at: NaiveDateTime) -> String {
    format!("{name}-{}.xml", at.format(TIMESTAMP_FORMAT))
}

/// Writes normalized documents into the output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    /// Create a writer for `output_dir`
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `document` stamped with the current local time
    pub fn write(&self, name: &str, document: &NormalizedDocument) -> Result<OutputArtifact> {
        self.write_at(name, document, Local::now().naive_local())
    }

    /// Write `document` stamped with `at`.
    ///
    /// Existing files are never overwritten: if the name is taken the
    /// timestamp is advanced one millisecond at a time until it is free.
    pub fn write_at(
        &self,
        name: &str,
        document: &NormalizedDocument,
        at: NaiveDateTime,
    ) -> Result<OutputArtifact> {
        fs::create_dir_all(&self.output_dir).map_err(|source| Error::SinkWrite {
            path: self.output_dir.display().to_string(),
            source,
        })?;

        let mut stamp = at;
        loop {
            let path = self.output_dir.join(artifact_file_name(name, stamp));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    writeln!(file, "{}", document.inner_xml())
                        .and_then(|()| file.sync_all())
                        .map_err(|source| Error::SinkWrite {
                            path: path.display().to_string(),
                            source,
                        })?;

                    debug!("Wrote {}", path.display());
                    return Ok(OutputArtifact {
                        name: name.to_string(),
                        path,
                        created_at: stamp,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    stamp += TimeDelta::milliseconds(1);
                }
                Err(source) => {
                    return Err(Error::SinkWrite {
                        path: path.display().to_string(),
                        source,
                    });
                }
            }
        }
    }
}
