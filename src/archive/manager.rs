//! Daily zip rotation of previous output

use crate::error::{Error, Result};
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// File name prefix of every daily archive
pub const ARCHIVE_PREFIX: &str = "SalesForceExtract-";

/// Sub-folder receiving archives of previous days
pub const ARCHIVE_FOLDER: &str = "Archive";

/// Daily archive file name, `SalesForceExtract-{yyyy-MM-dd}.zip`
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{ARCHIVE_PREFIX}{}.zip", date.format("%Y-%m-%d"))
}

/// What one rotation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Today's archive, when it exists after rotation
    pub archive: Option<PathBuf>,
    /// Entry names added to the archive
    pub added: Vec<String>,
    /// New location of yesterday's archive, when it was moved
    pub relocated: Option<PathBuf>,
}

/// Rotates loose `*.xml` results into the daily archive
#[derive(Debug, Clone)]
pub struct ArchiveManager {
    output_dir: PathBuf,
    exclusions: Vec<String>,
}

impl ArchiveManager {
    /// Create a manager for `output_dir`. Paths containing any of
    /// `exclusions` are never archived.
    pub fn new(output_dir: impl AsRef<Path>, exclusions: Vec<String>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            exclusions,
        }
    }

    /// Rotate using today's local date
    pub fn rotate(&self) -> Result<RotationReport> {
        self.rotate_at(Local::now().date_naive())
    }

    /// Rotate as if today were `today`.
    ///
    /// With an existing archive for `today` the loose files are appended to
    /// it. Otherwise yesterday's archive is moved to `Archive/` and a new one
    /// is created. Archived sources are deleted in both cases.
    pub fn rotate_at(&self, today: NaiveDate) -> Result<RotationReport> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            Error::archive(format!(
                "Failed to create output directory '{}': {e}",
                self.output_dir.display()
            ))
        })?;

        let files = self.collect_files()?;
        let archive = self.output_dir.join(archive_file_name(today));
        let mut report = RotationReport::default();

        if archive.exists() {
            report.added = self.append(&archive, &files)?;
        } else {
            report.relocated = self.relocate_previous(today)?;
            if !files.is_empty() {
                report.added = self.create(&archive, &files)?;
            }
        }

        remove_sources(&files)?;

        if archive.exists() {
            report.archive = Some(archive);
        }
        if !report.added.is_empty() {
            info!(
                "Archived {} previous result file(s) into {}",
                report.added.len(),
                archive_file_name(today)
            );
        }
        Ok(report)
    }

    /// Loose `*.xml` files under the output directory, as
    /// `(entry name, path)` pairs sorted by entry name
    fn collect_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut files = Vec::new();
        collect_xml(&self.output_dir, &mut files).map_err(|e| {
            Error::archive(format!(
                "Failed to list '{}': {e}",
                self.output_dir.display()
            ))
        })?;

        let mut entries: Vec<(String, PathBuf)> = files
            .into_iter()
            .filter_map(|path| {
                let relative = path.strip_prefix(&self.output_dir).ok()?;
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                Some((name, path))
            })
            .filter(|(name, _)| !self.is_excluded(name))
            .collect();

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn is_excluded(&self, entry_name: &str) -> bool {
        self.exclusions
            .iter()
            .any(|marker| !marker.is_empty() && entry_name.contains(marker.as_str()))
    }

    /// Move yesterday's archive into `Archive/`
    fn relocate_previous(&self, today: NaiveDate) -> Result<Option<PathBuf>> {
        let Some(yesterday) = today.pred_opt() else {
            return Ok(None);
        };
        let name = archive_file_name(yesterday);
        let previous = self.output_dir.join(&name);
        if !previous.is_file() {
            return Ok(None);
        }

        let folder = self.output_dir.join(ARCHIVE_FOLDER);
        fs::create_dir_all(&folder).map_err(|e| {
            Error::archive(format!("Failed to create '{}': {e}", folder.display()))
        })?;

        let target = folder.join(&name);
        if target.exists() {
            return Err(Error::archive(format!(
                "'{}' already exists",
                target.display()
            )));
        }
        fs::rename(&previous, &target).map_err(|e| {
            Error::archive(format!(
                "Failed to move '{}' to '{}': {e}",
                previous.display(),
                target.display()
            ))
        })?;

        info!("Moved {} to {}", name, folder.display());
        Ok(Some(target))
    }

    /// Build a new archive in memory, then write it in one step
    fn create(&self, archive: &Path, files: &[(String, PathBuf)]) -> Result<Vec<String>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let added = add_entries(&mut writer, HashSet::new(), files)?;
        let bytes = writer
            .finish()
            .map_err(|e| Error::archive(format!("Failed to finish archive: {e}")))?
            .into_inner();

        let partial = archive.with_extension("zip.tmp");
        fs::write(&partial, &bytes)
            .and_then(|()| fs::rename(&partial, archive))
            .map_err(|e| {
                let _ = fs::remove_file(&partial);
                Error::archive(format!("Failed to write '{}': {e}", archive.display()))
            })?;

        debug!("Created {} ({} bytes)", archive.display(), bytes.len());
        Ok(added)
    }

    /// Add entries to an existing archive
    fn append(&self, archive: &Path, files: &[(String, PathBuf)]) -> Result<Vec<String>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let existing: HashSet<String> = {
            let file = File::open(archive).map_err(|e| open_error(archive, &e))?;
            let reader = ZipArchive::new(file).map_err(|e| open_error(archive, &e))?;
            reader.file_names().map(str::to_string).collect()
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(archive)
            .map_err(|e| open_error(archive, &e))?;
        let mut writer = ZipWriter::new_append(file).map_err(|e| open_error(archive, &e))?;
        let added = add_entries(&mut writer, existing, files)?;
        writer
            .finish()
            .map_err(|e| Error::archive(format!("Failed to finish '{}': {e}", archive.display())))?
            .sync_all()
            .map_err(|e| Error::archive(format!("Failed to flush '{}': {e}", archive.display())))?;

        debug!("Appended {} entries to {}", added.len(), archive.display());
        Ok(added)
    }
}

fn open_error(archive: &Path, e: &dyn std::fmt::Display) -> Error {
    Error::archive(format!("Failed to open '{}': {e}", archive.display()))
}

fn add_entries<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    mut taken: HashSet<String>,
    files: &[(String, PathBuf)],
) -> Result<Vec<String>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut added = Vec::with_capacity(files.len());

    for (name, path) in files {
        let entry = unique_entry_name(name, &taken);
        let mut source = File::open(path)
            .map_err(|e| Error::archive(format!("Failed to read '{}': {e}", path.display())))?;

        writer
            .start_file(entry.as_str(), options)
            .map_err(|e| Error::archive(format!("Failed to add '{entry}': {e}")))?;
        io::copy(&mut source, writer)
            .map_err(|e| Error::archive(format!("Failed to add '{entry}': {e}")))?;

        taken.insert(entry.clone());
        added.push(entry);
    }
    Ok(added)
}

/// `name`, or `stem (n).ext` with the smallest free `n`
pub fn unique_entry_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && !name[dot..].contains('/') => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    (1..)
        .map(|n| format!("{stem} ({n}){ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn collect_xml(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_xml(&path, out)?;
        } else if file_type.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn remove_sources(files: &[(String, PathBuf)]) -> Result<()> {
    for (_, path) in files {
        fs::remove_file(path).map_err(|e| {
            Error::archive(format!("Failed to delete '{}': {e}", path.display()))
        })?;
    }
    Ok(())
}
