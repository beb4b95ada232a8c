//! Archive module
//!
//! Moves the previous runs' results files out of the output directory before
//! a new extract starts.
//!
//! # Overview
//!
//! - Loose `*.xml` files go into `SalesForceExtract-{yyyy-MM-dd}.zip`
//! - The first run of a day moves yesterday's zip into `Archive/`
//! - Archived files are deleted from the output directory

mod manager;

pub use manager::{
    archive_file_name, unique_entry_name, ArchiveManager, RotationReport, ARCHIVE_FOLDER,
    ARCHIVE_PREFIX,
};
