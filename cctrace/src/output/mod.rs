// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for writing the result of the analysis.
//!
//! The dependency record is converted into a [`Report`], where the paths are
//! cleaned according to the configuration, and written as JSON to the
//! standard output or to a file. File output is written into a temporary
//! file first and moved to its final place afterwards, so a reader never
//! sees a partial report.

mod paths;
mod report;

pub use paths::{AsIs, Lexical, PathCleaner};
pub use report::{CompileRecord, LinkRecord, Report};

use crate::config;
use std::io::Write;
use std::{fs, io, path};
use thiserror::Error;

/// The name which selects the standard output as destination.
pub const STDOUT: &str = "-";

/// Returns the path cleaner for the configured path style.
pub fn cleaner(style: config::PathStyle) -> Box<dyn PathCleaner> {
    match style {
        config::PathStyle::AsIs => Box::new(AsIs),
        config::PathStyle::Clean => Box::new(Lexical),
    }
}

/// Writes a report to its destination.
#[derive(Debug, PartialEq)]
pub enum ReportWriter {
    Stdout,
    File { final_path: path::PathBuf, temp_path: path::PathBuf },
}

impl From<&str> for ReportWriter {
    fn from(destination: &str) -> Self {
        if destination == STDOUT {
            ReportWriter::Stdout
        } else {
            let final_path = path::PathBuf::from(destination);
            let temp_path = final_path.with_extension("tmp");
            ReportWriter::File { final_path, temp_path }
        }
    }
}

impl ReportWriter {
    pub fn write(self, report: &Report) -> Result<(), WriterError> {
        match self {
            ReportWriter::Stdout => {
                let stdout = io::stdout();
                Self::serialize(stdout.lock(), report)
                    .map_err(|err| WriterError::Io(path::PathBuf::from(STDOUT), err))
            }
            ReportWriter::File { final_path, temp_path } => {
                let file = fs::File::create(&temp_path)
                    .map_err(|err| WriterError::Io(temp_path.clone(), SerializationError::Io(err)))?;
                Self::serialize(io::BufWriter::new(file), report)
                    .map_err(|err| WriterError::Io(temp_path.clone(), err))?;

                log::debug!("Moving report {} to {}", temp_path.display(), final_path.display());
                fs::rename(&temp_path, &final_path)
                    .map_err(|err| WriterError::Io(final_path, SerializationError::Io(err)))
            }
        }
    }

    fn serialize<W: io::Write>(mut writer: W, report: &Report) -> Result<(), SerializationError> {
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Represents errors that can occur while serializing the report.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Generic IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Format syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
}

/// Represents errors that can occur while writing output.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to write report {0}: {1}")]
    Io(path::PathBuf, SerializationError),
}
