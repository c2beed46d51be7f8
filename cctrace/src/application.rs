// SPDX-License-Identifier: GPL-3.0-or-later

//! Wires the analysis and the report writing together for one compiler call.

use crate::config;
use crate::output::{self, PathCleaner, Report, ReportWriter, WriterError};
use crate::semantic::{AnalysisError, Analyzer, DependencyRecord, FlagTable, Invocation};
use std::process::ExitCode;
use thiserror::Error;

/// The process exit code of a failure which stops the analysis.
const EXIT_FATAL: u8 = 2;

pub struct Application {
    analyzer: Analyzer,
    unsupported_modes: config::UnsupportedModes,
    cleaner: Box<dyn PathCleaner>,
    writer: ReportWriter,
}

impl Application {
    /// Configure the application from the configuration and the report destination.
    pub fn configure(config: &config::Main, destination: &str) -> Self {
        Self {
            analyzer: Analyzer::new(FlagTable::from(&config.flags)),
            unsupported_modes: config.unsupported_modes,
            cleaner: output::cleaner(config.paths),
            writer: ReportWriter::from(destination),
        }
    }

    /// Analyze the compiler call and write the report.
    ///
    /// The failures are reported on the standard error, and turned into the
    /// process exit code.
    pub fn run(self, invocation: &Invocation) -> ExitCode {
        match self.execute(invocation) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("cctrace: {error}");
                ExitCode::from(error.code())
            }
        }
    }

    fn execute(self, invocation: &Invocation) -> Result<(), RunError> {
        let record = match self.analyzer.analyze(invocation) {
            Ok(record) => record,
            Err(AnalysisError::UnsupportedMode(mode))
                if self.unsupported_modes == config::UnsupportedModes::Skip =>
            {
                log::info!("Skipping compiler call with unsupported mode: {mode}");
                DependencyRecord::Nothing
            }
            Err(error) => return Err(error.into()),
        };

        let report = Report::new(&record, &invocation.working_dir, self.cleaner.as_ref());
        self.writer.write(&report)?;
        Ok(())
    }
}

/// The failures of a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Output(#[from] WriterError),
}

impl RunError {
    fn code(&self) -> u8 {
        match self {
            RunError::Analysis(error) if error.is_fatal() => EXIT_FATAL,
            _ => 1,
        }
    }
}
