// SPDX-License-Identifier: GPL-3.0-or-later

//! This module provides the semantic analysis of compiler calls. It finds
//! out what a GCC-compatible compiler call does, and turns it into a
//! dependency record for the build provenance tracking.
//!
//! The analysis runs in four stages, each feeding the next:
//! - `normalize`: drops and rewrites the tokens which would confuse the parsing.
//! - `classify`: recognizes the flags, separates the inputs and derives the mode.
//! - `infer`: resolves the output files, applying the compiler defaults.
//! - `record`: builds the dependency record from the mode, inputs and outputs.
//!
//! Every stage is a function of its arguments. The [`Analyzer`] only holds the
//! read-only flag tables, the state of an analysis lives on the stack of the
//! [`Analyzer::analyze`] call.

pub mod classify;
pub mod flags;
pub mod infer;
pub mod normalize;
pub mod record;

pub use flags::FlagTable;
pub use record::{CompileUnit, DependencyRecord, FileRef, LinkUnit};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The build mode requested by the compiler call.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Compile the inputs (if needed) and link them together.
    #[default]
    Link,
    /// Run the preprocessor only (`-E`).
    Preprocess,
    /// Stop after the compilation proper (`-S`).
    Compile,
    /// Create object files, do not link (`-c`).
    Assemble,
    /// The call does not process files (eg.: `--version`).
    PrintOnly,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Link => "link",
            Mode::Preprocess => "preprocess",
            Mode::Compile => "compile",
            Mode::Assemble => "assemble",
            Mode::PrintOnly => "print-only",
        };
        write!(f, "{}", name)
    }
}

/// A compiler call to analyze.
///
/// The [`arguments`] do not contain the program name. The [`working_dir`]
/// is where the relative paths of the arguments are resolved from.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub working_dir: PathBuf,
    pub arguments: Vec<String>,
}

impl Invocation {
    pub fn new(working_dir: impl Into<PathBuf>, arguments: Vec<String>) -> Self {
        Self { working_dir: working_dir.into(), arguments }
    }

    /// Creates an invocation from a full command line, where the first
    /// element is the compiler executable. Returns `None` for an empty
    /// command line.
    pub fn from_command_line(working_dir: impl Into<PathBuf>, command: &[String]) -> Option<Self> {
        let (_program, arguments) = command.split_first()?;
        Some(Self::new(working_dir, arguments.to_vec()))
    }
}

/// The failures of the analysis.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AnalysisError {
    /// The command line can not be classified.
    #[error("Malformed flag syntax at '{flag}': {reason}")]
    MalformedFlagSyntax { flag: String, reason: &'static str },
    /// The mode has no dependency record representation.
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(Mode),
    /// The inputs and the outputs can not be paired.
    #[error("Structural mismatch: {inputs} input(s) with {outputs} output(s)")]
    StructuralMismatch { inputs: usize, outputs: usize },
}

impl AnalysisError {
    /// The malformed command line is fatal: the build trace would have a
    /// gap. The other failures are for the caller to decide about.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::MalformedFlagSyntax { .. })
    }
}

/// Analyzes compiler calls with the given flag tables.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    flags: FlagTable,
}

impl Analyzer {
    pub fn new(flags: FlagTable) -> Self {
        Self { flags }
    }

    /// Turns the compiler call into a dependency record.
    ///
    /// A call which resolves to [`Mode::PrintOnly`] results an empty record,
    /// without reaching the record builder.
    pub fn analyze(&self, invocation: &Invocation) -> Result<DependencyRecord, AnalysisError> {
        log::trace!("Analyzing arguments: {:?}", invocation.arguments);

        let normalized = normalize::normalize(&self.flags, &invocation.arguments);
        let classification = classify::classify(&self.flags, &normalized)?;
        let mode = classification.mode();
        let resolution = infer::infer(mode, classification.inputs, classification.output);
        log::debug!(
            "Compiler call resolved: mode={}, inputs={:?}, outputs={:?}",
            resolution.mode(),
            resolution.inputs(),
            resolution.outputs()
        );

        if resolution.mode() == Mode::PrintOnly {
            return Ok(DependencyRecord::Nothing);
        }
        record::build(&resolution)
    }
}
