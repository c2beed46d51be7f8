// SPDX-License-Identifier: GPL-3.0-or-later

//! Builds the dependency record from the resolved compiler call.

use super::infer::Resolution;
use super::{AnalysisError, Mode};
use std::fmt;

/// A file path as it was given on the command line.
///
/// The path is not cleaned, it is still relative to the working directory
/// of the compiler call (when it is not absolute).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileRef(String);

impl FileRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One source file turned into one object file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompileUnit {
    pub source: FileRef,
    pub target: FileRef,
}

/// Inputs linked together into one target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkUnit {
    pub target: FileRef,
    pub dependencies: Vec<FileRef>,
}

/// The result of the analysis of a compiler call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DependencyRecord {
    /// The compiler call links the inputs into a single target.
    Link(LinkUnit),
    /// The compiler call creates an object file from each input.
    Compilations(Vec<CompileUnit>),
    /// The compiler call does not create files (eg.: `--version`).
    Nothing,
}

/// Turns the resolution into a record.
///
/// Only the link and the assemble modes produce a record, the others are
/// reported as unsupported. For assembling, every input needs its own output.
pub fn build(resolution: &Resolution) -> Result<DependencyRecord, AnalysisError> {
    let inputs = resolution.inputs();
    let outputs = resolution.outputs();

    match resolution.mode() {
        Mode::Link => {
            let [target] = outputs else {
                return Err(AnalysisError::StructuralMismatch {
                    inputs: inputs.len(),
                    outputs: outputs.len(),
                });
            };
            log::trace!("Link record: {target} from {inputs:?}");
            Ok(DependencyRecord::Link(LinkUnit {
                target: FileRef::new(target.as_str()),
                dependencies: inputs.iter().map(|input| FileRef::new(input.as_str())).collect(),
            }))
        }
        Mode::Assemble => {
            if inputs.len() != outputs.len() {
                return Err(AnalysisError::StructuralMismatch {
                    inputs: inputs.len(),
                    outputs: outputs.len(),
                });
            }
            let units = inputs
                .iter()
                .zip(outputs)
                .map(|(source, target)| {
                    log::trace!("Compile record: {source} -> {target}");
                    CompileUnit { source: FileRef::new(source.as_str()), target: FileRef::new(target.as_str()) }
                })
                .collect();
            Ok(DependencyRecord::Compilations(units))
        }
        mode @ (Mode::Compile | Mode::Preprocess | Mode::PrintOnly) => {
            Err(AnalysisError::UnsupportedMode(mode))
        }
    }
}
