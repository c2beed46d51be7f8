// SPDX-License-Identifier: GPL-3.0-or-later

//! The JSON report of a dependency record.
//!
//! The report is what the build provenance service consumes. It is one JSON
//! object with one of the following shapes:
//!
//! ```json
//! { "link": { "target": "a.out", "dependencies": ["a.c", "b.c"] } }
//! { "compilations": [ { "source": "x.c", "target": "x.o" } ] }
//! "nothing"
//! ```

use super::paths::PathCleaner;
use crate::semantic::{DependencyRecord, FileRef};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The serialized form of a dependency record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Report {
    Link(LinkRecord),
    Compilations(Vec<CompileRecord>),
    Nothing,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub target: String,
    pub dependencies: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CompileRecord {
    pub source: String,
    pub target: String,
}

impl Report {
    /// Creates the report from the record. Every path is passed to the cleaner
    /// together with the working directory of the compiler call.
    pub fn new(record: &DependencyRecord, working_dir: &Path, cleaner: &dyn PathCleaner) -> Self {
        let clean = |file: &FileRef| cleaner.clean(working_dir, file.as_str());

        match record {
            DependencyRecord::Link(unit) => Report::Link(LinkRecord {
                target: clean(&unit.target),
                dependencies: unit.dependencies.iter().map(clean).collect(),
            }),
            DependencyRecord::Compilations(units) => Report::Compilations(
                units
                    .iter()
                    .map(|unit| CompileRecord {
                        source: clean(&unit.source),
                        target: clean(&unit.target),
                    })
                    .collect(),
            ),
            DependencyRecord::Nothing => Report::Nothing,
        }
    }
}
