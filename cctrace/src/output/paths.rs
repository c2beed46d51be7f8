// SPDX-License-Identifier: GPL-3.0-or-later

//! Path cleaning of the reported files.
//!
//! The analysis keeps the paths as they were given on the command line. The
//! cleaners turn the (working directory, raw path) pairs into the path which
//! goes into the report.

use std::path::{Component, Path, PathBuf};

/// Turns a raw path of a compiler call into the reported form.
pub trait PathCleaner {
    fn clean(&self, working_dir: &Path, raw: &str) -> String;
}

/// Leaves the path as is.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsIs;

impl PathCleaner for AsIs {
    fn clean(&self, _: &Path, raw: &str) -> String {
        raw.to_string()
    }
}

/// Resolves relative paths against the working directory, and removes the
/// `.` and `..` components without touching the filesystem. Symbolic links
/// are not followed, so the result might differ from the canonical path.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lexical;

impl PathCleaner for Lexical {
    fn clean(&self, working_dir: &Path, raw: &str) -> String {
        let joined = working_dir.join(raw);

        let mut result = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match result.components().next_back() {
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    // the parent of the root is the root
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => result.push(".."),
                },
                other => result.push(other.as_os_str()),
            }
        }

        if result.as_os_str().is_empty() {
            String::from(".")
        } else {
            result.to_string_lossy().into_owned()
        }
    }
}
