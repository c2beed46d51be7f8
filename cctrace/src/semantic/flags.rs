// SPDX-License-Identifier: GPL-3.0-or-later

//! Flag key tables of the GCC-compatible command line.
//!
//! The tables describe the flags which would confuse the structured parsing
//! of the command line. They are read-only after construction: the built-in
//! keys are always present, the configuration can only extend them.

/// Flags which take a separate string value: `-D NAME=VALUE`, `-U NAME`, `-x c++`.
/// The glued form (`-DNAME=VALUE`) is recognized by the key being a prefix.
pub const STRING_FLAGS: &[&str] = &["-D", "-U", "-x"];

/// Flags which are dropped when a token starts with them. These are either
/// boolean switches or flags with a glued value (`-O2`, `-std=c99`, `-Wall`).
pub const IGNORED_FLAGS: &[&str] = &[
    "-w",
    "-W",
    "-O",
    "-f",
    "-C",
    "-std",
    "-nostdinc",
    "-print-file-name",
    "-MD",
    "-m",
    "-v",
    "-g",
    "-pg",
    "-P",
    "-pipe",
    "--version",
];

/// Long options which GCC spells with a single dash. These are rewritten
/// to the double dash form, so the classifier can take them as long options.
pub const LONG_FLAGS: &[&str] = &["-isystem", "-include"];

/// The lookup tables used by the normalizer and the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagTable {
    string: Vec<String>,
    ignored: Vec<String>,
    long: Vec<String>,
}

impl Default for FlagTable {
    fn default() -> Self {
        Self {
            string: to_owned(STRING_FLAGS),
            ignored: to_owned(IGNORED_FLAGS),
            long: to_owned(LONG_FLAGS),
        }
    }
}

impl FlagTable {
    /// Extends the two-token string flags with the given keys.
    pub fn with_string_flags<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.string, keys);
        self
    }

    /// Extends the prefix matched noise flags with the given keys.
    pub fn with_ignored_flags<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.ignored, keys);
        self
    }

    /// Extends the single dash long options with the given keys.
    pub fn with_long_flags<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.long, keys);
        self
    }

    /// True when the token is exactly a two-token string flag key.
    pub fn is_string_flag(&self, token: &str) -> bool {
        self.string.iter().any(|key| key == token)
    }

    /// Returns the string flag key which the token starts with.
    pub fn string_flag_prefix(&self, token: &str) -> Option<&str> {
        find_prefix(&self.string, token)
    }

    /// Returns the noise flag key which the token starts with.
    pub fn ignored_prefix(&self, token: &str) -> Option<&str> {
        find_prefix(&self.ignored, token)
    }

    /// True when the token is exactly a single dash long option key.
    pub fn is_long_flag(&self, token: &str) -> bool {
        self.long.iter().any(|key| key == token)
    }

    /// True when the name (without dashes) belongs to one of the long option keys.
    pub fn is_long_option_name(&self, name: &str) -> bool {
        self.long.iter().any(|key| key.trim_start_matches('-') == name)
    }
}

fn to_owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

fn extend_unique<I, S>(keys: &mut Vec<String>, extra: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for key in extra.into_iter().map(Into::into) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
}

fn find_prefix<'a>(keys: &'a [String], token: &str) -> Option<&'a str> {
    keys.iter()
        .find(|key| token.starts_with(key.as_str()))
        .map(String::as_str)
}
