// SPDX-License-Identifier: GPL-3.0-or-later

//! The optional `cctrace.yml` file, which extends the built-in flag tables
//! and tells what to do with the results the report can not represent.
//!
//! Without an explicit `--config` the file is looked up in the directory of
//! the compiler call, then in the configuration directories of the user.
//! Keys which are not given keep their defaults, a missing file means all
//! defaults.
//!
//! ```yaml
//! schema: 1.0
//!
//! flags:
//!   string: ["-MF", "-MT"]
//!   ignore: ["-pthread", "-shared"]
//!   long: ["-iquote"]
//!
//! unsupported_modes: skip
//! paths: clean
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use crate::semantic::FlagTable;
    use serde::Deserialize;
    use std::fmt;

    /// The content of the configuration file.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default)]
        pub flags: Flags,
        #[serde(default)]
        pub unsupported_modes: UnsupportedModes,
        #[serde(default)]
        pub paths: PathStyle,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                flags: Flags::default(),
                unsupported_modes: UnsupportedModes::default(),
                paths: PathStyle::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            let yaml_string = serde_yml::to_string(self).map_err(|_| fmt::Error)?;
            for line in yaml_string.lines() {
                writeln!(f, "{}", line)?;
            }
            Ok(())
        }
    }

    /// Flag keys added to the built-in tables.
    ///
    /// - `string`: flags with a separate value, dropped together with it.
    /// - `ignore`: flags dropped when a token starts with them.
    /// - `long`: single dash long options, their value is consumed.
    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Flags {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub string: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub ignore: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub long: Vec<String>,
    }

    impl From<&Flags> for FlagTable {
        fn from(flags: &Flags) -> Self {
            FlagTable::default()
                .with_string_flags(flags.string.iter().cloned())
                .with_ignored_flags(flags.ignore.iter().cloned())
                .with_long_flags(flags.long.iter().cloned())
        }
    }

    /// What to do with compiler calls which mode has no dependency record.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
    #[serde(rename_all = "lowercase")]
    pub enum UnsupportedModes {
        /// Report the failure. (Default)
        #[default]
        Fail,
        /// Report an empty result.
        Skip,
    }

    /// How the paths are written into the report.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
    pub enum PathStyle {
        /// Leave the path as it was on the command line. (Default)
        #[default]
        #[serde(rename = "as-is")]
        AsIs,
        /// Resolve against the working directory and remove `.` and `..`.
        #[serde(rename = "clean")]
        Clean,
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {
    use super::types::*;
    use std::collections::HashSet;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: String },
        #[error("Flag '{flag}' in '{field}' shall start with a dash")]
        NotAFlag { field: &'static str, flag: String },
        #[error("Duplicate {field} entry at: {idx}")]
        DuplicateEntry { field: &'static str, idx: usize },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => self.errors.extend(errors),
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn finish(mut self) -> Result<(), ValidationError> {
            match self.errors.len() {
                0 => Ok(()),
                1 => Err(self.errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors: self.errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();
            collector.add_result(Flags::validate(&config.flags));
            collector.finish()
        }
    }

    impl Validator<Flags> for Flags {
        type Error = ValidationError;

        fn validate(config: &Flags) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            for (field, keys) in [
                ("flags.string", &config.string),
                ("flags.ignore", &config.ignore),
                ("flags.long", &config.long),
            ] {
                let mut seen = HashSet::new();
                for (idx, key) in keys.iter().enumerate() {
                    if key.is_empty() {
                        collector.add(ValidationError::EmptyString { field: format!("{field}[{idx}]") });
                    } else if !key.starts_with('-') {
                        collector.add(ValidationError::NotAFlag { field, flag: key.clone() });
                    }
                    if !seen.insert(key) {
                        collector.add(ValidationError::DuplicateEntry { field, idx });
                    }
                }
            }

            collector.finish()
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_default_config_is_valid() {
            assert!(Main::validate(&Main::default()).is_ok());
        }

        #[test]
        fn test_valid_flags() {
            let flags = Flags {
                string: vec!["-MF".into(), "-MT".into()],
                ignore: vec!["-pthread".into()],
                long: vec!["-iquote".into()],
            };

            assert!(Flags::validate(&flags).is_ok());
        }

        #[test]
        fn test_invalid_flags() {
            let flags = Flags { string: vec!["".into()], ignore: vec![], long: vec![] };
            assert!(matches!(Flags::validate(&flags), Err(ValidationError::EmptyString { .. })));

            let flags = Flags { string: vec![], ignore: vec!["pthread".into()], long: vec![] };
            assert!(matches!(
                Flags::validate(&flags),
                Err(ValidationError::NotAFlag { field: "flags.ignore", .. })
            ));

            let flags = Flags { string: vec![], ignore: vec![], long: vec!["-iquote".into(), "-iquote".into()] };
            assert!(matches!(
                Flags::validate(&flags),
                Err(ValidationError::DuplicateEntry { field: "flags.long", idx: 1 })
            ));
        }

        #[test]
        fn test_multiple_errors_are_collected() {
            let flags = Flags { string: vec!["MF".into()], ignore: vec!["".into()], long: vec![] };

            match Flags::validate(&flags) {
                Err(ValidationError::Multiple { errors }) => assert_eq!(errors.len(), 2),
                other => panic!("Expected multiple errors, got: {other:?}"),
            }
        }
    }
}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    /// The name of the file which is looked up in the search directories.
    pub const CONFIG_FILENAME: &str = "cctrace.yml";

    pub struct Loader {}

    impl Loader {
        /// Returns the configuration for the analysis of one compiler call.
        ///
        /// The file given on the command line is mandatory: a missing or broken
        /// file is an error. Without it, the first `cctrace.yml` of the search
        /// directories is used. When none exists, the built-in tables and the
        /// defaults (fail on unsupported modes, paths as-is) apply.
        pub fn load(current_directory: &Path, filename: &Option<String>) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                return Self::from_file(Path::new(path));
            }

            let found = Self::file_locations(current_directory).into_iter().find(|candidate| {
                log::debug!("Looking for configuration at: {}", candidate.display());
                candidate.is_file()
            });
            match found {
                Some(path) => Self::from_file(&path),
                None => {
                    log::debug!("No {CONFIG_FILENAME} found, using the built-in flag tables.");
                    Ok(Main::default())
                }
            }
        }

        /// The search directories: the directory of the compiler call first,
        /// then the user wide and the tool specific configuration directories.
        fn file_locations(current_directory: &Path) -> Vec<PathBuf> {
            let mut directories = vec![current_directory.to_path_buf()];
            if let Some(base) = BaseDirs::new() {
                directories.extend([base.config_local_dir(), base.config_dir()].map(Path::to_path_buf));
            }
            if let Some(project) = ProjectDirs::from("org", "cctrace", "cctrace") {
                directories.extend([project.config_local_dir(), project.config_dir()].map(Path::to_path_buf));
            }
            // the local and the roaming directories are the same on most platforms
            directories.dedup();
            directories.into_iter().map(|directory| directory.join(CONFIG_FILENAME)).collect()
        }

        /// Reads, parses and validates the given file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            log::info!("Using configuration: {}", path.display());

            let file = File::open(path).map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;
            let config: Main =
                Self::from_reader(file).map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;
            Main::validate(&config)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(config)
        }

        fn from_reader<R, T>(reader: R) -> serde_yml::Result<T>
        where
            R: std::io::Read,
            T: serde::de::DeserializeOwned,
        {
            serde_yml::from_reader(reader)
        }
    }

    /// The failures of reading a configuration file. Each names the file.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("Can not read configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("Invalid YAML in configuration file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        #[error("Rejected flag keys in configuration file '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

    #[cfg(test)]
    mod test {
        use super::super::*;
        use super::*;
        use crate::semantic::FlagTable;
        use std::fs;
        use tempfile::TempDir;

        #[test]
        fn test_full_config() {
            let content: &[u8] = br#"
            schema: 1.0

            flags:
              string: ["-MF", "-MT"]
              ignore: ["-pthread"]
              long: ["-iquote"]

            unsupported_modes: skip
            paths: clean
            "#;

            let result: Main = Loader::from_reader(content).unwrap();

            let expected = Main {
                schema: String::from("1.0"),
                flags: Flags {
                    string: vec!["-MF".into(), "-MT".into()],
                    ignore: vec!["-pthread".into()],
                    long: vec!["-iquote".into()],
                },
                unsupported_modes: UnsupportedModes::Skip,
                paths: PathStyle::Clean,
            };
            assert_eq!(expected, result);
        }

        #[test]
        fn test_minimal_config() {
            let content: &[u8] = br#"
            schema: 1.0
            "#;

            let result: Main = Loader::from_reader(content).unwrap();

            assert_eq!(Main::default(), result);
        }

        #[test]
        fn test_partial_flags() {
            let content: &[u8] = br#"
            schema: 1.0
            flags:
              ignore: ["-shared"]
            paths: as-is
            "#;

            let result: Main = Loader::from_reader(content).unwrap();

            assert_eq!(result.flags.ignore, vec!["-shared".to_string()]);
            assert!(result.flags.string.is_empty());
            assert_eq!(result.paths, PathStyle::AsIs);
            assert_eq!(result.unsupported_modes, UnsupportedModes::Fail);
        }

        #[test]
        fn test_unsupported_schema() {
            let content: &[u8] = br#"
            schema: 4.0
            "#;

            let result: serde_yml::Result<Main> = Loader::from_reader(content);

            assert!(result.is_err());
        }

        #[test]
        fn test_unknown_path_style() {
            let content: &[u8] = br#"
            schema: 1.0
            paths: canonical
            "#;

            let result: serde_yml::Result<Main> = Loader::from_reader(content);

            assert!(result.is_err());
        }

        #[test]
        fn test_flag_table_from_config() {
            let flags = Flags {
                string: vec!["-MF".into()],
                ignore: vec!["-pthread".into()],
                long: vec!["-iquote".into()],
            };

            let sut = FlagTable::from(&flags);

            assert!(sut.is_string_flag("-MF"));
            assert!(sut.ignored_prefix("-pthread").is_some());
            assert!(sut.is_long_flag("-iquote"));
            assert!(sut.is_string_flag("-D"));
        }

        #[test]
        fn test_load_from_explicit_file() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("custom.yml");
            fs::write(&path, "schema: 1.0\nunsupported_modes: skip\n").unwrap();

            let result = Loader::load(temp_dir.path(), &Some(path.to_string_lossy().to_string())).unwrap();

            assert_eq!(result.unsupported_modes, UnsupportedModes::Skip);
        }

        #[test]
        fn test_load_from_current_directory() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join(CONFIG_FILENAME), "schema: 1.0\npaths: clean\n").unwrap();

            let result = Loader::load(temp_dir.path(), &None).unwrap();

            assert_eq!(result.paths, PathStyle::Clean);
        }

        #[test]
        fn test_load_missing_explicit_file() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("missing.yml");

            let result = Loader::load(temp_dir.path(), &Some(path.to_string_lossy().to_string()));

            assert!(matches!(result, Err(ConfigError::FileAccess { .. })));
        }

        #[test]
        fn test_load_invalid_file() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("invalid.yml");
            fs::write(&path, "schema: 1.0\nflags:\n  long: [\"iquote\"]\n").unwrap();

            let result = Loader::from_file(&path);

            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
        }
    }
}
