// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The module is defining types to represent a structured form of the
//! program invocation. The `Arguments` type is used to represent all
//! possible invocations of the program.

use crate::output::STDOUT;
use anyhow::anyhow;
use clap::{ArgAction, ArgMatches, Command, arg, command};
use std::fmt;

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // The number of times the verbose flag was given.
    pub verbosity: u8,
    // The path of the configuration file.
    pub config: Option<String>,
    // The working directory of the compiler call.
    pub directory: Option<String>,
    // The destination of the report.
    pub output: String,
    // The compiler call, starting with the compiler executable.
    pub command: Vec<String>,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let verbosity = matches.get_count("verbose");
        let config = matches.get_one::<String>("config").map(String::to_string);
        let directory = matches.get_one::<String>("directory").map(String::to_string);
        let output = matches
            .get_one::<String>("output")
            .map(String::to_string)
            .ok_or_else(|| anyhow!("missing output"))?;
        let command: Vec<String> = matches
            .get_many::<String>("COMMAND")
            .ok_or_else(|| anyhow!("missing compiler command"))?
            .cloned()
            .collect();

        Ok(Arguments { verbosity, config, directory, output, command })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments:")?;
        writeln!(f, "Verbosity: {}", self.verbosity)?;
        if let Some(config) = &self.config {
            writeln!(f, "Config: {config}")?;
        }
        if let Some(directory) = &self.directory {
            writeln!(f, "Directory: {directory}")?;
        }
        writeln!(f, "Output: {}", self.output)?;
        write!(f, "Command: {:?}", self.command)
    }
}

/// Represents the command line interface of the application.
///
/// The compiler call comes after the `--` separator, it starts with the
/// compiler executable name. Everything after the separator is passed to
/// the analysis untouched, including a second `--` of the compiler call.
pub fn cli() -> Command {
    command!()
        .arg_required_else_help(true)
        .args(&[
            arg!(-v --verbose ... "Sets the level of verbosity").action(ArgAction::Count),
            arg!(-c --config <FILE> "Path of the config file"),
            arg!(-d --directory <DIR> "Working directory of the compiler call"),
            arg!(-o --output <FILE> "Path of the result file, '-' for the standard output")
                .default_value(STDOUT)
                .hide_default_value(false),
            arg!(<COMMAND> "Compiler command")
                .action(ArgAction::Append)
                .num_args(1..)
                .last(true)
                .required(true),
        ])
}
