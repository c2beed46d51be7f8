// SPDX-License-Identifier: GPL-3.0-or-later

//! Recognizes the flags of the normalized command line and derives the
//! requested mode.
//!
//! The parsing follows the POSIX conventions: short flags can be grouped
//! (`-cS`), values can be glued (`-ofile`, `-o=file`) or separate (`-o file`),
//! long options take their values with `=` or as the next token, and `--`
//! terminates the flags. Tokens which are not flags become inputs. Unknown
//! flags are noise: they are discarded without affecting the result.

use super::flags::FlagTable;
use super::{AnalysisError, Mode};

/// The stop requests of the command line, each asking the compiler to
/// finish before a later pass would run.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    /// `-c`: compile and assemble, but do not link.
    Assemble,
    /// `-S`: stop after the compilation proper.
    Compile,
    /// `-E`: stop after preprocessing.
    Preprocess,
}

/// The precedence of the stop requests when more than one is present.
/// The first one found on the command line in this order wins, when none
/// is present the mode is [`Mode::Link`].
pub const STAGE_PRECEDENCE: [Stage; 3] = [Stage::Preprocess, Stage::Compile, Stage::Assemble];

/// The default value of the output flag. Given explicitly it means no output.
pub const OUTPUT_SENTINEL: &str = "undef";

impl Stage {
    fn mode(self) -> Mode {
        match self {
            Stage::Assemble => Mode::Assemble,
            Stage::Compile => Mode::Compile,
            Stage::Preprocess => Mode::Preprocess,
        }
    }
}

/// The recognized content of a command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    /// The stop requests, in the order of appearance.
    pub stages: Vec<Stage>,
    /// The explicit output file. The last one wins when given multiple times,
    /// and [`OUTPUT_SENTINEL`] resets it.
    pub output: Option<String>,
    /// The `-I` values.
    pub include_paths: Vec<String>,
    /// The `-l` values.
    pub link_libraries: Vec<String>,
    /// The long option names and values (`--isystem dir`, `--include file`).
    pub long_options: Vec<(String, String)>,
    /// The positional arguments.
    pub inputs: Vec<String>,
    /// The unknown flags which were discarded.
    pub discarded: Vec<String>,
}

impl Classification {
    /// Returns the mode which the stop requests imply.
    pub fn mode(&self) -> Mode {
        STAGE_PRECEDENCE
            .iter()
            .find(|stage| self.stages.contains(stage))
            .map(|stage| stage.mode())
            .unwrap_or(Mode::Link)
    }

    fn request(&mut self, stage: Stage) {
        if !self.stages.contains(&stage) {
            self.stages.push(stage);
        }
    }

    fn assign(&mut self, target: Target, flag: &str, value: String) -> Result<(), AnalysisError> {
        match target {
            Target::Output => {
                if value.is_empty() {
                    return Err(malformed(flag, "empty output file name"));
                }
                self.output = Some(value).filter(|value| value.as_str() != OUTPUT_SENTINEL);
            }
            Target::IncludePath => self.include_paths.push(value),
            Target::LinkLibrary => self.link_libraries.push(value),
            Target::LongOption(name) => self.long_options.push((name, value)),
        }
        Ok(())
    }
}

/// The destinations of the value taking flags.
#[derive(Clone, Debug, PartialEq)]
enum Target {
    Output,
    IncludePath,
    LinkLibrary,
    LongOption(String),
}

/// The meaning of a recognized flag.
#[derive(Clone, Debug, PartialEq)]
enum Recognized {
    Switch(Stage),
    Value(Target),
}

fn short_flag(name: char) -> Option<Recognized> {
    match name {
        'c' => Some(Recognized::Switch(Stage::Assemble)),
        'S' => Some(Recognized::Switch(Stage::Compile)),
        'E' => Some(Recognized::Switch(Stage::Preprocess)),
        'o' => Some(Recognized::Value(Target::Output)),
        'I' => Some(Recognized::Value(Target::IncludePath)),
        'l' => Some(Recognized::Value(Target::LinkLibrary)),
        _ => None,
    }
}

fn long_flag(flags: &FlagTable, name: &str) -> Option<Recognized> {
    match name {
        "assemble" => Some(Recognized::Switch(Stage::Assemble)),
        "compile" => Some(Recognized::Switch(Stage::Compile)),
        "preprocess" => Some(Recognized::Switch(Stage::Preprocess)),
        "output" => Some(Recognized::Value(Target::Output)),
        "includepath" => Some(Recognized::Value(Target::IncludePath)),
        "linklib" => Some(Recognized::Value(Target::LinkLibrary)),
        _ if flags.is_long_option_name(name) => {
            Some(Recognized::Value(Target::LongOption(name.to_string())))
        }
        _ => None,
    }
}

/// Classifies the normalized tokens.
///
/// Fails when a value taking flag has no value, or a switch gets a value
/// which is not a boolean.
pub fn classify(flags: &FlagTable, tokens: &[String]) -> Result<Classification, AnalysisError> {
    let mut result = Classification::default();

    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        if token == "--" {
            log::trace!("Flag terminator found, the rest are inputs");
            result.inputs.extend(iter.by_ref().cloned());
            break;
        }
        if let Some(long) = token.strip_prefix("--") {
            classify_long(flags, token, long, &mut iter, &mut result)?;
        } else if token.len() > 1 && token.starts_with('-') {
            classify_short(token, &mut iter, &mut result)?;
        } else {
            log::trace!("Input found: {token}");
            result.inputs.push(token.clone());
        }
    }

    log::trace!("Classified arguments: {result:?}");
    Ok(result)
}

fn classify_long<'a, I>(
    flags: &FlagTable,
    token: &str,
    long: &str,
    rest: &mut I,
    result: &mut Classification,
) -> Result<(), AnalysisError>
where
    I: Iterator<Item = &'a String>,
{
    let (name, glued) = match long.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (long, None),
    };

    match long_flag(flags, name) {
        Some(Recognized::Switch(stage)) => {
            let enabled = match glued {
                None => true,
                Some(value) => parse_bool(value).ok_or_else(|| malformed(token, "invalid boolean value"))?,
            };
            log::trace!("Switch found: {token} ({stage:?}: {enabled})");
            if enabled {
                result.request(stage);
            } else {
                result.stages.retain(|current| *current != stage);
            }
        }
        Some(Recognized::Value(target)) => {
            let value = match glued {
                Some(value) => value.to_string(),
                None => rest
                    .next()
                    .cloned()
                    .ok_or_else(|| malformed(token, "flag needs an argument"))?,
            };
            log::trace!("Flag found: {token} {value}");
            result.assign(target, token, value)?;
        }
        None => {
            log::trace!("Discarding unknown flag: {token}");
            result.discarded.push(token.to_string());
        }
    }
    Ok(())
}

fn classify_short<'a, I>(
    token: &str,
    rest: &mut I,
    result: &mut Classification,
) -> Result<(), AnalysisError>
where
    I: Iterator<Item = &'a String>,
{
    // A group is applied only when every flag in it is recognized.
    let mut stages = Vec::new();
    let mut value = None;

    let group = &token[1..];
    for (idx, name) in group.char_indices() {
        match short_flag(name) {
            Some(Recognized::Switch(stage)) => stages.push(stage),
            Some(Recognized::Value(target)) => {
                let glued = &group[idx + name.len_utf8()..];
                let argument = if glued.is_empty() {
                    rest.next()
                        .cloned()
                        .ok_or_else(|| malformed(token, "flag needs an argument"))?
                } else {
                    // `-o=` keeps the `=` as the value
                    match glued.strip_prefix('=') {
                        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
                        _ => glued.to_string(),
                    }
                };
                value = Some((target, argument));
                break;
            }
            None => {
                log::trace!("Discarding unknown flag: {token}");
                result.discarded.push(token.to_string());
                return Ok(());
            }
        }
    }

    for stage in stages {
        log::trace!("Switch found: {token} ({stage:?})");
        result.request(stage);
    }
    if let Some((target, argument)) = value {
        log::trace!("Flag found: {token} {argument}");
        result.assign(target, token, argument)?;
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn malformed(flag: &str, reason: &'static str) -> AnalysisError {
    AnalysisError::MalformedFlagSyntax {
        flag: flag.to_string(),
        reason,
    }
}
