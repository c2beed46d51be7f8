// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolves the output files of the compiler call.
//!
//! When the output is not given on the command line, the compiler picks a
//! default name which depends on the mode. The resolution finalizes the mode
//! too: a link without inputs is only a query (like `--version`), which turns
//! into [`Mode::PrintOnly`].

use super::Mode;

/// The file name of the executable when the link has no explicit output.
pub const DEFAULT_EXECUTABLE: &str = "a.out";

/// The extension of the object files created by assembling.
pub const OBJECT_EXTENSION: &str = ".o";

/// The final mode, inputs and outputs of a compiler call.
///
/// It is created by [`infer`], and can not be changed after that.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    mode: Mode,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Resolution {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

/// Resolves the outputs from the classified mode, inputs and explicit output.
pub fn infer(mode: Mode, inputs: Vec<String>, output: Option<String>) -> Resolution {
    if let Some(output) = output {
        log::trace!("Explicit output: {output}");
        return Resolution { mode, inputs, outputs: vec![output] };
    }

    match mode {
        Mode::Link if inputs.is_empty() => {
            log::trace!("No inputs and no output, nothing to record");
            Resolution { mode: Mode::PrintOnly, inputs, outputs: vec![] }
        }
        Mode::Link => {
            log::trace!("Default output: {DEFAULT_EXECUTABLE}");
            Resolution { mode, inputs, outputs: vec![DEFAULT_EXECUTABLE.to_string()] }
        }
        Mode::Assemble => {
            let outputs: Vec<String> = inputs.iter().map(|input| object_file_name(input)).collect();
            log::trace!("Default outputs: {outputs:?}");
            Resolution { mode, inputs, outputs }
        }
        Mode::Compile | Mode::Preprocess | Mode::PrintOnly => {
            Resolution { mode, inputs, outputs: vec![] }
        }
    }
}

/// Replaces the extension of the last path component with the object file
/// extension. The directory part of the path is kept.
fn object_file_name(input: &str) -> String {
    let stem_end = input
        .rfind(|c: char| c == '.' || std::path::is_separator(c))
        .filter(|idx| input[*idx..].starts_with('.'))
        .unwrap_or(input.len());

    format!("{}{}", &input[..stem_end], OBJECT_EXTENSION)
}
