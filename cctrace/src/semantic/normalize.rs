// SPDX-License-Identifier: GPL-3.0-or-later

//! Removes and rewrites the tokens which would break the structured parsing
//! of the command line.
//!
//! The compiler accepts flags in several incompatible syntaxes. The ones
//! which are not needed to find the mode, the inputs and the outputs are
//! dropped here, while single dash long options are rewritten to the double
//! dash form. The pass walks the tokens once and builds a new sequence, the
//! surviving tokens keep their relative order.

use super::flags::FlagTable;

/// Returns the tokens which are safe to hand over to the classifier.
pub fn normalize(flags: &FlagTable, tokens: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(tokens.len());

    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        if flags.is_string_flag(token) {
            if let Some(value) = iter.next_if(|next| looks_like_definition(next)) {
                log::trace!("Dropping string flag: {token} {value}");
                continue;
            }
        }
        if let Some(key) = flags.string_flag_prefix(token) {
            log::trace!("Dropping string flag: {token} (matched by {key})");
            continue;
        }
        if let Some(key) = flags.ignored_prefix(token) {
            log::trace!("Dropping flag: {token} (matched by {key})");
            continue;
        }
        if flags.is_long_flag(token) {
            let rewritten = format!("-{token}");
            log::trace!("Rewriting long flag: {token} -> {rewritten}");
            result.push(rewritten);
            continue;
        }
        result.push(token.clone());
    }

    log::trace!("Normalized arguments: {result:?}");
    result
}

/// Checks the value of a two-token string flag: `NAME`, `NAME=VALUE` or a
/// language name like `c++`. It starts with a word character and has no
/// whitespace in it.
fn looks_like_definition(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
        && !token.chars().any(char::is_whitespace)
}
