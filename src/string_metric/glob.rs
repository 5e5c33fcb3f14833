// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis glob to regex translation.
//!
//! # Mapping
//!
//! ```text
//! *        ->  .*
//! ?        ->  .
//! [ae]     ->  [ae]
//! [^e]     ->  [^e]
//! [a-b]    ->  [a-b]
//! \x       ->  literal x
//! other    ->  literal (regex metacharacters escaped)
//! ```
//!
//! The result is anchored (`^...$`) so it describes a full key match.

use crate::error::{HeuristicsError, Result};

/// Translate a Redis glob-style pattern into an anchored regex.
///
/// Fails with [`HeuristicsError::MalformedGlob`] on a trailing unescaped
/// backslash, an unclosed or nested `[`, or an empty class `[]`.
pub fn glob_to_regex(pattern: &str) -> Result<String> {
    if pattern.is_empty() {
        return Ok("^.*$".to_string());
    }

    let malformed = |reason: &str| HeuristicsError::MalformedGlob {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');

    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    let mut class_len = 0usize;

    while let Some(c) = chars.next() {
        if in_class {
            match c {
                ']' if class_len > 0 => {
                    regex.push(']');
                    in_class = false;
                }
                ']' => return Err(malformed("empty character class")),
                '[' => return Err(malformed("nested '[' inside character class")),
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| malformed("trailing unescaped backslash"))?;
                    push_class_literal(&mut regex, escaped);
                    class_len += 1;
                }
                '-' if class_len > 0 && chars.peek().is_some_and(|n| *n != ']') => {
                    regex.push('-');
                }
                _ => {
                    push_class_literal(&mut regex, c);
                    class_len += 1;
                }
            }
            continue;
        }

        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                in_class = true;
                class_len = 0;
                regex.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    regex.push('^');
                }
            }
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| malformed("trailing unescaped backslash"))?;
                push_literal(&mut regex, escaped);
            }
            _ => push_literal(&mut regex, c),
        }
    }

    if in_class {
        return Err(malformed("unclosed '['"));
    }

    regex.push('$');
    Ok(regex)
}

fn push_literal(regex: &mut String, c: char) {
    if regex_syntax::is_meta_character(c) {
        regex.push('\\');
    }
    regex.push(c);
}

/// Inside a class only a few chars are special; escape everything the
/// regex parser accepts as an escape.
fn push_class_literal(regex: &mut String, c: char) {
    if regex_syntax::is_escapeable_character(c) {
        regex.push('\\');
    }
    regex.push(c);
}
