//! Fully qualified names.
//!
//! An FQN joins an ancestor chain of names with [`SEPARATOR`]. A name that
//! itself contains the separator is wrapped in double quotes when joined, so
//! `service` + `raw.events` becomes `service."raw.events"`. Entities and
//! columns share this addressing scheme.

use crate::{Error, Result};

/// The reserved character joining names into an FQN.
pub const SEPARATOR: char = '.';

const QUOTE: char = '"';

/// Quotes `name` if it contains the separator.
///
/// An already-quoted name is normalised: the quotes are dropped when they are
/// not needed. Quotes anywhere else in the name are rejected.
pub fn quote_name(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::InvalidFqn(name.to_string(), "name must not be empty"));
    }
    if let Some(inner) = strip_quotes(name) {
        if inner.is_empty() || inner.contains(QUOTE) {
            return Err(Error::InvalidFqn(name.to_string(), "unbalanced quotes"));
        }
        return Ok(if inner.contains(SEPARATOR) {
            name.to_string()
        } else {
            inner.to_string()
        });
    }
    if name.contains(QUOTE) {
        return Err(Error::InvalidFqn(name.to_string(), "quotes are only allowed around the whole name"));
    }
    if name.contains(SEPARATOR) {
        Ok(format!("{QUOTE}{name}{QUOTE}"))
    } else {
        Ok(name.to_string())
    }
}

/// Removes one pair of surrounding quotes, if present.
#[must_use]
pub fn unquote_name(name: &str) -> &str {
    strip_quotes(name).unwrap_or(name)
}

/// Appends `name` to `prefix`. An empty prefix yields the quoted name alone.
pub fn add(prefix: &str, name: &str) -> Result<String> {
    let quoted = quote_name(name)?;
    if prefix.is_empty() {
        Ok(quoted)
    } else {
        Ok(format!("{prefix}{SEPARATOR}{quoted}"))
    }
}

/// Builds an FQN from unquoted names, root first.
pub fn build<S: AsRef<str>>(names: &[S]) -> Result<String> {
    names
        .iter()
        .try_fold(String::new(), |acc, name| add(&acc, name.as_ref()))
}

/// Splits an FQN into its unquoted names, root first.
///
/// Separators inside quotes do not split.
pub fn split(fqn: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for ch in fqn.chars() {
        match ch {
            QUOTE => {
                in_quote = !in_quote;
                current.push(ch);
            }
            SEPARATOR if !in_quote => {
                names.push(finish_segment(fqn, &current)?);
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if in_quote {
        return Err(Error::InvalidFqn(fqn.to_string(), "unbalanced quotes"));
    }
    names.push(finish_segment(fqn, &current)?);
    Ok(names)
}

/// Returns the FQN of the parent, or `None` for a single-segment name.
pub fn parent(fqn: &str) -> Result<Option<String>> {
    let mut names = split(fqn)?;
    if names.len() < 2 {
        return Ok(None);
    }
    names.pop();
    build(&names).map(Some)
}

fn finish_segment(fqn: &str, segment: &str) -> Result<String> {
    if segment.is_empty() {
        return Err(Error::InvalidFqn(fqn.to_string(), "empty segment"));
    }
    Ok(unquote_name(segment).to_string())
}

fn strip_quotes(name: &str) -> Option<&str> {
    if name.len() >= 2 && name.starts_with(QUOTE) && name.ends_with(QUOTE) {
        Some(&name[1..name.len() - 1])
    } else {
        None
    }
}
