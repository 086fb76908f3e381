//! Variable interpolation for strings
//!
//! This module handles parsing and replacing variables in strings using the
//! `${var}` syntax. `$$` produces a literal `$`, so `$${HOME}` reaches the
//! shell as `${HOME}`.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The trailing bare `\$\{` only matches when no closing brace follows.
    RE.get_or_init(|| Regex::new(r"\$\$|\$\{([^}]*)\}|\$\{").expect("placeholder regex is valid"))
}

/// Replace every placeholder in `s` with the value returned by `lookup`
pub fn interpolate_with<F>(s: &str, mut lookup: F) -> InterpolationResult<String>
where
    F: FnMut(&str) -> InterpolationResult<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(s) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        result.push_str(&s[last..whole.start()]);

        match (whole.as_str(), caps.get(1)) {
            ("$$", _) => result.push('$'),
            (_, Some(name)) => {
                let name = name.as_str().trim();
                if name.is_empty() {
                    return Err(InterpolationError::InvalidSyntax(format!(
                        "empty placeholder in '{}'",
                        s
                    )));
                }
                result.push_str(&lookup(name)?);
            }
            _ => {
                return Err(InterpolationError::InvalidSyntax(format!(
                    "unterminated placeholder in '{}'",
                    s
                )))
            }
        }

        last = whole.end();
    }

    result.push_str(&s[last..]);
    Ok(result)
}

/// Interpolate a string against task parameters, then global variables
///
/// Parameters shadow globals of the same name. Unknown names are an error,
/// never an empty string.
pub fn interpolate(
    s: &str,
    params: &HashMap<String, String>,
    globals: &HashMap<String, String>,
) -> InterpolationResult<String> {
    interpolate_with(s, |name| {
        params
            .get(name)
            .or_else(|| globals.get(name))
            .cloned()
            .ok_or_else(|| InterpolationError::UndefinedVariable(name.to_string()))
    })
}

/// Names of all placeholders referenced by `s`, in order of appearance
pub fn placeholders(s: &str) -> InterpolationResult<Vec<String>> {
    let mut names = Vec::new();
    interpolate_with(s, |name| {
        names.push(name.to_string());
        Ok(String::new())
    })?;
    Ok(names)
}

/// Interpolate a list of strings
pub fn interpolate_list(
    list: &[String],
    params: &HashMap<String, String>,
    globals: &HashMap<String, String>,
) -> InterpolationResult<Vec<String>> {
    list.iter()
        .map(|s| interpolate(s, params, globals))
        .collect::<InterpolationResult<Vec<String>>>()
}
