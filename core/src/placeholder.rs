//! `<<...>>` placeholder grammar.
//!
//! Three token shapes are recognized:
//!
//! | Token | Meaning |
//! |---|---|
//! | `<<val>>` | shorthand: a field of the authoring element |
//! | `<<pkg.mod.sec.elem/val>>` | field reference, resolved globally |
//! | `<<core>>` / `<<a.b>>` | prefix reference, resolved from the prefix table |
//!
//! `<<prefix>>` is reserved: it stands for the prefix of the enclosing section.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// Reserved placeholder name for the enclosing section's prefix.
pub const SECTION_PREFIX_KEYWORD: &str = "prefix";

pub(crate) static SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([A-Za-z0-9_]+)>>").expect("static regex must compile"));

pub(crate) static FIELD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<([A-Za-z0-9_.]+/[A-Za-z0-9_]+)>>").expect("static regex must compile")
});

pub(crate) static PREFIX_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([A-Za-z0-9_.]+)>>").expect("static regex must compile"));

/// Wraps `reference` in placeholder markers.
pub fn placeholder(reference: &str) -> String {
    format!("<<{reference}>>")
}

/// Returns `true` if `text` still contains a field reference token.
pub fn has_field_reference(text: &str) -> bool {
    FIELD_REFERENCE.is_match(text)
}

/// Returns `true` if `text` still contains a prefix reference token.
pub fn has_prefix_reference(text: &str) -> bool {
    PREFIX_REFERENCE.is_match(text)
}

/// Rewrites `<<prefix>>` to a prefix reference for `section`.
///
/// # Examples
///
/// ```
/// use framework_core::expand_section_prefix;
///
/// assert_eq!(expand_section_prefix("add <<prefix>>_x", "core"), "add <<core>>_x");
/// assert_eq!(expand_section_prefix("prefix stays", "core"), "prefix stays");
/// ```
pub fn expand_section_prefix(text: &str, section: &str) -> String {
    text.replace(&placeholder(SECTION_PREFIX_KEYWORD), &placeholder(section))
}

/// Replaces every match of `pattern` with the result of `lookup` on its first
/// capture group, failing fast on the first lookup error.
pub(crate) fn substitute<F>(text: &str, pattern: &Regex, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for captures in pattern.captures_iter(text) {
        let (Some(token), Some(reference)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        output.push_str(&text[last..token.start()]);
        output.push_str(&lookup(reference.as_str())?);
        last = token.end();
    }
    output.push_str(&text[last..]);
    Ok(output)
}
