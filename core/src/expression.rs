//! Per-element install/uninstall expression generation.
//!
//! An element's template is expanded in two local stages:
//!
//! 1. Shorthand `<<id>>` tokens naming one of the element's own fields are
//!    qualified to `<<pkg.mod.sec.elem/id>>`.
//! 2. Qualified tokens whose key belongs to the element are replaced with the
//!    field's data.
//!
//! `<<prefix>>` is expanded to the section's prefix token after both stages.
//! Everything else (references to other elements, prefix tokens) is left in
//! place for the [`Unfolder`](crate::Unfolder).

use std::fmt;
use std::str::FromStr;

use regex::Captures;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::placeholder::{
    FIELD_REFERENCE, SECTION_PREFIX_KEYWORD, SHORTHAND, expand_section_prefix, placeholder,
};
use crate::{Element, Expressions, FlatMap, Namespace};

/// Which expression of an element to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionKind {
    Install,
    Uninstall,
}

impl ExpressionKind {
    pub const ALL: [ExpressionKind; 2] = [ExpressionKind::Install, ExpressionKind::Uninstall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpressionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "uninstall" => Ok(Self::Uninstall),
            other => Err(format!("unknown expression kind: {other}")),
        }
    }
}

impl Expressions {
    /// Returns the raw template for `kind`.
    pub fn template(&self, kind: ExpressionKind) -> &str {
        match kind {
            ExpressionKind::Install => &self.install,
            ExpressionKind::Uninstall => &self.uninstall,
        }
    }
}

/// Qualifies shorthand tokens that name a local field.
///
/// Bare tokens for which `is_local` is false are kept as written; they are
/// resolved later as prefix references.
///
/// # Examples
///
/// ```
/// use framework_core::{Namespace, qualify_shorthand};
///
/// let element = Namespace::root("pkgA").child("modA").child("secA").child("elemA");
/// let out = qualify_shorthand("set <<val>> with <<core>>", &element, |id| id == "val");
/// assert_eq!(out, "set <<pkgA.modA.secA.elemA/val>> with <<core>>");
/// ```
pub fn qualify_shorthand<F>(template: &str, element: &Namespace, is_local: F) -> String
where
    F: Fn(&str) -> bool,
{
    SHORTHAND
        .replace_all(template, |caps: &Captures<'_>| {
            if is_local(&caps[1]) {
                placeholder(&element.field_key(&caps[1]))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Replaces fully-qualified tokens whose key is present in `local`.
///
/// Inserted values are not rescanned.
pub fn substitute_local(text: &str, local: &FlatMap) -> String {
    FIELD_REFERENCE
        .replace_all(text, |caps: &Captures<'_>| match local.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

impl Element {
    /// Generates the locally expanded `kind` expression of this element.
    ///
    /// `section` is the qualified name of the enclosing section.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::DuplicateKey`](crate::FrameworkError::DuplicateKey)
    /// if two fields of the element share an id.
    pub fn expression(&self, kind: ExpressionKind, section: &Namespace) -> Result<String> {
        let namespace = section.child(&self.name);
        let local = self.fields(section)?;

        let qualified = qualify_shorthand(self.expressions.template(kind), &namespace, |id| {
            id != SECTION_PREFIX_KEYWORD && self.fields.iter().any(|field| field.id == id)
        });
        let substituted = substitute_local(&qualified, &local);
        // The keyword expands last so its section token is never taken for a field.
        Ok(expand_section_prefix(&substituted, section.leaf()))
    }
}
