//! Xml Attributes module
//!
//! Provides the attribute types produced by the tokenizer and the
//! resolver, and a small state-threading parser over the attribute list
//! of a single element.

use std::fmt;

use crate::errors::{Error, Result};
use crate::events::{flatten, Content};
use crate::name::{LName, QName};

/// An attribute as the tokenizer sees it: a lexical name and a value
/// made of content fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute {
    /// Lexical attribute name
    pub name: LName,
    /// Value fragments, entity references unresolved
    pub value: Vec<Content>,
}

impl RawAttribute {
    /// Flattened text of the attribute value.
    pub fn text(&self) -> String {
        flatten(&self.value)
    }
}

/// An attribute after namespace resolution.
///
/// An unprefixed attribute never inherits the default namespace, so its
/// name has a `None` namespace unless it was explicitly prefixed.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Resolved attribute name
    pub name: QName,
    /// Value fragments, entity references unresolved
    pub value: Vec<Content>,
}

impl Attribute {
    /// Flattened text of the attribute value.
    pub fn text(&self) -> String {
        flatten(&self.value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.text())
    }
}

/// A parser over the attribute list of a single element.
///
/// The parser threads the list of not-yet-consumed attributes through a
/// sequence of `require*`/`optional*` calls; each call removes the
/// attribute it matched. After the caller's attribute closure returns,
/// [`tag`](crate::parse::tag) checks completion: any attribute still in
/// the list raises [`Error::UnparsedAttributes`]. Call
/// [`ignore_rest`](AttrParser::ignore_rest) to discard attributes that
/// were not explicitly parsed.
#[derive(Debug)]
pub struct AttrParser {
    remaining: Vec<Attribute>,
}

impl AttrParser {
    pub(crate) fn new(attributes: Vec<Attribute>) -> AttrParser {
        AttrParser {
            remaining: attributes,
        }
    }

    /// Scans the remaining attributes for the first one `pick` accepts,
    /// removes it and returns the picked value. Raises a syntax error
    /// with `msg` when no attribute matches.
    pub fn require_with<T, F>(&mut self, msg: &str, pick: F) -> Result<T>
    where
        F: FnMut(&Attribute) -> Option<T>,
    {
        self.optional_with(pick)
            .ok_or_else(|| Error::syntax(msg.to_string()))
    }

    /// As [`require_with`](AttrParser::require_with), but returns `None`
    /// instead of raising when no attribute matches.
    pub fn optional_with<T, F>(&mut self, mut pick: F) -> Option<T>
    where
        F: FnMut(&Attribute) -> Option<T>,
    {
        for (i, attr) in self.remaining.iter().enumerate() {
            if let Some(value) = pick(attr) {
                self.remaining.remove(i);
                return Some(value);
            }
        }
        None
    }

    /// Requires an attribute by name and returns its flattened text.
    pub fn require<N: Into<QName>>(&mut self, name: N) -> Result<String> {
        let name = name.into();
        self.require_with(&format!("missing required attribute `{}`", name), |a| {
            (a.name == name).then(|| a.text())
        })
    }

    /// Looks up an attribute by name and returns its flattened text.
    pub fn optional<N: Into<QName>>(&mut self, name: N) -> Option<String> {
        let name = name.into();
        self.optional_with(|a| (a.name == name).then(|| a.text()))
    }

    /// Discards all remaining attributes, so that completion succeeds.
    pub fn ignore_rest(&mut self) {
        self.remaining.clear();
    }

    /// Completion rule: succeeds only when every attribute was consumed.
    pub(crate) fn finish(self) -> Result<()> {
        if self.remaining.is_empty() {
            Ok(())
        } else {
            Err(Error::UnparsedAttributes(self.remaining))
        }
    }
}
