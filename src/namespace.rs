//! Namespace scope management.
//!
//! Rewrites the lexical names of the token stream into fully-qualified
//! names while maintaining a stack of namespace scopes synchronized with
//! element nesting, as described in the W3C
//! [Namespaces in XML 1.1 (2006)](http://w3.org/TR/xml-names11/#scoping-defaulting)
//! scoping rules.

use std::collections::HashMap;

use log::warn;

use crate::events::attributes::{Attribute, RawAttribute};
use crate::name::{LName, QName, XML_NAMESPACE};

/// One namespace scope: the default namespace and the prefix bindings
/// visible at a given element.
///
/// Each element gets its own scope, snapshot-cloned from its parent and
/// then updated from the element's `xmlns` attributes in a single pass.
/// The scope is immutable for the element's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NsLevel {
    /// Current default namespace, applied to unprefixed *element* names.
    ///
    /// `xmlns=""` reverts to no default namespace, leaving unqualified
    /// element names unqualified for the extent of its scope.
    default: Option<String>,
    /// Prefix to namespace URI bindings.
    prefixes: HashMap<String, String>,
}

impl NsLevel {
    /// Resolves a lexical name against this scope.
    ///
    /// Unprefixed names take the default namespace only when
    /// `use_default` is set: unqualified *attribute* names never inherit
    /// the default namespace, unqualified *element* names do. The `xml`
    /// prefix resolves to its fixed namespace regardless of scope, and an
    /// undeclared prefix yields a name without a namespace rather than an
    /// error.
    pub fn qualify(&self, name: &LName, use_default: bool) -> QName {
        match &name.prefix {
            Some(p) if p == "xml" => QName {
                local: name.local.clone(),
                namespace: Some(XML_NAMESPACE.to_string()),
                prefix: Some(p.clone()),
            },
            Some(p) => {
                let namespace = self.prefixes.get(p).cloned();
                if namespace.is_none() {
                    warn!("undeclared namespace prefix `{}`", p);
                }
                QName {
                    local: name.local.clone(),
                    namespace,
                    prefix: Some(p.clone()),
                }
            }
            None => QName {
                local: name.local.clone(),
                namespace: if use_default {
                    self.default.clone()
                } else {
                    None
                },
                prefix: None,
            },
        }
    }
}

/// The namespace resolver: a stack of [`NsLevel`] scopes, one entry per
/// currently-open element.
///
/// An implicit empty root scope applies while the stack is empty. A
/// self-closing element never pushes its scope; its declarations are
/// visible only to its own name and attributes.
#[derive(Debug, Default)]
pub struct NamespaceResolver {
    scopes: Vec<NsLevel>,
}

impl NamespaceResolver {
    /// Number of scopes currently on the stack, equal to the number of
    /// open elements.
    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Processes a begin tag: derives the element's scope from its
    /// `xmlns` attributes, qualifies the element name and the ordinary
    /// attributes, and pushes the scope unless the element is
    /// self-closing.
    ///
    /// `xmlns` and `xmlns:*` attributes mutate the scope and are dropped
    /// from the returned attribute list; the remaining attributes keep
    /// their input order.
    pub fn start_element(
        &mut self,
        name: &LName,
        attrs: Vec<RawAttribute>,
        self_closing: bool,
    ) -> (QName, Vec<Attribute>) {
        let mut level = self.scopes.last().cloned().unwrap_or_default();
        let mut ordinary = Vec::new();
        for attr in attrs {
            match (&attr.name.prefix, attr.name.local.as_str()) {
                (Some(p), local) if p == "xmlns" => {
                    level.prefixes.insert(local.to_string(), attr.text());
                }
                (None, "xmlns") => {
                    let value = attr.text();
                    level.default = if value.is_empty() { None } else { Some(value) };
                }
                _ => ordinary.push(attr),
            }
        }
        let qname = level.qualify(name, true);
        let attributes = ordinary
            .into_iter()
            .map(|a| Attribute {
                name: level.qualify(&a.name, false),
                value: a.value,
            })
            .collect();
        if !self_closing {
            self.scopes.push(level);
        }
        (qname, attributes)
    }

    /// Processes an end tag: pops the element's scope and qualifies the
    /// name against it. An end tag with no matching open element is
    /// qualified against the empty root scope.
    pub fn end_element(&mut self, name: &LName) -> QName {
        let level = self.scopes.pop().unwrap_or_default();
        level.qualify(name, true)
    }
}
