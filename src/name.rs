//! Module for handling names according to the W3C [Namespaces in XML 1.1
//! (Second Edition)][spec] specification
//!
//! [spec]: https://www.w3.org/TR/xml-names11

use std::fmt;
use std::hash::{Hash, Hasher};

/// The namespace the `xml` prefix is bound to in every scope.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A lexical name as it appears in the input: an optional prefix and a
/// local part, before any namespace resolution.
///
/// Produced by the tokenizer; holds no namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LName {
    /// Namespace prefix, the part before the `:` when present
    pub prefix: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl LName {
    /// Creates an unprefixed lexical name.
    pub fn local<L: Into<String>>(local: L) -> LName {
        LName {
            prefix: None,
            local: local.into(),
        }
    }

    /// Creates a prefixed lexical name.
    pub fn prefixed<P: Into<String>, L: Into<String>>(prefix: P, local: L) -> LName {
        LName {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }
}

impl fmt::Display for LName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// A fully-qualified name: a local part, an optional namespace URI and
/// the original prefix.
///
/// Produced by the namespace resolver from an [`LName`]. Equality and
/// hashing consider the local part and the namespace only; the prefix is
/// retained for display but is not part of a name's identity.
#[derive(Debug, Clone, Eq)]
pub struct QName {
    /// Local part of the name
    pub local: String,
    /// Namespace URI the name resolved to, if any
    pub namespace: Option<String>,
    /// Prefix the name was written with, if any
    pub prefix: Option<String>,
}

impl QName {
    /// Creates a name without a namespace or prefix.
    pub fn new<L: Into<String>>(local: L) -> QName {
        QName {
            local: local.into(),
            namespace: None,
            prefix: None,
        }
    }

    /// Creates a name qualified by a namespace URI, without a prefix.
    pub fn with_namespace<L: Into<String>, N: Into<String>>(local: L, namespace: N) -> QName {
        QName {
            local: local.into(),
            namespace: Some(namespace.into()),
            prefix: None,
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &QName) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.local.hash(state);
        self.namespace.hash(state);
    }
}

impl From<&str> for QName {
    fn from(local: &str) -> QName {
        QName::new(local)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn qname_identity_ignores_prefix() {
        let a = QName {
            local: "item".to_string(),
            namespace: Some("urn:x".to_string()),
            prefix: Some("x".to_string()),
        };
        let b = QName {
            local: "item".to_string(),
            namespace: Some("urn:x".to_string()),
            prefix: None,
        };
        assert_eq!(a, b);
        assert_ne!(a, QName::new("item"));
        assert_ne!(a, QName::with_namespace("item", "urn:y"));
    }

    #[test]
    fn display_keeps_prefix() {
        assert_eq!(LName::prefixed("x", "c").to_string(), "x:c");
        assert_eq!(QName::new("p").to_string(), "p");
    }
}
