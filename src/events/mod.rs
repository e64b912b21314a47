//! Defines the events emitted by the parsing pipeline.

pub mod attributes;

use crate::events::attributes::{Attribute, RawAttribute};
use crate::name::{LName, QName};

/// The atom of character data: either a literal run of characters or a
/// named entity reference that was not one of the five predefined
/// entities.
///
/// Predefined entities (`amp`, `lt`, `gt`, `apos`, `quot`) and numeric
/// character references are resolved during tokenization into literal
/// runs. Unresolved entities are kept distinct rather than substituted
/// with a placeholder, so downstream consumers can reject them or look
/// them up in their own tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A literal run of characters
    Text(String),
    /// A named entity reference, e.g. `&nbsp;` yields `Entity("nbsp")`
    Entity(String),
}

impl Content {
    /// Renders this fragment into `out`: literal runs verbatim,
    /// unresolved entities as `&name;`.
    pub fn push_to(&self, out: &mut String) {
        match self {
            Content::Text(t) => out.push_str(t),
            Content::Entity(name) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
        }
    }

    /// Whether this fragment is a literal run consisting only of
    /// whitespace. Entity references are never whitespace.
    pub fn is_whitespace(&self) -> bool {
        match self {
            Content::Text(t) => t.chars().all(crate::tokenizer::is_whitespace),
            Content::Entity(_) => false,
        }
    }
}

/// Flattens a fragment list into text: literal fragments are copied
/// verbatim, unresolved entities are rendered as `&name;`.
pub fn flatten(fragments: &[Content]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        fragment.push_to(&mut out);
    }
    out
}

/// The attributes of an `<?xml ... ?>` prolog.
///
/// [W3C XML 1.1 Prolog and Document Type Declaration](http://w3.org/TR/xml11/#sec-prolog-dtd)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlDecl {
    attributes: Vec<RawAttribute>,
}

impl XmlDecl {
    pub(crate) fn new(attributes: Vec<RawAttribute>) -> XmlDecl {
        XmlDecl { attributes }
    }

    fn pseudo_attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|a| a.name.prefix.is_none() && a.name.local == name)
            .map(|a| a.text())
    }

    /// Gets the xml version, without quotes.
    pub fn version(&self) -> Option<String> {
        self.pseudo_attribute("version")
    }

    /// Gets the xml encoding, as declared. Purely informational: the
    /// pipeline never cross-checks it against the detected encoding.
    pub fn encoding(&self) -> Option<String> {
        self.pseudo_attribute("encoding")
    }

    /// Gets the xml standalone flag, as declared.
    pub fn standalone(&self) -> Option<String> {
        self.pseudo_attribute("standalone")
    }

    /// The raw prolog attributes, in input order.
    pub fn attributes(&self) -> &[RawAttribute] {
        &self.attributes
    }
}

/// External ID of a doctype declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
    /// `PUBLIC "public-id" "system-id"`
    Public(String, String),
    /// `SYSTEM "system-id"`
    System(String),
}

/// An event of the fully-resolved stream.
///
/// The sequence always begins with [`Event::StartDocument`] and ends
/// with [`Event::EndDocument`]. Every `Start` is matched by an `End`
/// with an equal name at the same depth; a self-closing element emits
/// `Start` immediately followed by `End`. Consecutive `Text` events are
/// not coalesced at this layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Start of the document; always the first event, exactly once
    StartDocument(XmlDecl),
    /// End of the document; always the last event, exactly once
    EndDocument,
    /// Start tag (with attributes) `<tag attr="value">`
    Start {
        /// Resolved element name
        name: QName,
        /// Ordinary attributes in input order; `xmlns` declarations are
        /// consumed by the resolver and never appear here
        attributes: Vec<Attribute>,
    },
    /// End tag `</tag>`
    End {
        /// Resolved element name
        name: QName,
    },
    /// One content fragment between tags
    Text(Content),
    /// CData `<![CDATA[...]]>`
    CData(String),
    /// Comment `<!-- ... -->`
    Comment(String),
    /// Processing instruction `<?target body?>`
    PI {
        /// Instruction target
        target: String,
        /// Raw instruction body
        body: String,
    },
    /// Start of a `<!DOCTYPE ...>` declaration
    StartDoctype {
        /// Root element name
        name: String,
        /// `PUBLIC`/`SYSTEM` identifier, when present
        external_id: Option<ExternalId>,
    },
    /// End of a doctype declaration, immediately after its start
    EndDoctype,
}

/// A lexical token, the tokenizer's output. Names are still unresolved
/// [`LName`]s; the namespace resolver turns tokens into [`Event`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<?xml ... ?>` prolog with its pseudo-attributes
    Decl(Vec<RawAttribute>),
    /// Processing instruction with a target other than `xml`
    PI {
        /// Instruction target
        target: String,
        /// Raw instruction body
        body: String,
    },
    /// Begin tag, possibly self-closing
    Start {
        /// Lexical element name
        name: LName,
        /// All attributes in input order, `xmlns` declarations included
        attributes: Vec<RawAttribute>,
        /// Whether the tag ended in `/>`
        self_closing: bool,
    },
    /// End tag
    End {
        /// Lexical element name
        name: LName,
    },
    /// One content fragment; consecutive fragments stay separate tokens
    Text(Content),
    /// Comment text
    Comment(String),
    /// CDATA section text
    CData(String),
    /// Doctype declaration
    DocType {
        /// Root element name
        name: String,
        /// `PUBLIC`/`SYSTEM` identifier, when present
        external_id: Option<ExternalId>,
    },
}
