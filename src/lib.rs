//! Streaming pull parser for XML.
//!
//! The crate is a linear composition of pull-based stream transducers:
//! bytes are decoded to characters (with encoding auto-detection across
//! the five common UTF variants), characters are tokenized, tokens are
//! rewritten into namespace-resolved events, and a small combinator
//! layer lets callers assemble domain parsers over the event sequence
//! without materializing a DOM.
//!
//! ## Reader
//!
//! [`EventReader`] streams [`Event`](events::Event)s out of a byte or
//! character source:
//!
//! ```rust
//! use pull_xml::events::Event;
//! use pull_xml::{parse_str, QName};
//!
//! let xml = r#"<a xmlns="u"><b/></a>"#;
//! let names: Vec<QName> = parse_str(xml)
//!     .filter_map(|event| match event.unwrap() {
//!         Event::Start { name, .. } => Some(name),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(
//!     names,
//!     vec![
//!         QName::with_namespace("a", "u"),
//!         QName::with_namespace("b", "u"),
//!     ]
//! );
//! ```
//!
//! ## Combinators
//!
//! The [`parse`] module turns the event stream into domain values
//! without an intermediate tree:
//!
//! ```rust
//! use pull_xml::parse::{content, many, tag_name, tag_no_attr};
//! use pull_xml::EventReader;
//!
//! let xml = r#"<people><person age="25">Michael</person></people>"#;
//! let mut cursor = EventReader::from_str(xml).into_cursor();
//! let people = tag_no_attr(&mut cursor, "people", |cursor| {
//!     many(cursor, |cursor| {
//!         tag_name(
//!             cursor,
//!             "person",
//!             |attrs| attrs.require("age"),
//!             |cursor, age| Ok((age, content(cursor)?)),
//!         )
//!     })
//! })
//! .unwrap();
//! assert_eq!(
//!     people,
//!     Some(vec![("25".to_string(), "Michael".to_string())])
//! );
//! ```

#![deny(missing_docs)]

pub mod encoding;
pub mod errors;
pub mod events;
pub mod name;
pub mod namespace;
pub mod parse;
pub mod reader;
pub mod tokenizer;

use crate::encoding::{Decoded, Decoder};

pub use crate::errors::{Error, Result};
pub use crate::name::{LName, QName, XML_NAMESPACE};
pub use crate::reader::EventReader;

/// Parses a byte stream into events, auto-detecting the encoding.
///
/// Equivalent to [`EventReader::from_bytes`].
pub fn parse_bytes<T>(bytes: T) -> EventReader<Decoder<T::IntoIter>>
where
    T: IntoIterator<Item = u8>,
{
    EventReader::from_bytes(bytes)
}

/// Parses an already decoded character stream into events, skipping
/// encoding detection.
///
/// Equivalent to [`EventReader::from_chars`].
pub fn parse_chars<T>(chars: T) -> EventReader<Decoded<T::IntoIter>>
where
    T: IntoIterator<Item = char>,
{
    EventReader::from_chars(chars)
}

/// Parses a string slice into events.
///
/// Equivalent to [`EventReader::from_str`].
pub fn parse_str(s: &str) -> EventReader<Decoded<std::str::Chars<'_>>> {
    EventReader::from_str(s)
}
