//! A module to handle `EventReader`

use std::collections::VecDeque;

use log::debug;

use crate::encoding::{Decoded, Decoder};
use crate::errors::{Error, Result};
use crate::events::{Content, Event, Token, XmlDecl};
use crate::name::LName;
use crate::namespace::NamespaceResolver;
use crate::parse::Cursor;
use crate::tokenizer::Tokenizer;

/// Where the reader is within the document framing.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DocState {
    /// `StartDocument` not yet emitted
    Fresh,
    /// between `StartDocument` and `EndDocument`
    Document,
    /// `EndDocument` emitted, or a fatal error occurred
    Done,
}

/// A streaming XML event reader with namespace resolution.
///
/// Consumes a character source and emits [`Event`]s one at a time. The
/// event sequence always begins with [`Event::StartDocument`] and, for
/// well-formed input, ends with [`Event::EndDocument`]. A self-closing
/// element is expanded into a `Start` immediately followed by an `End`.
///
/// # Examples
///
/// ```
/// use pull_xml::events::Event;
/// use pull_xml::EventReader;
///
/// let xml = r#"<tag1 att1 = "test">
///                 <tag2><!--Test comment-->Test</tag2>
///                 <tag2>Test 2</tag2>
///             </tag1>"#;
/// let mut count = 0;
/// let mut txt = Vec::new();
/// for event in EventReader::from_str(xml).trim_text(true) {
///     match event.unwrap() {
///         Event::Start { name, .. } if name.local == "tag2" => count += 1,
///         Event::Text(content) => {
///             let mut s = String::new();
///             content.push_to(&mut s);
///             txt.push(s);
///         }
///         _ => (),
///     }
/// }
/// assert_eq!(count, 2);
/// assert_eq!(txt, vec!["Test".to_string(), "Test 2".to_string()]);
/// ```
#[derive(Debug)]
pub struct EventReader<I> {
    tokens: Tokenizer<I>,
    resolver: NamespaceResolver,
    /// lexical names of the currently open elements, for `check_end_names`
    opened: Vec<LName>,
    /// events synthesized alongside the last token (self-closing end
    /// tags, doctype ends)
    queued: VecDeque<Event>,
    /// a token pulled while deciding how to start the document
    pending: Option<Option<Result<Token>>>,
    state: DocState,
    trim_text: bool,
    check_end_names: bool,
    reject_unresolved_entities: bool,
}

impl<I: Iterator<Item = Result<char>>> EventReader<I> {
    fn new(source: I) -> EventReader<I> {
        EventReader {
            tokens: Tokenizer::new(source),
            resolver: NamespaceResolver::default(),
            opened: Vec::new(),
            queued: VecDeque::new(),
            pending: None,
            state: DocState::Fresh,
            trim_text: false,
            check_end_names: true,
            reject_unresolved_entities: false,
        }
    }

    /// Changes the default `trim_text` behaviour (false per default)
    ///
    /// When set to true, whitespace-only `Text` events are not emitted.
    pub fn trim_text(mut self, val: bool) -> Self {
        self.trim_text = val;
        self
    }

    /// Changes the default `check_end_names` behaviour (true per default)
    ///
    /// When set to true, every end tag is checked against the last open
    /// begin tag and end of input is rejected while elements are open.
    /// If the xml is known to be sane (already processed etc ...) turning
    /// this off saves the bookkeeping.
    pub fn check_end_names(mut self, val: bool) -> Self {
        self.check_end_names = val;
        self
    }

    /// Changes the default `check_comments` behaviour (false per default)
    ///
    /// When set to true, every `Comment` event is checked for not
    /// containing `--`.
    pub fn check_comments(mut self, val: bool) -> Self {
        self.tokens.check_comments = val;
        self
    }

    /// Changes the default `reject_unresolved_entities` behaviour (false
    /// per default)
    ///
    /// When set to true, an entity reference other than the five
    /// predefined ones fails the parse with
    /// [`Error::UnresolvedEntity`] instead of being passed through as an
    /// [`Content::Entity`] fragment.
    pub fn reject_unresolved_entities(mut self, val: bool) -> Self {
        self.reject_unresolved_entities = val;
        self
    }

    /// Wraps this reader into a [`Cursor`] for the combinator layer.
    pub fn into_cursor(self) -> Cursor<Self> {
        Cursor::new(self)
    }

    fn next_token(&mut self) -> Option<Result<Token>> {
        match self.pending.take() {
            Some(token) => token,
            None => self.tokens.next(),
        }
    }

    /// Turns one token into at most one immediate event, queueing any
    /// synthesized companion events. `Ok(None)` means the token was
    /// consumed silently.
    fn process(&mut self, token: Token) -> Result<Option<Event>> {
        match token {
            // the prolog was handled during document start; repeats are dropped
            Token::Decl(_) => Ok(None),
            Token::PI { target, body } => Ok(Some(Event::PI { target, body })),
            Token::Comment(text) => Ok(Some(Event::Comment(text))),
            Token::CData(text) => Ok(Some(Event::CData(text))),
            Token::DocType { name, external_id } => {
                self.queued.push_back(Event::EndDoctype);
                Ok(Some(Event::StartDoctype { name, external_id }))
            }
            Token::Text(content) => {
                if self.reject_unresolved_entities {
                    if let Content::Entity(name) = &content {
                        return Err(Error::UnresolvedEntity(name.clone()));
                    }
                }
                if self.trim_text && content.is_whitespace() {
                    return Ok(None);
                }
                Ok(Some(Event::Text(content)))
            }
            Token::Start {
                name,
                attributes,
                self_closing,
            } => {
                if self.check_end_names && !self_closing {
                    self.opened.push(name.clone());
                }
                let (qname, attributes) = self.resolver.start_element(&name, attributes, self_closing);
                if self_closing {
                    self.queued.push_back(Event::End {
                        name: qname.clone(),
                    });
                }
                Ok(Some(Event::Start {
                    name: qname,
                    attributes,
                }))
            }
            Token::End { name } => {
                let qname = self.resolver.end_element(&name);
                if self.check_end_names && self.opened.pop().as_ref() != Some(&name) {
                    return Err(Error::EndEventMismatch { found: qname });
                }
                Ok(Some(Event::End { name: qname }))
            }
        }
    }
}

impl<I: Iterator<Item = Result<char>>> Iterator for EventReader<I> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Result<Event>> {
        if let Some(event) = self.queued.pop_front() {
            return Some(Ok(event));
        }
        loop {
            match self.state {
                DocState::Done => return None,
                DocState::Fresh => {
                    self.state = DocState::Document;
                    let decl = match self.tokens.next() {
                        Some(Ok(Token::Decl(attributes))) => XmlDecl::new(attributes),
                        other => {
                            self.pending = Some(other);
                            XmlDecl::default()
                        }
                    };
                    return Some(Ok(Event::StartDocument(decl)));
                }
                DocState::Document => match self.next_token() {
                    None => {
                        self.state = DocState::Done;
                        if self.check_end_names {
                            if let Some(open) = self.opened.last() {
                                return Some(Err(Error::syntax(format!(
                                    "unexpected end of input: element `{}` is not closed",
                                    open
                                ))));
                            }
                        }
                        return Some(Ok(Event::EndDocument));
                    }
                    Some(Err(e)) => {
                        self.state = DocState::Done;
                        return Some(Err(e));
                    }
                    Some(Ok(token)) => match self.process(token) {
                        Ok(Some(event)) => return Some(Ok(event)),
                        Ok(None) => continue,
                        Err(e) => {
                            self.state = DocState::Done;
                            return Some(Err(e));
                        }
                    },
                },
            }
        }
    }
}

impl<B: Iterator<Item = u8>> EventReader<Decoder<B>> {
    /// Creates a reader over a byte stream, auto-detecting the encoding
    /// from up to four leading bytes.
    pub fn from_bytes<T>(bytes: T) -> Self
    where
        T: IntoIterator<Item = u8, IntoIter = B>,
    {
        let decoder = Decoder::new(bytes.into_iter());
        debug!("detected {} encoding", decoder.encoding());
        EventReader::new(decoder)
    }
}

impl<C: Iterator<Item = char>> EventReader<Decoded<C>> {
    /// Creates a reader over an already decoded character stream,
    /// skipping encoding detection.
    pub fn from_chars<T>(chars: T) -> Self
    where
        T: IntoIterator<Item = char, IntoIter = C>,
    {
        EventReader::new(Decoded(chars.into_iter()))
    }
}

impl<'a> EventReader<Decoded<std::str::Chars<'a>>> {
    /// Creates a reader over a string slice.
    pub fn from_str(s: &'a str) -> Self {
        EventReader::from_chars(s.chars())
    }
}
