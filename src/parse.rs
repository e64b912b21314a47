//! Pull-based parser combinators over the event stream.
//!
//! The combinators consume events from a [`Cursor`]. A combinator that
//! matches consumes a contiguous prefix of events and returns
//! `Ok(Some(..))`; one that does not match leaves the cursor where it
//! was and returns `Ok(None)`. A *not matched* outcome is never an
//! error: errors are reserved for malformed input and failed
//! expectations, and they are fatal. This is the contract that makes
//! [`choose`] deterministic.
//!
//! Before matching a tag the combinators transparently skip
//! whitespace-only text, comments, processing instructions and the
//! document/doctype framing events, so a parser written for `<root>`
//! works whether or not the document has a prolog.
//!
//! # Examples
//!
//! ```
//! use pull_xml::parse::{content, many, tag_name, tag_no_attr};
//! use pull_xml::EventReader;
//!
//! let xml = r#"<people>
//!     <person age="25">Michael</person>
//!     <person age="2">Eliezer</person>
//! </people>"#;
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
//! .unwrap()
//! .unwrap();
//! assert_eq!(
//!     people,
//!     vec![
//!         ("25".to_string(), "Michael".to_string()),
//!         ("2".to_string(), "Eliezer".to_string()),
//!     ]
//! );
//! ```

use crate::errors::{Error, Result};
use crate::events::attributes::AttrParser;
use crate::events::Event;
use crate::name::QName;

/// A pull cursor over an event sequence, with a single event of
/// lookahead.
///
/// `peek` makes the next event observable without consuming it; a
/// combinator that decides not to match simply leaves the peeked event
/// in place.
#[derive(Debug)]
pub struct Cursor<I> {
    events: I,
    peeked: Option<Event>,
}

impl<I: Iterator<Item = Result<Event>>> Cursor<I> {
    /// Creates a cursor over an event source, usually an
    /// [`EventReader`](crate::EventReader).
    pub fn new(events: I) -> Cursor<I> {
        Cursor {
            events,
            peeked: None,
        }
    }

    /// The next event, without consuming it. `Ok(None)` at end of input.
    pub fn peek(&mut self) -> Result<Option<&Event>> {
        if self.peeked.is_none() {
            self.peeked = match self.events.next() {
                None => None,
                Some(Ok(event)) => Some(event),
                Some(Err(e)) => return Err(e),
            };
        }
        Ok(self.peeked.as_ref())
    }

    /// Consumes and returns the next event.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        match self.peeked.take() {
            Some(event) => Ok(Some(event)),
            None => self.events.next().transpose(),
        }
    }
}

/// Events that carry no structure for a domain parser: whitespace-only
/// text, comments, processing instructions and the document/doctype
/// framing. `EndDocument` is left in place so that callers can observe
/// the end of input.
fn skip_ignorable<I: Iterator<Item = Result<Event>>>(cursor: &mut Cursor<I>) -> Result<()> {
    loop {
        match cursor.peek()? {
            Some(Event::Text(content)) if content.is_whitespace() => {}
            Some(Event::Comment(_))
            | Some(Event::PI { .. })
            | Some(Event::StartDocument(_))
            | Some(Event::StartDoctype { .. })
            | Some(Event::EndDoctype) => {}
            _ => return Ok(()),
        }
        cursor.next_event()?;
    }
}

/// Matches one element.
///
/// The `predicate` inspects the element name and either rejects (the
/// combinator does not match, nothing is consumed) or returns a witness
/// that is handed to the `attributes` closure together with an
/// [`AttrParser`] over the element's attribute list. After `attributes`
/// returns, any attribute it did not consume raises
/// [`Error::UnparsedAttributes`]. The `body` closure then parses the
/// element's children and must leave the cursor just before the end tag;
/// a close tag with a different name raises
/// [`Error::EndEventMismatch`].
pub fn tag<I, P, W, A, R, B, T>(
    cursor: &mut Cursor<I>,
    predicate: P,
    attributes: A,
    body: B,
) -> Result<Option<T>>
where
    I: Iterator<Item = Result<Event>>,
    P: FnOnce(&QName) -> Option<W>,
    A: FnOnce(W, &mut AttrParser) -> Result<R>,
    B: FnOnce(&mut Cursor<I>, R) -> Result<T>,
{
    skip_ignorable(cursor)?;
    let (name, attrs, witness) = match cursor.peek()? {
        Some(Event::Start {
            name,
            attributes: attrs,
        }) => match predicate(name) {
            Some(witness) => (name.clone(), attrs.clone(), witness),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };
    let mut parser = AttrParser::new(attrs);
    let attr_result = attributes(witness, &mut parser)?;
    parser.finish()?;
    cursor.next_event()?;
    let result = body(cursor, attr_result)?;
    skip_ignorable(cursor)?;
    match cursor.next_event()? {
        Some(Event::End { name: found }) if found == name => Ok(Some(result)),
        Some(Event::End { name: found }) => Err(Error::EndEventMismatch { found }),
        other => Err(Error::expected(format!("expected </{}>", name), other)),
    }
}

/// [`tag`] with the predicate "the element name equals `name`".
pub fn tag_name<I, N, A, R, B, T>(
    cursor: &mut Cursor<I>,
    name: N,
    attributes: A,
    body: B,
) -> Result<Option<T>>
where
    I: Iterator<Item = Result<Event>>,
    N: Into<QName>,
    A: FnOnce(&mut AttrParser) -> Result<R>,
    B: FnOnce(&mut Cursor<I>, R) -> Result<T>,
{
    let name = name.into();
    tag(
        cursor,
        |qname| (*qname == name).then_some(()),
        |(), parser| attributes(parser),
        body,
    )
}

/// [`tag_name`] for an element that must not have attributes.
pub fn tag_no_attr<I, N, B, T>(cursor: &mut Cursor<I>, name: N, body: B) -> Result<Option<T>>
where
    I: Iterator<Item = Result<Event>>,
    N: Into<QName>,
    B: FnOnce(&mut Cursor<I>) -> Result<T>,
{
    tag_name(cursor, name, |_| Ok(()), |cursor, ()| body(cursor))
}

/// Consumes consecutive content events and returns their concatenated
/// flattened text; the empty string when the next event is not content.
///
/// Unresolved entity fragments are rendered as `&name;`. CDATA sections
/// count as content.
pub fn content<I: Iterator<Item = Result<Event>>>(cursor: &mut Cursor<I>) -> Result<String> {
    let mut out = String::new();
    loop {
        match cursor.peek()? {
            Some(Event::Text(fragment)) => fragment.push_to(&mut out),
            Some(Event::CData(text)) => out.push_str(text),
            _ => return Ok(out),
        }
        cursor.next_event()?;
    }
}

/// As [`content`], but does not match at all when the next event is not
/// content.
pub fn content_maybe<I: Iterator<Item = Result<Event>>>(
    cursor: &mut Cursor<I>,
) -> Result<Option<String>> {
    match cursor.peek()? {
        Some(Event::Text(_)) | Some(Event::CData(_)) => content(cursor).map(Some),
        _ => Ok(None),
    }
}

/// Tries each parser in turn, returning the first match. Does not match
/// when no branch does; because a rejecting branch consumes nothing, the
/// cursor is then unchanged.
pub fn choose<I, T>(
    cursor: &mut Cursor<I>,
    branches: &mut [&mut dyn FnMut(&mut Cursor<I>) -> Result<Option<T>>],
) -> Result<Option<T>>
where
    I: Iterator<Item = Result<Event>>,
{
    for branch in branches {
        if let Some(result) = branch(cursor)? {
            return Ok(Some(result));
        }
    }
    Ok(None)
}

/// Applies `parser` repeatedly, collecting the matches, until it does
/// not match. Terminates because every match consumes at least one
/// event.
pub fn many<I, T, P>(cursor: &mut Cursor<I>, mut parser: P) -> Result<Vec<T>>
where
    I: Iterator<Item = Result<Event>>,
    P: FnMut(&mut Cursor<I>) -> Result<Option<T>>,
{
    let mut results = Vec::new();
    while let Some(result) = parser(cursor)? {
        results.push(result);
    }
    Ok(results)
}

/// Requires `parser` to match, raising a syntax error with `msg` when it
/// does not.
pub fn force<I, T, P>(msg: &str, cursor: &mut Cursor<I>, parser: P) -> Result<T>
where
    I: Iterator<Item = Result<Event>>,
    P: FnOnce(&mut Cursor<I>) -> Result<Option<T>>,
{
    parser(cursor)?.ok_or_else(|| Error::syntax(msg.to_string()))
}

/// Skips one node: an element with its entire subtree, or any other
/// single event. Does not match at the end of the enclosing element (an
/// `End` event, `EndDocument`, or end of input), consuming nothing.
pub fn ignore_elem<I: Iterator<Item = Result<Event>>>(cursor: &mut Cursor<I>) -> Result<Option<()>> {
    match cursor.peek()? {
        None | Some(Event::End { .. }) | Some(Event::EndDocument) => return Ok(None),
        Some(Event::Start { .. }) => {}
        Some(_) => {
            cursor.next_event()?;
            return Ok(Some(()));
        }
    }
    cursor.next_event()?;
    let mut depth = 1usize;
    while depth > 0 {
        match cursor.next_event()? {
            Some(Event::Start { .. }) => depth += 1,
            Some(Event::End { .. }) => depth -= 1,
            Some(_) => {}
            None => return Err(Error::syntax("unexpected end of input inside element")),
        }
    }
    Ok(Some(()))
}

/// Consumes every remaining sibling, leaving the cursor on the event
/// that closes the enclosing element.
pub fn ignore_siblings<I: Iterator<Item = Result<Event>>>(cursor: &mut Cursor<I>) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match cursor.peek()? {
            None | Some(Event::EndDocument) => return Ok(()),
            Some(Event::End { .. }) if depth == 0 => return Ok(()),
            Some(Event::End { .. }) => depth -= 1,
            Some(Event::Start { .. }) => depth += 1,
            Some(_) => {}
        }
        cursor.next_event()?;
    }
}

/// Tries `parser` against each successive sibling, skipping the ones it
/// rejects. Does not match when the siblings are exhausted first.
pub fn skip_till<I, T, P>(cursor: &mut Cursor<I>, mut parser: P) -> Result<Option<T>>
where
    I: Iterator<Item = Result<Event>>,
    P: FnMut(&mut Cursor<I>) -> Result<Option<T>>,
{
    loop {
        if let Some(result) = parser(cursor)? {
            return Ok(Some(result));
        }
        if ignore_elem(cursor)?.is_none() {
            return Ok(None);
        }
    }
}

/// Runs `parser`, then discards the remaining siblings.
pub fn skip_siblings<I, T, P>(cursor: &mut Cursor<I>, parser: P) -> Result<T>
where
    I: Iterator<Item = Result<Event>>,
    P: FnOnce(&mut Cursor<I>) -> Result<T>,
{
    let result = parser(cursor)?;
    ignore_siblings(cursor)?;
    Ok(result)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::EventReader;
    use pretty_assertions::assert_eq;

    fn cursor(xml: &str) -> Cursor<EventReader<crate::encoding::Decoded<std::str::Chars<'_>>>> {
        EventReader::from_str(xml).into_cursor()
    }

    #[test]
    fn tag_matches_and_consumes_end() {
        let mut c = cursor("<a><b/></a>");
        let matched = tag_no_attr(&mut c, "a", |c| {
            force("expected <b>", c, |c| tag_no_attr(c, "b", |_| Ok(())))
        })
        .unwrap();
        assert_eq!(matched, Some(()));
        assert_eq!(c.next_event().unwrap(), Some(Event::EndDocument));
    }

    #[test]
    fn tag_does_not_match_other_names() {
        let mut c = cursor("<a/>");
        assert_eq!(tag_no_attr(&mut c, "b", |_| Ok(())).unwrap(), None);
        // the <a> element is still there
        assert_eq!(tag_no_attr(&mut c, "a", |_| Ok(())).unwrap(), Some(()));
    }

    #[test]
    fn content_is_empty_when_absent() {
        let mut c = cursor("<a><b/></a>");
        tag_no_attr(&mut c, "a", |c| {
            assert_eq!(content(c)?, "");
            // the empty-content read must not have advanced past <b>
            assert_eq!(content_maybe(c)?, None);
            force("expected <b>", c, |c| tag_no_attr(c, "b", |_| Ok(())))
        })
        .unwrap()
        .unwrap();
    }

    #[test]
    fn choose_restores_nothing_on_total_rejection() {
        let mut c = cursor("<z/>");
        let mut a = |c: &mut Cursor<_>| tag_no_attr(c, "a", |_| Ok("a"));
        let mut b = |c: &mut Cursor<_>| tag_no_attr(c, "b", |_| Ok("b"));
        let chosen = choose(&mut c, &mut [&mut a, &mut b]).unwrap();
        assert_eq!(chosen, None);
        let mut z = |c: &mut Cursor<_>| tag_no_attr(c, "z", |_| Ok("z"));
        assert_eq!(choose(&mut c, &mut [&mut z]).unwrap(), Some("z"));
    }

    #[test]
    fn many_collects_until_rejection() {
        let mut c = cursor("<r><x/><x/><y/></r>");
        tag_no_attr(&mut c, "r", |c| {
            let xs = many(c, |c| tag_no_attr(c, "x", |_| Ok(())))?;
            assert_eq!(xs.len(), 2);
            force("expected <y>", c, |c| tag_no_attr(c, "y", |_| Ok(())))
        })
        .unwrap()
        .unwrap();
    }

    #[test]
    fn ignore_elem_skips_one_subtree() {
        let mut c = cursor("<r><skip><deep/></skip><keep/></r>");
        tag_no_attr(&mut c, "r", |c| {
            assert_eq!(ignore_elem(c)?, Some(()));
            force("expected <keep>", c, |c| tag_no_attr(c, "keep", |_| Ok(())))
        })
        .unwrap()
        .unwrap();
    }

    #[test]
    fn ignore_elem_does_not_match_at_end_of_siblings() {
        let mut c = cursor("<r/>");
        tag_no_attr(&mut c, "r", |c| {
            assert_eq!(ignore_elem(c)?, None);
            Ok(())
        })
        .unwrap()
        .unwrap();
    }

    #[test]
    fn skip_till_finds_later_sibling() {
        let mut c = cursor("<r>noise<a/><b/></r>");
        tag_no_attr(&mut c, "r", |c| {
            let found = skip_till(c, |c| tag_no_attr(c, "b", |_| Ok("b")))?;
            assert_eq!(found, Some("b"));
            Ok(())
        })
        .unwrap()
        .unwrap();
    }

    #[test]
    fn skip_siblings_discards_the_rest() {
        let mut c = cursor("<r><a/><b/><c/></r>");
        tag_no_attr(&mut c, "r", |c| {
            skip_siblings(c, |c| {
                force("expected <a>", c, |c| tag_no_attr(c, "a", |_| Ok(())))
            })
        })
        .unwrap()
        .unwrap();
        assert_eq!(c.next_event().unwrap(), Some(Event::EndDocument));
    }

    #[test]
    fn force_raises_with_message() {
        let mut c = cursor("<z/>");
        let err = force("wanted <a>", &mut c, |c| tag_no_attr(c, "a", |_| Ok(()))).unwrap_err();
        assert_eq!(err, Error::syntax("wanted <a>"));
    }

    #[test]
    fn mismatched_end_is_reported_by_the_reader() {
        let mut c = cursor("<a></b>");
        let err = tag_no_attr(&mut c, "a", |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::EndEventMismatch { .. }));
    }
}
