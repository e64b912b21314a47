//! Character-level XML tokenizer.
//!
//! A recursive-descent parser from a character stream to a lazy sequence
//! of lexical [`Token`]s. The tokenizer is strictly pull-based: it
//! consumes one character at a time with a single character of lookahead
//! and emits one token per [`Iterator::next`] call.

use crate::errors::{Error, Result};
use crate::events::attributes::RawAttribute;
use crate::events::{Content, ExternalId, Token};
use crate::name::LName;

/// Whitespace as defined by [the XML specification](https://www.w3.org/TR/xml11/#sec-common-syn).
#[inline]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Characters that may appear in an identifier: everything except the
/// XML delimiters and whitespace.
#[inline]
const fn is_name_char(c: char) -> bool {
    !matches!(c, '&' | '<' | '>' | ':' | '?' | '=' | '"' | '\'' | '/') && !is_whitespace(c)
}

/// A streaming tokenizer over a fallible character source.
///
/// The source is usually a [`Decoder`](crate::encoding::Decoder) or
/// [`Decoded`](crate::encoding::Decoded) iterator. After the first error
/// the tokenizer is exhausted: errors are fatal to the pipeline.
#[derive(Debug)]
pub struct Tokenizer<I> {
    source: I,
    peeked: Option<char>,
    done: bool,
    /// reject `--` inside comments
    pub(crate) check_comments: bool,
}

impl<I: Iterator<Item = Result<char>>> Tokenizer<I> {
    /// Creates a tokenizer over a character source.
    pub fn new(source: I) -> Tokenizer<I> {
        Tokenizer {
            source,
            peeked: None,
            done: false,
            check_comments: false,
        }
    }

    fn peek(&mut self) -> Result<Option<char>> {
        if self.peeked.is_none() {
            self.peeked = match self.source.next() {
                None => None,
                Some(Ok(c)) => Some(c),
                Some(Err(e)) => return Err(e),
            };
        }
        Ok(self.peeked)
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        match self.peeked.take() {
            Some(c) => Ok(Some(c)),
            None => self.source.next().transpose(),
        }
    }

    fn next_char_in(&mut self, context: &str) -> Result<char> {
        self.next_char()?
            .ok_or_else(|| Error::syntax(format!("unexpected end of input in {}", context)))
    }

    /// Discards the character returned by the last successful `peek`.
    #[inline]
    fn advance(&mut self) {
        self.peeked = None;
    }

    fn expect(&mut self, expected: char, context: &str) -> Result<()> {
        match self.next_char_in(context)? {
            c if c == expected => Ok(()),
            c => Err(Error::syntax(format!(
                "expected `{}` in {}, found `{}`",
                expected, context, c
            ))),
        }
    }

    fn expect_literal(&mut self, literal: &str, context: &str) -> Result<()> {
        for expected in literal.chars() {
            self.expect(expected, context)?;
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek()? {
            if !is_whitespace(c) {
                break;
            }
            self.advance();
        }
        Ok(())
    }

    /// Consumes an optional trailing newline (`\r\n` or `\n`).
    fn skip_newline(&mut self) -> Result<()> {
        if self.peek()? == Some('\r') {
            self.advance();
        }
        if self.peek()? == Some('\n') {
            self.advance();
        }
        Ok(())
    }

    /// Consumes characters until `terminator` was seen; the terminator
    /// itself is consumed but not part of the returned text.
    fn read_until(&mut self, terminator: &str, context: &str) -> Result<String> {
        let mut out = String::new();
        loop {
            out.push(self.next_char_in(context)?);
            if out.ends_with(terminator) {
                out.truncate(out.len() - terminator.len());
                return Ok(out);
            }
        }
    }

    /// One or more identifier characters.
    fn read_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek()? {
            if !is_name_char(c) {
                break;
            }
            ident.push(c);
            self.advance();
        }
        if ident.is_empty() {
            Err(Error::syntax(match self.peek()? {
                Some(c) => format!("expected identifier, found `{}`", c),
                None => "expected identifier, found end of input".to_string(),
            }))
        } else {
            Ok(ident)
        }
    }

    /// An identifier, optionally followed by `:` and a second identifier.
    fn read_lname(&mut self) -> Result<LName> {
        let first = self.read_ident()?;
        if self.peek()? == Some(':') {
            self.advance();
            let local = self.read_ident()?;
            Ok(LName::prefixed(first, local))
        } else {
            Ok(LName::local(first))
        }
    }

    /// A `&...;` reference. Numeric character references and the five
    /// predefined entities become literal fragments; anything else stays
    /// an unresolved entity fragment.
    fn read_reference(&mut self) -> Result<Content> {
        if self.peek()? == Some('#') {
            self.advance();
            let radix = if self.peek()? == Some('x') {
                self.advance();
                16
            } else {
                10
            };
            let mut digits = String::new();
            loop {
                match self.next_char_in("character reference")? {
                    ';' => break,
                    c => digits.push(c),
                }
            }
            let code = u32::from_str_radix(&digits, radix)
                .map_err(|_| Error::syntax(format!("invalid character reference `{}`", digits)))?;
            return match char::from_u32(code) {
                Some(c) => Ok(Content::Text(c.to_string())),
                None => Err(Error::syntax(format!(
                    "character reference out of range: {:#x}",
                    code
                ))),
            };
        }
        let mut name = String::new();
        loop {
            match self.next_char_in("entity")? {
                ';' => break,
                c if c == '&' || c == '<' || is_whitespace(c) => {
                    return Err(Error::syntax("entity not terminated by `;`"))
                }
                c => name.push(c),
            }
        }
        match name.as_str() {
            "amp" => Ok(Content::Text("&".to_string())),
            "lt" => Ok(Content::Text("<".to_string())),
            "gt" => Ok(Content::Text(">".to_string())),
            "apos" => Ok(Content::Text("'".to_string())),
            "quot" => Ok(Content::Text("\"".to_string())),
            "" => Err(Error::syntax("empty entity reference")),
            _ => Ok(Content::Entity(name)),
        }
    }

    /// One content fragment. The active quote characters terminate a
    /// literal run only inside attribute values; in element content both
    /// flags are off and quotes are ordinary characters.
    fn read_fragment(&mut self, break_dquote: bool, break_squote: bool) -> Result<Content> {
        if self.peek()? == Some('&') {
            self.advance();
            return self.read_reference();
        }
        let mut run = String::new();
        while let Some(c) = self.peek()? {
            let breaks = c == '&'
                || c == '<'
                || (break_dquote && c == '"')
                || (break_squote && c == '\'');
            if breaks {
                break;
            }
            run.push(c);
            self.advance();
        }
        if run.is_empty() {
            // only reachable inside an attribute value, on a `<`
            Err(Error::syntax("unexpected `<` in attribute value"))
        } else {
            Ok(Content::Text(run))
        }
    }

    /// `name = "value"` with either quote character; the value is a
    /// fragment list terminated by the opening quote.
    fn read_attribute(&mut self) -> Result<RawAttribute> {
        let name = self.read_lname()?;
        self.skip_whitespace()?;
        self.expect('=', "attribute")?;
        self.skip_whitespace()?;
        let quote = match self.next_char_in("attribute value")? {
            q @ ('"' | '\'') => q,
            c => {
                return Err(Error::syntax(format!(
                    "attribute value must be quoted, found `{}`",
                    c
                )))
            }
        };
        let mut value = Vec::new();
        loop {
            match self.peek()? {
                None => return Err(Error::syntax("unexpected end of input in attribute value")),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(_) => value.push(self.read_fragment(quote == '"', quote == '\'')?),
            }
        }
        Ok(RawAttribute { name, value })
    }

    /// Zero or more attributes, stopping at the first non-name character.
    fn read_attributes(&mut self) -> Result<Vec<RawAttribute>> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace()?;
            match self.peek()? {
                Some(c) if is_name_char(c) => attributes.push(self.read_attribute()?),
                _ => break,
            }
        }
        Ok(attributes)
    }

    /// `<?xml ...?>` prolog or a processing instruction.
    fn read_pi_or_decl(&mut self) -> Result<Token> {
        let target = self.read_ident()?;
        if target == "xml" {
            let attributes = self.read_attributes()?;
            self.skip_whitespace()?;
            self.expect_literal("?>", "xml declaration")?;
            self.skip_newline()?;
            Ok(Token::Decl(attributes))
        } else {
            self.skip_whitespace()?;
            let body = self.read_until("?>", "processing instruction")?;
            Ok(Token::PI { target, body })
        }
    }

    /// `<!--`, `<![CDATA[` or `<!DOCTYPE`.
    fn read_bang(&mut self) -> Result<Token> {
        match self.peek()? {
            Some('-') => {
                self.expect_literal("--", "comment")?;
                let text = self.read_until("-->", "comment")?;
                if self.check_comments && text.contains("--") {
                    return Err(Error::syntax("comment contains `--`"));
                }
                Ok(Token::Comment(text))
            }
            Some('[') => {
                self.expect_literal("[CDATA[", "CDATA section")?;
                let text = self.read_until("]]>", "CDATA section")?;
                Ok(Token::CData(text))
            }
            _ => {
                self.expect_literal("DOCTYPE", "markup declaration")?;
                self.read_doctype()
            }
        }
    }

    /// Doctype body: root name, optional external ID, optional internal
    /// subset. The subset is scanned raw until the first `]`, without
    /// bracket nesting.
    fn read_doctype(&mut self) -> Result<Token> {
        self.skip_whitespace()?;
        let name = self.read_ident()?;
        self.skip_whitespace()?;
        let external_id = match self.peek()? {
            Some(c) if is_name_char(c) => {
                let kind = self.read_ident()?;
                match kind.as_str() {
                    "PUBLIC" => {
                        self.skip_whitespace()?;
                        let public = self.read_quoted_literal("public id")?;
                        self.skip_whitespace()?;
                        let system = self.read_quoted_literal("system id")?;
                        Some(ExternalId::Public(public, system))
                    }
                    "SYSTEM" => {
                        self.skip_whitespace()?;
                        Some(ExternalId::System(self.read_quoted_literal("system id")?))
                    }
                    other => {
                        return Err(Error::syntax(format!(
                            "expected PUBLIC or SYSTEM in doctype, found `{}`",
                            other
                        )))
                    }
                }
            }
            _ => None,
        };
        self.skip_whitespace()?;
        if self.peek()? == Some('[') {
            self.advance();
            loop {
                if self.next_char_in("doctype internal subset")? == ']' {
                    break;
                }
            }
            self.skip_whitespace()?;
        }
        self.expect('>', "doctype")?;
        self.skip_newline()?;
        Ok(Token::DocType { name, external_id })
    }

    /// A quoted string with no entity processing, as used by external IDs.
    fn read_quoted_literal(&mut self, context: &str) -> Result<String> {
        let quote = match self.next_char_in(context)? {
            q @ ('"' | '\'') => q,
            c => {
                return Err(Error::syntax(format!(
                    "expected quoted {}, found `{}`",
                    context, c
                )))
            }
        };
        let mut out = String::new();
        loop {
            match self.next_char_in(context)? {
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }

    /// `</name >`
    fn read_element_end(&mut self) -> Result<Token> {
        self.skip_whitespace()?;
        let name = self.read_lname()?;
        self.skip_whitespace()?;
        self.expect('>', "end tag")?;
        Ok(Token::End { name })
    }

    /// `<name attr="..." >` or `<name ... />`
    fn read_element_start(&mut self) -> Result<Token> {
        self.skip_whitespace()?;
        let name = self.read_lname()?;
        let attributes = self.read_attributes()?;
        self.skip_whitespace()?;
        let self_closing = if self.peek()? == Some('/') {
            self.advance();
            true
        } else {
            false
        };
        self.expect('>', "begin tag")?;
        Ok(Token::Start {
            name,
            attributes,
            self_closing,
        })
    }

    /// Anything starting with `<`.
    fn read_markup(&mut self) -> Result<Token> {
        match self.peek()? {
            Some('?') => {
                self.advance();
                self.read_pi_or_decl()
            }
            Some('!') => {
                self.advance();
                self.read_bang()
            }
            Some('/') => {
                self.advance();
                self.read_element_end()
            }
            _ => self.read_element_start(),
        }
    }

    fn read_token(&mut self) -> Result<Option<Token>> {
        match self.peek()? {
            None => Ok(None),
            Some('<') => {
                self.advance();
                self.read_markup().map(Some)
            }
            Some(_) => Ok(Some(Token::Text(self.read_fragment(false, false)?))),
        }
    }
}

impl<I: Iterator<Item = Result<char>>> Iterator for Tokenizer<I> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Result<Token>> {
        if self.done {
            return None;
        }
        match self.read_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
