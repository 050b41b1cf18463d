//! Regex parser: converts a pattern string into a [`Regex`] tree.

use log::trace;

use crate::ast::{Element, Regex, Union};
use crate::charclass::CharClass;
use crate::error::{Error, Result};
use crate::quantifier::Quantifier;

/// Character cursor with a single token of pushback.
///
/// `putback` re-queues the last character handed out by `next`, so the next
/// call to `next` returns it again.
pub struct Cursor<'a> {
    chars: std::str::Chars<'a>,
    prev: Option<char>,
    held: Option<char>,
}

impl<'a> Cursor<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Cursor {
            chars: pattern.chars(),
            prev: None,
            held: None,
        }
    }

    pub fn next(&mut self) -> Option<char> {
        if let Some(ch) = self.held.take() {
            return Some(ch);
        }
        self.prev = self.chars.next();
        self.prev
    }

    pub fn putback(&mut self) {
        self.held = self.prev;
    }
}

/// Item collected while scanning a bracket expression.
enum BracketItem {
    Char(char),
    Range(char, char),
}

pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Parser {
            cursor: Cursor::new(pattern),
        }
    }

    /// Parse the full pattern.
    pub fn parse(mut self) -> Result<Regex> {
        let regex = self.parse_sequence(true)?;
        trace!("parsed pattern tree {}", regex);
        Ok(regex)
    }

    /// Parse elements until `)` (nested) or end of input (top level).
    fn parse_sequence(&mut self, top: bool) -> Result<Regex> {
        let mut regex = Regex::new();
        let mut closed = false;

        while let Some(ch) = self.cursor.next() {
            match ch {
                ')' => {
                    closed = true;
                    break;
                }
                '(' => {
                    let group = self.parse_sequence(false)?;
                    regex.elements.push(Element::Group(group));
                }
                '[' => {
                    let class = self.parse_bracket()?;
                    regex.elements.push(Element::Class(class));
                }
                '\\' => {
                    let class = self.parse_escape()?;
                    regex.elements.push(Element::Class(class));
                }
                '|' => {
                    let first = regex.clone();
                    let second = self.parse_sequence(top)?;
                    regex.elements.clear();
                    regex.elements.push(Element::Union(Union {
                        first,
                        second,
                        quantifier: Quantifier::One,
                    }));
                    if !top {
                        // The second branch consumed our closing ')'.
                        self.cursor.putback();
                    }
                }
                ch => match Quantifier::from_char(ch) {
                    Some(quantifier) => {
                        let last = regex
                            .elements
                            .last_mut()
                            .ok_or(Error::DanglingQuantifier(ch))?;
                        last.set_quantifier(quantifier);
                    }
                    None => regex.elements.push(Element::Class(CharClass::literal(ch))),
                },
            }
        }

        match (top, closed) {
            (true, true) => Err(Error::UnmatchedGroupClose),
            (false, false) => Err(Error::UnterminatedGroup),
            _ => Ok(regex),
        }
    }

    /// Parse an escape sequence; the `\` is already consumed.
    fn parse_escape(&mut self) -> Result<CharClass> {
        match self.cursor.next() {
            None => Err(Error::TrailingEscape),
            Some('w') => Ok(CharClass::new().with_alpha().with_numeric()),
            Some('d') => Ok(CharClass::new().with_numeric()),
            Some('s') => Ok(CharClass::new().with_whitespace()),
            Some(ch) => Ok(CharClass::literal(ch)),
        }
    }

    /// Parse a bracket expression; the `[` is already consumed.
    fn parse_bracket(&mut self) -> Result<CharClass> {
        let mut items = match self.cursor.next() {
            None => return Err(Error::UnterminatedBracket),
            Some(']') => return Err(Error::EmptyBracket),
            Some(ch) => vec![BracketItem::Char(ch)],
        };

        loop {
            match self.cursor.next() {
                None => return Err(Error::UnterminatedBracket),
                Some(']') => break,
                Some('-') => {
                    let start = match items.pop() {
                        Some(BracketItem::Char(start)) => start,
                        _ => return Err(Error::InvalidBracketRange),
                    };
                    let end = self.cursor.next().ok_or(Error::UnterminatedBracket)?;
                    items.push(BracketItem::Range(start, end));
                }
                Some(ch) => items.push(BracketItem::Char(ch)),
            }
        }

        let mut class = CharClass::new();
        for item in items {
            match item {
                BracketItem::Char(ch) => class.insert(ch),
                BracketItem::Range(start, end) => class.add_range(start, end)?,
            }
        }
        Ok(class)
    }
}
