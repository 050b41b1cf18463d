//! Pattern tree produced by the parser.

use std::fmt;
use std::str::FromStr;

use crate::charclass::CharClass;
use crate::error::Error;
use crate::parser::Parser;
use crate::quantifier::Quantifier;

/// A sequence of elements with a quantifier covering the whole sequence.
///
/// The top-level pattern and every parenthesized group are a `Regex`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regex {
    pub(crate) elements: Vec<Element>,
    pub(crate) quantifier: Quantifier,
}

/// One entry of a [`Regex`] sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Parenthesized sub-pattern.
    Group(Regex),
    /// Literal, bracket expression or escape.
    Class(CharClass),
    /// Alternation between everything before a `|` and everything after it.
    Union(Union),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub first: Regex,
    pub second: Regex,
    pub quantifier: Quantifier,
}

impl Regex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a top-level pattern.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        Parser::new(pattern).parse()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    pub fn set_quantifier(&mut self, quantifier: Quantifier) {
        self.quantifier = quantifier;
    }
}

impl FromStr for Regex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Regex::parse(s)
    }
}

impl Element {
    pub fn quantifier(&self) -> Quantifier {
        match self {
            Element::Group(regex) => regex.quantifier,
            Element::Class(class) => class.quantifier(),
            Element::Union(union) => union.quantifier,
        }
    }

    /// Applies to the element as a whole, whatever its kind.
    pub fn set_quantifier(&mut self, quantifier: Quantifier) {
        match self {
            Element::Group(regex) => regex.set_quantifier(quantifier),
            Element::Class(class) => class.set_quantifier(quantifier),
            Element::Union(union) => union.quantifier = quantifier,
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        write!(f, "){}", self.quantifier)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Group(regex) => fmt::Display::fmt(regex, f),
            Element::Class(class) => fmt::Display::fmt(class, f),
            Element::Union(union) => fmt::Display::fmt(union, f),
        }
    }
}

impl fmt::Display for Union {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}{}", self.first, self.second, self.quantifier)
    }
}
