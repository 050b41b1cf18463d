//! Character classes: the transition labels of both automata.
//!
//! A class is a sorted, deduplicated set of characters (or a wildcard) plus the
//! quantifier the parser attached to it. Equality and hashing cover all three
//! parts, so two classes built in different orders compare equal and can key
//! the same transition.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::quantifier::Quantifier;

const WILDCARD: char = '.';

/// Characters that need a `\` to be read back as literals outside brackets.
const METACHARS: &[char] = &['(', ')', '[', ']', '|', '\\', '?', '*', '+', '-'];

/// One entry of [`CharClass::group_chars`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharGroup {
    Single(char),
    /// Inclusive run of consecutive code points.
    Run(char, char),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CharClass {
    chars: BTreeSet<char>,
    quantifier: Quantifier,
    wildcard: bool,
}

impl CharClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class holding exactly `ch`.
    pub fn literal(ch: char) -> Self {
        let mut class = Self::new();
        class.insert(ch);
        class
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Whether the two classes share at least one character.
    pub fn overlaps(&self, other: &CharClass) -> bool {
        !self.chars.is_disjoint(&other.chars)
    }

    pub(crate) fn insert(&mut self, ch: char) {
        self.chars.insert(ch);
    }

    /// Add the single character held by `s`.
    pub fn add_char(&mut self, s: &str) -> Result<()> {
        let mut it = s.chars();
        match (it.next(), it.next()) {
            (None, _) => Err(Error::EmptyChar),
            (Some(ch), None) => {
                self.insert(ch);
                Ok(())
            }
            (Some(_), Some(_)) => Err(Error::MultiChar(s.to_string())),
        }
    }

    /// Add every character from `start` to `end` inclusive. `start` must be
    /// strictly below `end`.
    pub fn add_range(&mut self, start: char, end: char) -> Result<()> {
        if start >= end {
            return Err(Error::InvalidRange { start, end });
        }
        self.chars.extend(start..=end);
        Ok(())
    }

    /// `A-Z`, `_` and `a-z`.
    pub fn add_alpha(&mut self) {
        self.chars.extend('A'..='Z');
        self.insert('_');
        self.chars.extend('a'..='z');
    }

    pub fn add_numeric(&mut self) {
        self.chars.extend('0'..='9');
    }

    pub fn add_whitespace(&mut self) {
        self.insert(' ');
    }

    pub fn set_quantifier(&mut self, quantifier: Quantifier) {
        self.quantifier = quantifier;
    }

    pub fn set_wildcard(&mut self) -> Result<()> {
        if !self.chars.is_empty() {
            return Err(Error::WildcardNotEmpty);
        }
        self.wildcard = true;
        Ok(())
    }

    pub fn with_char(mut self, s: &str) -> Result<Self> {
        self.add_char(s)?;
        Ok(self)
    }

    pub fn with_range(mut self, start: char, end: char) -> Result<Self> {
        self.add_range(start, end)?;
        Ok(self)
    }

    pub fn with_alpha(mut self) -> Self {
        self.add_alpha();
        self
    }

    pub fn with_numeric(mut self) -> Self {
        self.add_numeric();
        self
    }

    pub fn with_whitespace(mut self) -> Self {
        self.add_whitespace();
        self
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.set_quantifier(quantifier);
        self
    }

    pub fn with_wildcard(mut self) -> Result<Self> {
        self.set_wildcard()?;
        Ok(self)
    }

    /// Compress the sorted characters into runs of consecutive code points.
    ///
    /// A run grows while the next character is exactly one past its end, so
    /// `a b c e` groups as `[Run(a, c), Single(e)]`.
    pub fn group_chars(&self) -> Vec<CharGroup> {
        let mut groups = Vec::new();
        let mut it = self.chars.iter().copied().peekable();
        while let Some(start) = it.next() {
            let mut end = start;
            while let Some(&next) = it.peek() {
                if next as u32 != end as u32 + 1 {
                    break;
                }
                end = next;
                it.next();
            }
            if start == end {
                groups.push(CharGroup::Single(start));
            } else {
                groups.push(CharGroup::Run(start, end));
            }
        }
        groups
    }

    /// Remove every character that also appears in one of `others`.
    pub fn strip<'a, I>(&mut self, others: I)
    where
        I: IntoIterator<Item = &'a CharClass>,
    {
        for other in others {
            self.chars.retain(|ch| !other.chars.contains(ch));
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            return write!(f, "[[{}]]", WILDCARD);
        }

        let groups = self.group_chars();
        let bracket = groups.len() != 1 || matches!(groups[0], CharGroup::Run(..));
        if bracket {
            f.write_str("[")?;
        }
        for group in &groups {
            match group {
                CharGroup::Single(ch) if !bracket && METACHARS.contains(ch) => {
                    write!(f, "\\{}", ch)?
                }
                CharGroup::Single(ch) => write!(f, "{}", ch)?,
                CharGroup::Run(start, end) => write!(f, "{}-{}", start, end)?,
            }
        }
        if bracket {
            f.write_str("]")?;
        }
        write!(f, "{}", self.quantifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(class: &CharClass) -> u64 {
        let mut hasher = DefaultHasher::new();
        class.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn contiguous_runs_compress_and_gaps_split() {
        let class = CharClass::new()
            .with_char("a")
            .and_then(|c| c.with_char("b"))
            .and_then(|c| c.with_char("c"))
            .and_then(|c| c.with_char("e"))
            .unwrap();
        assert_eq!(
            class.group_chars(),
            vec![CharGroup::Run('a', 'c'), CharGroup::Single('e')]
        );

        for base in ['0', 'A', 'p'] {
            let c1 = base as u32;
            let mut class = CharClass::new();
            for cp in [c1, c1 + 1, c1 + 2, c1 + 4] {
                class.insert(char::from_u32(cp).unwrap());
            }
            let c3 = char::from_u32(c1 + 2).unwrap();
            let c5 = char::from_u32(c1 + 4).unwrap();
            assert_eq!(
                class.group_chars(),
                vec![CharGroup::Run(base, c3), CharGroup::Single(c5)]
            );
        }
    }

    #[test]
    fn add_char_rejects_empty_and_multi() {
        let mut class = CharClass::new();
        assert_eq!(class.add_char(""), Err(Error::EmptyChar));
        assert_eq!(class.add_char("ab"), Err(Error::MultiChar("ab".into())));
        assert!(class.is_empty());
        class.add_char("é").unwrap();
        assert!(class.contains('é'));
    }

    #[test]
    fn range_requires_strict_order() {
        let mut class = CharClass::new();
        assert!(matches!(
            class.add_range('a', 'a'),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            class.add_range('z', 'a'),
            Err(Error::InvalidRange { .. })
        ));
        class.add_range('a', 'c').unwrap();
        assert_eq!(class.chars().collect::<String>(), "abc");
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let forward = CharClass::new()
            .with_range('a', 'd')
            .unwrap()
            .with_quantifier(Quantifier::OneOrMore);
        let mut backward = CharClass::new();
        for ch in ['d', 'c', 'b', 'a', 'b'] {
            backward.insert(ch);
        }
        backward.set_quantifier(Quantifier::OneOrMore);

        assert_eq!(forward, backward);
        assert_eq!(hash_of(&forward), hash_of(&backward));

        backward.set_quantifier(Quantifier::ZeroOrMore);
        assert_ne!(forward, backward);
    }

    #[test]
    fn wildcard_requires_empty_class() {
        assert_eq!(
            CharClass::literal('a').set_wildcard(),
            Err(Error::WildcardNotEmpty)
        );
        let wildcard = CharClass::new().with_wildcard().unwrap();
        assert!(wildcard.is_wildcard());
        assert_ne!(wildcard, CharClass::new());
        assert_eq!(wildcard.to_string(), "[[.]]");
    }

    #[test]
    fn shorthand_adders() {
        let word = CharClass::new().with_alpha().with_numeric();
        assert_eq!(word.len(), 26 + 26 + 1 + 10);
        assert_eq!(word.to_string(), "[0-9A-Z_a-z]");
        assert_eq!(CharClass::new().with_whitespace().to_string(), " ");
    }

    #[test]
    fn strip_removes_claimed_chars() {
        let mut class = CharClass::new().with_range('a', 'f').unwrap();
        let taken = [
            CharClass::literal('b'),
            CharClass::new().with_range('d', 'e').unwrap(),
        ];
        class.strip(&taken);
        assert_eq!(class.chars().collect::<String>(), "acf");
        assert!(!taken.iter().any(|other| class.overlaps(other)));
    }

    #[test]
    fn display_brackets_only_when_needed() {
        assert_eq!(CharClass::literal('x').to_string(), "x");
        assert_eq!(
            CharClass::literal('x')
                .with_quantifier(Quantifier::ZeroOrMore)
                .to_string(),
            "x*"
        );
        assert_eq!(
            CharClass::new().with_range('a', 'b').unwrap().to_string(),
            "[a-b]"
        );
        assert_eq!(
            CharClass::literal('a')
                .with_char("z")
                .unwrap()
                .with_quantifier(Quantifier::ZeroOrOne)
                .to_string(),
            "[az]?"
        );
    }

    #[test]
    fn display_escapes_lone_metachars() {
        assert_eq!(CharClass::literal('(').to_string(), "\\(");
        assert_eq!(CharClass::literal('\\').to_string(), "\\\\");
        assert_eq!(
            CharClass::literal('+')
                .with_quantifier(Quantifier::ZeroOrMore)
                .to_string(),
            "\\+*"
        );
        assert_eq!(CharClass::literal('.').to_string(), ".");
        // Inside brackets only `]` and `-` are special to the parser.
        let mixed = CharClass::literal('(').with_char("a").unwrap();
        assert_eq!(mixed.to_string(), "[(a]");
    }
}
