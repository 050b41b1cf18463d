//! Errors raised while parsing a pattern or building its automata.

use thiserror::Error;

use crate::state::StateId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Malformed character class.
    #[error("cannot add empty string to character class")]
    EmptyChar,
    #[error("expected a single character, got {0:?}")]
    MultiChar(String),
    #[error("invalid character range {start:?}-{end:?}: start must be less than end")]
    InvalidRange { start: char, end: char },
    #[error("empty bracket expression")]
    EmptyBracket,
    #[error("unterminated bracket expression")]
    UnterminatedBracket,
    #[error("invalid character range in bracket expression")]
    InvalidBracketRange,

    // Malformed pattern structure.
    #[error("unterminated group")]
    UnterminatedGroup,
    #[error("unmatched ')' in pattern")]
    UnmatchedGroupClose,
    #[error("escape character at end of expression")]
    TrailingEscape,
    #[error("quantifier '{0}' does not follow an element")]
    DanglingQuantifier(char),

    // Invariant violations.
    #[error("state {state} already has a transition on {class}")]
    DuplicateTransition { state: StateId, class: String },
    #[error("cannot make a character class with characters a wildcard")]
    WildcardNotEmpty,
    #[error("element construction did not advance past state {state}")]
    StalledConstruction { state: StateId },
    #[error("no state with id {0}")]
    UnknownState(StateId),
}
