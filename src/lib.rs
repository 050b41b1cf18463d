//! Compile regular-expression patterns into automata.
//!
//! ```text
//! pattern --Parser--> Regex --Thompson--> Nfa --subset construction--> Dfa
//! ```

pub mod ast;
pub mod charclass;
pub mod dfa;
pub mod error;
pub mod nfa;
pub mod parser;
pub mod quantifier;
pub mod state;

pub use ast::{Element, Regex, Union};
pub use charclass::{CharClass, CharGroup};
pub use dfa::{Dfa, DfaState, Origins};
pub use error::{Error, Result};
pub use nfa::{Epsilons, Nfa, NfaState};
pub use parser::{Cursor, Parser};
pub use quantifier::Quantifier;
pub use state::{State, StateData, StateId, StateMachine, Transitions};
