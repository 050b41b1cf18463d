//! States and state machines shared by the NFA and DFA builders.
//!
//! A [`StateMachine`] owns every state in a `Vec` indexed by [`StateId`] and
//! keeps a cursor naming the state that construction currently extends from.
//! The per-automaton payload of a state (epsilon edges, origin sets) lives in
//! its [`StateData`] parameter.

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use log::trace;

use crate::charclass::CharClass;
use crate::error::{Error, Result};

pub type StateId = usize;

/// Outgoing labeled transitions, in insertion order.
pub type Transitions = IndexMap<CharClass, StateId>;

/// Payload carried by each state of a particular kind of machine.
pub trait StateData: Default {
    /// Name printed at the start of each rendered state.
    const KIND: &'static str;

    fn fmt_data(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct State<E> {
    id: StateId,
    transitions: Transitions,
    is_final: bool,
    pub(crate) data: E,
}

impl<E: StateData> State<E> {
    fn new(id: StateId) -> Self {
        State {
            id,
            transitions: Transitions::new(),
            is_final: false,
            data: E::default(),
        }
    }
}

impl<E> State<E> {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// Prepare `class` for attachment to this state.
    ///
    /// Every character already covered by an existing transition is stripped,
    /// so no two keys of one state ever share a character. Returns `None` when
    /// nothing is left; a remainder equal to an existing key is an error.
    pub fn admit(&self, mut class: CharClass) -> Result<Option<CharClass>> {
        class.strip(self.transitions.keys());
        if class.is_empty() && !class.is_wildcard() {
            return Ok(None);
        }
        if self.transitions.contains_key(&class) {
            return Err(Error::DuplicateTransition {
                state: self.id,
                class: class.to_string(),
            });
        }
        Ok(Some(class))
    }

    /// Attach a transition on `class` to `target`. Returns whether anything
    /// was attached; see [`State::admit`].
    pub fn add_transition(&mut self, class: CharClass, target: StateId) -> Result<bool> {
        match self.admit(class)? {
            Some(class) => {
                trace!("state {}: {} -> {}", self.id, class, target);
                self.transitions.insert(class, target);
                Ok(true)
            }
            None => {
                trace!("state {}: transition to {} fully covered, dropped", self.id, target);
                Ok(false)
            }
        }
    }

    pub fn add_self_transition(&mut self, class: CharClass) -> Result<bool> {
        self.add_transition(class, self.id)
    }
}

impl<E: StateData> fmt::Display for State<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (", E::KIND, self.id)?;
        if !self.transitions.is_empty() {
            f.write_str(" Transitions:")?;
            for (class, target) in &self.transitions {
                write!(f, " {}->{}", class, target)?;
            }
        }
        self.data.fmt_data(f)?;
        if self.is_final {
            f.write_str(" Final")?;
        }
        f.write_str(" )")
    }
}

#[derive(Debug, Clone)]
pub struct StateMachine<E> {
    states: Vec<State<E>>,
    cursor: StateId,
}

impl<E: StateData> StateMachine<E> {
    pub const START: StateId = 0;

    /// A machine holding only the start state, with the cursor on it.
    pub fn new() -> Self {
        StateMachine {
            states: vec![State::new(Self::START)],
            cursor: Self::START,
        }
    }

    /// Append a fresh state and return its id.
    pub fn new_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::new(id));
        id
    }
}

impl<E: StateData> Default for StateMachine<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> StateMachine<E> {
    pub fn states(&self) -> &[State<E>] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, id: StateId) -> Option<&State<E>> {
        self.states.get(id)
    }

    pub fn state_mut(&mut self, id: StateId) -> Result<&mut State<E>> {
        self.states.get_mut(id).ok_or(Error::UnknownState(id))
    }

    pub fn cursor(&self) -> StateId {
        self.cursor
    }

    pub fn current(&self) -> &State<E> {
        &self.states[self.cursor]
    }

    pub fn current_mut(&mut self) -> &mut State<E> {
        &mut self.states[self.cursor]
    }

    pub fn set_cursor(&mut self, id: StateId) -> Result<()> {
        if id >= self.states.len() {
            return Err(Error::UnknownState(id));
        }
        self.cursor = id;
        Ok(())
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }
}

impl<E> Index<StateId> for StateMachine<E> {
    type Output = State<E>;

    fn index(&self, id: StateId) -> &State<E> {
        &self.states[id]
    }
}

impl<E: StateData> fmt::Display for StateMachine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", state)?;
        }
        Ok(())
    }
}
