//! Thompson construction: lowers a [`Regex`] tree into an epsilon-NFA.
//!
//! Construction walks the tree with the machine cursor on "the state the next
//! fragment is wired from". Every character class becomes
//!
//! ```text
//! cursor --class--> s1 --ε--> s2        (cursor moves to s2)
//! ```
//!
//! a union splits into two branches from fresh states and joins them again,
//! and quantifiers are applied afterwards as epsilon edges between the state
//! before the element and the cursor after it.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::ast::{Element, Regex, Union};
use crate::charclass::CharClass;
use crate::error::{Error, Result};
use crate::quantifier::Quantifier;
use crate::state::{State, StateData, StateId, StateMachine};

/// Epsilon edges leaving an NFA state.
#[derive(Debug, Clone, Default)]
pub struct Epsilons {
    edges: IndexSet<StateId>,
}

impl StateData for Epsilons {
    const KIND: &'static str = "NfaState";

    fn fmt_data(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.edges.is_empty() {
            f.write_str(" Epsilons:")?;
            for id in &self.edges {
                write!(f, " {}", id)?;
            }
        }
        Ok(())
    }
}

pub type NfaState = State<Epsilons>;

impl State<Epsilons> {
    pub fn epsilons(&self) -> impl Iterator<Item = StateId> + '_ {
        self.data.edges.iter().copied()
    }

    /// Adding an edge that already exists is a no-op.
    pub fn add_epsilon_transition(&mut self, next: StateId) {
        if self.data.edges.insert(next) {
            trace!("state {}: ε -> {}", self.id(), next);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Nfa {
    machine: StateMachine<Epsilons>,
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the automaton for `regex`; the state construction ends on is
    /// marked final.
    pub fn from_regex(regex: &Regex) -> Result<Self> {
        let mut nfa = Nfa::new();
        nfa.add_regex(regex)?;
        nfa.machine.current_mut().set_final(true);
        debug!(
            "built NFA with {} states, final state {}",
            nfa.machine.len(),
            nfa.machine.cursor()
        );
        Ok(nfa)
    }

    pub fn machine(&self) -> &StateMachine<Epsilons> {
        &self.machine
    }

    pub fn states(&self) -> &[NfaState] {
        self.machine.states()
    }

    pub fn state(&self, id: StateId) -> Option<&NfaState> {
        self.machine.get(id)
    }

    /// Append the fragments for every element of `regex` at the cursor.
    pub fn add_regex(&mut self, regex: &Regex) -> Result<()> {
        for element in regex.elements() {
            let start = self.machine.cursor();

            match element {
                Element::Group(group) => self.add_regex(group)?,
                Element::Union(union) => self.add_union(union)?,
                Element::Class(class) => self.add_char_class(class)?,
            }

            let end = self.machine.cursor();
            if end == start {
                return Err(Error::StalledConstruction { state: start });
            }

            match element.quantifier() {
                Quantifier::One => {}
                Quantifier::ZeroOrOne => self.add_epsilon(start, end)?,
                Quantifier::ZeroOrMore => {
                    self.add_epsilon(start, end)?;
                    self.add_epsilon(end, start)?;
                }
                Quantifier::OneOrMore => self.add_epsilon(end, start)?,
            }
        }
        Ok(())
    }

    fn add_union(&mut self, union: &Union) -> Result<()> {
        let origin = self.machine.cursor();
        let split_first = self.machine.new_state();
        let split_second = self.machine.new_state();
        self.add_epsilon(origin, split_first)?;
        self.add_epsilon(origin, split_second)?;

        self.machine.set_cursor(split_first)?;
        self.add_regex(&union.first)?;
        let end_first = self.machine.cursor();

        self.machine.set_cursor(split_second)?;
        self.add_regex(&union.second)?;
        let end_second = self.machine.cursor();

        let join = self.machine.new_state();
        self.add_epsilon(end_first, join)?;
        self.add_epsilon(end_second, join)?;
        self.machine.set_cursor(join)
    }

    fn add_char_class(&mut self, class: &CharClass) -> Result<()> {
        let consumed = self.machine.new_state();
        let next = self.machine.new_state();
        self.machine
            .current_mut()
            .add_transition(class.clone(), consumed)?;
        self.add_epsilon(consumed, next)?;
        self.machine.set_cursor(next)
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) -> Result<()> {
        self.machine.state_mut(from)?.add_epsilon_transition(to);
        Ok(())
    }

    /// Every state reachable from `from` through zero or more epsilon edges,
    /// `from` included.
    pub fn epsilon_reachable(&self, from: StateId) -> BTreeSet<StateId> {
        let mut visited = BTreeSet::new();
        let mut to_visit = vec![from];
        while let Some(id) = to_visit.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(state) = self.machine.get(id) {
                to_visit.extend(state.epsilons().filter(|next| !visited.contains(next)));
            }
        }
        visited
    }

    /// The labeled transitions of every state in the epsilon closure of
    /// `from`, merged into one map.
    ///
    /// Closure states are visited in ascending id order; when two of them
    /// carry equal classes the later target replaces the earlier one.
    pub fn epsilon_transitionable(&self, from: StateId) -> IndexMap<CharClass, StateId> {
        let mut merged = IndexMap::new();
        for id in self.epsilon_reachable(from) {
            let state = &self.machine[id];
            for (class, &target) in state.transitions() {
                if let Some(previous) = merged.insert(class.clone(), target) {
                    if previous != target {
                        debug!(
                            "closure of {}: {} now leads to {} instead of {}",
                            from, class, target, previous
                        );
                    }
                }
            }
        }
        merged
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.machine, f)
    }
}
