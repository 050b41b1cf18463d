//! Subset construction: collapses epsilon closures of an [`Nfa`] into the
//! states of a deterministic automaton.
//!
//! Each DFA state remembers the NFA closure it was built from (its origin set).
//! Construction walks depth-first from the NFA start state; a target whose
//! closure has already been given a DFA state is wired to that state instead
//! of being expanded again, so cyclic automata terminate.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::{debug, trace};

use crate::charclass::CharClass;
use crate::error::Result;
use crate::nfa::Nfa;
use crate::state::{State, StateData, StateId, StateMachine};

/// NFA states a DFA state was collapsed from.
#[derive(Debug, Clone, Default)]
pub struct Origins {
    states: BTreeSet<StateId>,
}

impl StateData for Origins {
    const KIND: &'static str = "DfaState";
}

pub type DfaState = State<Origins>;

impl State<Origins> {
    pub fn nfa_origins(&self) -> &BTreeSet<StateId> {
        &self.data.states
    }

    pub fn add_nfa_origins(&mut self, states: &BTreeSet<StateId>) {
        self.data.states.extend(states);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dfa {
    machine: StateMachine<Origins>,
}

/// DFA state already built for each origin set.
type Built = HashMap<BTreeSet<StateId>, StateId>;

/// A DFA state whose closure transitions are still being expanded.
struct Pending {
    dfa_state: StateId,
    nfa_state: StateId,
    transitions: indexmap::map::IntoIter<CharClass, StateId>,
}

impl Dfa {
    pub fn from_nfa(nfa: &Nfa) -> Result<Self> {
        let mut dfa = Dfa::default();
        dfa.collect_nfa_states(nfa)?;
        dfa.machine.reset_cursor();
        debug!(
            "built DFA with {} states from {} NFA states",
            dfa.machine.len(),
            nfa.states().len()
        );
        Ok(dfa)
    }

    pub fn machine(&self) -> &StateMachine<Origins> {
        &self.machine
    }

    pub fn states(&self) -> &[DfaState] {
        self.machine.states()
    }

    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.machine.get(id)
    }

    /// Depth-first expansion from the NFA start state over an explicit stack
    /// of pending states; pattern length never turns into call depth.
    ///
    /// A new DFA state is expanded fully before its parent moves on to its
    /// next transition, which fixes state numbering and memo hits.
    fn collect_nfa_states(&mut self, nfa: &Nfa) -> Result<()> {
        let mut built = Built::new();
        let mut stack = vec![self.visit(nfa, StateMachine::<Origins>::START, &mut built)];

        while let Some(pending) = stack.last_mut() {
            let Some((class, target)) = pending.transitions.next() else {
                stack.pop();
                continue;
            };
            let (current, nfa_state) = (pending.dfa_state, pending.nfa_state);
            self.machine.set_cursor(current)?;

            if target == nfa_state {
                self.machine.current_mut().add_self_transition(class)?;
                continue;
            }

            let target_origins = nfa.epsilon_reachable(target);
            if let Some(&existing) = built.get(&target_origins) {
                self.machine.current_mut().add_transition(class, existing)?;
                continue;
            }

            let Some(class) = self.machine.current().admit(class)? else {
                continue;
            };
            let next = self.machine.new_state();
            self.machine.current_mut().add_transition(class, next)?;

            self.machine.set_cursor(next)?;
            stack.push(self.visit(nfa, target, &mut built));
        }
        Ok(())
    }

    /// Fill the cursor state from the closure of `nfa_state` and record it
    /// as built.
    fn visit(&mut self, nfa: &Nfa, nfa_state: StateId, built: &mut Built) -> Pending {
        let origins = nfa.epsilon_reachable(nfa_state);
        let transitions = nfa.epsilon_transitionable(nfa_state);
        let current = self.machine.cursor();

        let accepting = origins
            .iter()
            .any(|&id| nfa.state(id).is_some_and(|state| state.is_final()));
        let state = self.machine.current_mut();
        state.add_nfa_origins(&origins);
        state.set_final(accepting);
        trace!("dfa state {} from nfa closure {:?}", current, origins);
        built.insert(origins, current);

        Pending {
            dfa_state: current,
            nfa_state,
            transitions: transitions.into_iter(),
        }
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.machine, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Regex;

    fn build(pattern: &str) -> Dfa {
        let nfa = Nfa::from_regex(&Regex::parse(pattern).unwrap()).unwrap();
        Dfa::from_nfa(&nfa).unwrap()
    }

    #[test]
    fn union_start_has_two_disjoint_transitions() {
        let dfa = build("a|b");
        let start = &dfa.machine()[0];
        assert_eq!(start.transitions().len(), 2);
        let keys: Vec<_> = start.transitions().keys().collect();
        assert_eq!(keys[0], &CharClass::literal('a'));
        assert_eq!(keys[1], &CharClass::literal('b'));
        assert!(!keys[0].overlaps(keys[1]));
        assert!(!start.is_final());
        for &target in start.transitions().values() {
            assert!(dfa.machine()[target].is_final());
        }
        assert_eq!(start.nfa_origins(), &BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn star_becomes_self_loop() {
        let dfa = build("a*");
        assert_eq!(
            dfa.to_string(),
            "DfaState 0 ( Transitions: a*->1 Final )\n\
             DfaState 1 ( Transitions: a*->1 Final )"
        );
    }

    #[test]
    fn two_step_loop_terminates_and_shares_states() {
        let dfa = build("(ab)*");
        // {0,4} -a-> {1,2} -b-> {0,3,4} -a-> {1,2}
        assert_eq!(dfa.states().len(), 3);
        let third = &dfa.machine()[2];
        assert!(third.is_final());
        assert_eq!(third.transitions().values().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn sequence_is_a_chain() {
        let dfa = build("abc");
        assert_eq!(dfa.states().len(), 4);
        for id in 0..3 {
            let state = &dfa.machine()[id];
            let targets: Vec<_> = state.transitions().values().copied().collect();
            assert_eq!(targets, vec![id + 1]);
            assert!(!state.is_final());
        }
        assert!(dfa.machine()[3].is_final());
    }

    #[test]
    fn long_flat_pattern_builds_without_deep_recursion() {
        let dfa = build(&"a".repeat(50_000));
        assert_eq!(dfa.states().len(), 50_001);
        assert!(dfa.machine()[50_000].is_final());
        let last_step: Vec<_> = dfa.machine()[49_999].transitions().values().copied().collect();
        assert_eq!(last_step, vec![50_000]);
        assert_eq!(dfa.machine().cursor(), 0);
    }

    #[test]
    fn cursor_returns_to_start() {
        let dfa = build("a(b|c)d");
        assert_eq!(dfa.machine().cursor(), 0);
    }
}
