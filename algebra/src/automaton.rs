//! Weighted automaton interfaces and a vector-backed implementation.
//!
//! The reweight transform only needs the narrow [`Automaton`] /
//! [`MutableAutomaton`] interfaces: state enumeration, final weights, and
//! per-state outgoing transitions that can be rewritten in place.
//! [`VectorAutomaton`] stores states in a `Vec` indexed by [`StateId`].

use std::ops::Range;

use crate::semiring::Semiring;

/// State identifier in an automaton.
pub type StateId = u32;

/// Transition label.
pub type Label = u32;

/// Sentinel for "no state".
pub const NO_STATE: StateId = StateId::MAX;

/// The epsilon label.
pub const EPSILON: Label = 0;

/// Most states the text and potential readers will allocate; any state id
/// read from a file must be below this.
pub const MAX_STATES: usize = 1 << 26;

/// A weighted transition.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTransition<W> {
    /// Input label.
    pub input: Label,
    /// Output label.
    pub output: Label,
    /// Transition weight.
    pub weight: W,
    /// Target state.
    pub to: StateId,
}

impl<W> WeightedTransition<W> {
    /// Create a new transition.
    pub fn new(input: Label, output: Label, weight: W, to: StateId) -> Self {
        WeightedTransition { input, output, weight, to }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Interfaces
// ══════════════════════════════════════════════════════════════════════════════

/// Read access to a weighted automaton.
pub trait Automaton {
    /// Weight type of transitions and final weights.
    type Weight: Semiring;

    /// Start state, or `NO_STATE` for an empty automaton.
    fn start(&self) -> StateId;

    /// Number of states.
    fn num_states(&self) -> usize;

    /// Final weight of `state` (`zero()` for non-final states).
    fn final_weight(&self, state: StateId) -> &Self::Weight;

    /// Outgoing transitions of `state`.
    fn transitions(&self, state: StateId) -> &[WeightedTransition<Self::Weight>];

    /// All state ids in ascending order.
    fn states(&self) -> Range<StateId> {
        0..self.num_states() as StateId
    }

    /// Identifier of the weight type.
    fn weight_type(&self) -> &'static str {
        Self::Weight::type_name()
    }

    /// Whether `state` is final.
    fn is_final(&self, state: StateId) -> bool {
        !self.final_weight(state).is_zero()
    }

    /// Total number of transitions.
    fn num_transitions(&self) -> usize {
        self.states().map(|s| self.transitions(s).len()).sum()
    }

    /// Whether no cycle passes through the start state.
    fn is_initial_acyclic(&self) -> bool {
        let start = self.start();
        if start == NO_STATE {
            return true;
        }

        let mut visited = vec![false; self.num_states()];
        let mut stack = vec![start];
        visited[start as usize] = true;
        while let Some(state) = stack.pop() {
            for t in self.transitions(state) {
                if t.to == start {
                    return false;
                }
                if !visited[t.to as usize] {
                    visited[t.to as usize] = true;
                    stack.push(t.to);
                }
            }
        }
        true
    }
}

/// In-place mutation of a weighted automaton.
pub trait MutableAutomaton: Automaton {
    /// Set the final weight of `state`.
    fn set_final(&mut self, state: StateId, weight: Self::Weight);

    /// Mutable outgoing transitions of `state`.
    fn transitions_mut(&mut self, state: StateId) -> &mut [WeightedTransition<Self::Weight>];

    /// Add a non-final state with no transitions.
    fn add_state(&mut self) -> StateId;

    /// Append a transition leaving `state`.
    fn add_transition(&mut self, state: StateId, transition: WeightedTransition<Self::Weight>);

    /// Set the start state.
    fn set_start(&mut self, state: StateId);
}

// ══════════════════════════════════════════════════════════════════════════════
// VectorAutomaton
// ══════════════════════════════════════════════════════════════════════════════

/// A state of a [`VectorAutomaton`].
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonState<W> {
    /// Final weight (`zero()` if not final).
    pub final_weight: W,
    /// Outgoing transitions.
    pub transitions: Vec<WeightedTransition<W>>,
}

impl<W: Semiring> AutomatonState<W> {
    /// A non-final state with no transitions.
    pub fn new() -> Self {
        AutomatonState { final_weight: W::zero(), transitions: Vec::new() }
    }
}

impl<W: Semiring> Default for AutomatonState<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Vector-backed mutable automaton.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorAutomaton<W> {
    states: Vec<AutomatonState<W>>,
    start: StateId,
}

impl<W: Semiring> VectorAutomaton<W> {
    /// An automaton with no states.
    pub fn new() -> Self {
        VectorAutomaton { states: Vec::new(), start: NO_STATE }
    }

    /// Add states until `state` exists.
    pub fn ensure_state(&mut self, state: StateId) {
        while self.states.len() <= state as usize {
            self.states.push(AutomatonState::new());
        }
    }

    /// Convenience for `add_transition(from, WeightedTransition::new(...))`.
    pub fn add_arc(&mut self, from: StateId, to: StateId, input: Label, output: Label, weight: W) {
        self.add_transition(from, WeightedTransition::new(input, output, weight, to));
    }

    /// The state record for `state`.
    pub fn state(&self, state: StateId) -> &AutomatonState<W> {
        &self.states[state as usize]
    }
}

impl<W: Semiring> Default for VectorAutomaton<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Semiring> Automaton for VectorAutomaton<W> {
    type Weight = W;

    fn start(&self) -> StateId {
        self.start
    }

    fn num_states(&self) -> usize {
        self.states.len()
    }

    fn final_weight(&self, state: StateId) -> &W {
        &self.states[state as usize].final_weight
    }

    fn transitions(&self, state: StateId) -> &[WeightedTransition<W>] {
        &self.states[state as usize].transitions
    }
}

impl<W: Semiring> MutableAutomaton for VectorAutomaton<W> {
    fn set_final(&mut self, state: StateId, weight: W) {
        self.states[state as usize].final_weight = weight;
    }

    fn transitions_mut(&mut self, state: StateId) -> &mut [WeightedTransition<W>] {
        &mut self.states[state as usize].transitions
    }

    fn add_state(&mut self) -> StateId {
        self.states.push(AutomatonState::new());
        (self.states.len() - 1) as StateId
    }

    fn add_transition(&mut self, state: StateId, transition: WeightedTransition<W>) {
        self.states[state as usize].transitions.push(transition);
    }

    fn set_start(&mut self, state: StateId) {
        self.start = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::TropicalWeight;

    fn chain() -> VectorAutomaton<TropicalWeight> {
        let mut fst = VectorAutomaton::new();
        let s0 = fst.add_state();
        let s1 = fst.add_state();
        let s2 = fst.add_state();
        fst.set_start(s0);
        fst.add_arc(s0, s1, 1, 1, TropicalWeight::new(2.0));
        fst.add_arc(s1, s2, 2, 2, TropicalWeight::new(3.0));
        fst.set_final(s2, TropicalWeight::one());
        fst
    }

    #[test]
    fn test_vector_automaton_basic() {
        let fst = chain();
        assert_eq!(fst.start(), 0);
        assert_eq!(fst.num_states(), 3);
        assert_eq!(fst.num_transitions(), 2);
        assert!(fst.is_final(2));
        assert!(!fst.is_final(0));
        assert_eq!(fst.weight_type(), "tropical");
        assert_eq!(fst.states().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_transitions_mut_rewrites_in_place() {
        let mut fst = chain();
        for t in fst.transitions_mut(0) {
            t.weight = TropicalWeight::new(9.0);
        }
        assert_eq!(fst.transitions(0)[0].weight, TropicalWeight::new(9.0));
        assert_eq!(fst.transitions(0)[0].to, 1);
    }

    #[test]
    fn test_initial_acyclic() {
        let mut fst = chain();
        assert!(fst.is_initial_acyclic());
        // a cycle not through the start state
        fst.add_arc(2, 1, 3, 3, TropicalWeight::one());
        assert!(fst.is_initial_acyclic());
        fst.add_arc(2, 0, 3, 3, TropicalWeight::one());
        assert!(!fst.is_initial_acyclic());
        assert!(VectorAutomaton::<TropicalWeight>::new().is_initial_acyclic());
    }

    #[test]
    fn test_ensure_state() {
        let mut fst = VectorAutomaton::<TropicalWeight>::new();
        fst.ensure_state(4);
        assert_eq!(fst.num_states(), 5);
        assert_eq!(fst.start(), NO_STATE);
        assert!(fst.state(4).transitions.is_empty());
    }
}
