//! Potential-based reweighting of a weighted automaton.
//!
//! Given per-state potentials `V`, every transition weight and final weight is
//! rewritten so that the total weight of each accepting path is unchanged
//! while weight mass moves toward the initial or the final states.
//!
//! ## Algorithm
//!
//! For a transition `(p, q, w)` and final weight `ρ(s)`:
//!
//! - `ToInitial`: `w' = (w ⊗ V[q]) ⊘ₗ V[p]`, `ρ'(s) = ρ(s) ⊘ₗ V[s]`
//! - `ToFinal`:   `w' = (V[p] ⊗ w) ⊘ᵣ V[q]`, `ρ'(s) = V[s] ⊗ ρ(s)`
//!
//! The start potential `σ = V[start]` is then folded back in (`σ` for
//! `ToInitial`, `σ⁻¹` for `ToFinal`) so that path totals are preserved. When a
//! cycle runs through the start state the factor is placed on an epsilon
//! transition from a fresh start state instead.
//!
//! With `V` the shortest distance to the final states, `ToInitial` is weight
//! pushing toward the initial state; with `V` the shortest distance from the
//! initial state, `ToFinal` pushes toward the final states.
//!
//! Potentials beyond the end of the slice read as `zero()`. A division by a
//! `zero()` potential yields `zero()`, component by component for tuple
//! weights (see [`Semiring::divide_or_zero`]).

use tracing::{debug, trace};

use crate::automaton::{MutableAutomaton, StateId, WeightedTransition, EPSILON};
use crate::semiring::{DivideType, Properties, Semiring};

/// Which end of the automaton receives the shifted weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReweightType {
    /// Push weight toward the initial state.
    ToInitial,
    /// Push weight toward the final states.
    ToFinal,
}

impl ReweightType {
    /// `ToFinal` when `to_final` is set, `ToInitial` otherwise.
    pub fn from_to_final(to_final: bool) -> Self {
        if to_final {
            ReweightType::ToFinal
        } else {
            ReweightType::ToInitial
        }
    }

    /// Distributivity the weight type needs for this direction.
    pub fn required_properties(self) -> Properties {
        match self {
            ReweightType::ToInitial => Properties::LEFT_SEMIRING,
            ReweightType::ToFinal => Properties::RIGHT_SEMIRING,
        }
    }
}

/// Reweighting failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReweightError {
    /// The weight type lacks the distributivity the direction requires.
    #[error("reweighting {direction:?} requires a {side}-distributive weight, got {weight_type}")]
    NotDistributive {
        /// Requested direction.
        direction: ReweightType,
        /// `"left"` or `"right"`.
        side: &'static str,
        /// Offending weight type.
        weight_type: &'static str,
    },
}

fn potential_of<'a, W>(potentials: &'a [W], zero: &'a W, state: StateId) -> &'a W {
    potentials.get(state as usize).unwrap_or(zero)
}

/// Reweight `fst` in place according to `potentials`.
///
/// Transition labels and targets are never changed. The automaton gains one
/// state only when the start potential is neither `zero()` nor `one()` and
/// the start state lies on a cycle.
///
/// The potentials are applied as given; they are not checked against any
/// shortest-distance solution.
pub fn reweight<A: MutableAutomaton>(
    fst: &mut A,
    potentials: &[A::Weight],
    reweight_type: ReweightType,
) -> Result<(), ReweightError> {
    let required = reweight_type.required_properties();
    if !A::Weight::properties().contains(required) {
        return Err(ReweightError::NotDistributive {
            direction: reweight_type,
            side: if required == Properties::LEFT_SEMIRING { "left" } else { "right" },
            weight_type: A::Weight::type_name(),
        });
    }

    if fst.num_states() == 0 {
        return Ok(());
    }

    debug!(
        direction = ?reweight_type,
        states = fst.num_states(),
        potentials = potentials.len(),
        weight_type = A::Weight::type_name(),
        "reweighting automaton"
    );
    if potentials.len() < fst.num_states() {
        debug!(
            missing = fst.num_states() - potentials.len(),
            "potentials shorter than state count; missing states read as zero"
        );
    }

    let zero = A::Weight::zero();

    for state in fst.states() {
        let v_state = potential_of(potentials, &zero, state).clone();

        for t in fst.transitions_mut(state) {
            let v_next = potential_of(potentials, &zero, t.to);
            t.weight = match reweight_type {
                ReweightType::ToInitial => {
                    t.weight.times(v_next).divide_or_zero(&v_state, DivideType::Left)
                },
                ReweightType::ToFinal => {
                    v_state.times(&t.weight).divide_or_zero(v_next, DivideType::Right)
                },
            };
        }

        let final_weight = match reweight_type {
            ReweightType::ToInitial => {
                fst.final_weight(state).divide_or_zero(&v_state, DivideType::Left)
            },
            ReweightType::ToFinal => v_state.times(fst.final_weight(state)),
        };
        fst.set_final(state, final_weight);
    }

    let start_weight = potential_of(potentials, &zero, fst.start()).clone();
    absorb_start_potential(fst, start_weight, reweight_type);
    Ok(())
}

/// Fold the start potential back in so path totals are unchanged.
fn absorb_start_potential<A: MutableAutomaton>(
    fst: &mut A,
    start_weight: A::Weight,
    reweight_type: ReweightType,
) {
    if start_weight.is_zero() || start_weight.is_one() {
        return;
    }

    let factor = match reweight_type {
        ReweightType::ToInitial => start_weight,
        ReweightType::ToFinal => A::Weight::one().divide_or_zero(&start_weight, DivideType::Right),
    };
    let start = fst.start();

    if fst.is_initial_acyclic() {
        trace!(start, factor = %factor, "folding start potential into start transitions");
        for t in fst.transitions_mut(start) {
            t.weight = factor.times(&t.weight);
        }
        let final_weight = factor.times(fst.final_weight(start));
        fst.set_final(start, final_weight);
    } else {
        let new_start = fst.add_state();
        trace!(start, new_start, factor = %factor, "start state is cyclic; adding a new start state");
        fst.add_transition(new_start, WeightedTransition::new(EPSILON, EPSILON, factor, start));
        fst.set_start(new_start);
    }
}
