//! # wfst-algebra: Weight Algebra and Potential Reweighting for WFSTs
//!
//! This crate provides the weight algebra used by weighted finite-state
//! transducers, plus the potential-based reweight transform that weight
//! pushing is built on:
//!
//! - A [`Semiring`] trait with algebraic property flags and left/right
//!   division, implemented by [`TropicalWeight`] and (behind the default
//!   `log-semiring` feature) [`LogWeight`]
//! - [`SparseTupleWeight`]: a sparse, background-valued tuple of weights with a
//!   single element-wise merge used by every tuple operation
//! - [`SparsePowerWeight`]: the sparse Cartesian power `W ^ n`, a semiring in
//!   its own right, with scalar products and a dot product
//! - [`reweight`]: rewrite transition and final weights from per-state
//!   potentials toward the initial or the final states, preserving the total
//!   weight of every accepting path
//!
//! ## Pipeline
//!
//! ```text
//!  automaton text ──► read_text ──┐
//!                                 ├──► reweight ──► write_text ──► output
//!  potentials ──► read_potentials ┘
//! ```
//!
//! [`TropicalWeight`]: semiring::TropicalWeight
//! [`LogWeight`]: semiring::LogWeight
//! [`SparseTupleWeight`]: sparse_tuple::SparseTupleWeight
//! [`SparsePowerWeight`]: sparse_power::SparsePowerWeight
//! [`reweight`]: reweight::reweight

pub mod automaton;
pub mod potentials;
pub mod reweight;
pub mod semiring;
pub mod sparse_power;
pub mod sparse_tuple;
pub mod text;

#[cfg(test)]
mod tests;

pub use semiring::Semiring;

/// Common imports for working with weights and automata.
pub mod prelude {
    pub use crate::automaton::{
        Automaton, Label, MutableAutomaton, StateId, VectorAutomaton, WeightedTransition,
        EPSILON, MAX_STATES, NO_STATE,
    };
    pub use crate::potentials::{read_potentials, read_potentials_file, write_potentials};
    pub use crate::reweight::{reweight, ReweightError, ReweightType};
    #[cfg(feature = "log-semiring")]
    pub use crate::semiring::LogWeight;
    pub use crate::semiring::{DivideType, Properties, Semiring, TropicalWeight, DELTA};
    pub use crate::sparse_power::{dot_product, scalar_times, times_scalar, SparsePowerWeight};
    pub use crate::sparse_tuple::SparseTupleWeight;
    pub use crate::text::{read_text, read_text_file, write_text};
}
