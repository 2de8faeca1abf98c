//! Sparse Cartesian power weights: `W ^ n` over a sparse tuple.
//!
//! `SparsePowerWeight<W, K>` is the free semimodule of rank `n` over `W`:
//!
//! - a left semimodule when `W` is left distributive,
//! - a right semimodule when `W` is right distributive,
//! - a bisemimodule when `W` is a semiring.
//!
//! `plus`, `times` and `divide` are element-wise. [`scalar_times`] and
//! [`times_scalar`] give the left and right scalar products, and
//! [`dot_product`] reduces two power weights to a single `W`.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::semiring::{DivideType, Properties, Semiring, WeightParseError};
use crate::sparse_tuple::{SparseTupleWeight, TupleKey};

/// Sparse Cartesian power of `W`, keyed by `K`.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct SparsePowerWeight<W, K = i32>(SparseTupleWeight<W, K>);

impl<W: Semiring, K: TupleKey> SparsePowerWeight<W, K> {
    /// A zero-background power weight holding `weight` at `key`.
    pub fn from_pair(key: K, weight: W) -> Self {
        SparsePowerWeight(SparseTupleWeight::from_pair(key, weight))
    }

    /// A zero-background power weight built from `(key, weight)` pairs.
    pub fn from_pairs<I: IntoIterator<Item = (K, W)>>(pairs: I) -> Self {
        SparsePowerWeight(SparseTupleWeight::from_pairs(pairs))
    }

    /// The underlying sparse tuple.
    pub fn as_tuple(&self) -> &SparseTupleWeight<W, K> {
        &self.0
    }

    /// Consume into the underlying sparse tuple.
    pub fn into_tuple(self) -> SparseTupleWeight<W, K> {
        self.0
    }

    /// The coordinate at `key`.
    pub fn get(&self, key: &K) -> &W {
        self.0.get(key)
    }

    /// Set the coordinate at `key`.
    pub fn insert(&mut self, key: K, weight: W) {
        self.0.insert(key, weight);
    }

    /// Explicit coordinates in ascending key order.
    pub fn iter(&self) -> std::slice::Iter<'_, (K, W)> {
        self.0.iter()
    }
}

impl<W, K> From<SparseTupleWeight<W, K>> for SparsePowerWeight<W, K> {
    fn from(tuple: SparseTupleWeight<W, K>) -> Self {
        SparsePowerWeight(tuple)
    }
}

impl<W: Semiring, K: TupleKey> FromIterator<(K, W)> for SparsePowerWeight<W, K> {
    fn from_iter<I: IntoIterator<Item = (K, W)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<W: Semiring, K: TupleKey> Default for SparsePowerWeight<W, K> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<W: Semiring, K: TupleKey> Semiring for SparsePowerWeight<W, K> {
    type Reverse = SparsePowerWeight<W::Reverse, K>;

    fn zero() -> Self {
        SparsePowerWeight(SparseTupleWeight::zero())
    }

    fn one() -> Self {
        SparsePowerWeight(SparseTupleWeight::one())
    }

    fn no_weight() -> Self {
        SparsePowerWeight(SparseTupleWeight::no_weight())
    }

    fn plus(&self, other: &Self) -> Self {
        SparsePowerWeight(self.0.plus(&other.0))
    }

    fn times(&self, other: &Self) -> Self {
        SparsePowerWeight(self.0.times(&other.0))
    }

    fn divide(&self, other: &Self, divide_type: DivideType) -> Self {
        SparsePowerWeight(self.0.divide(&other.0, divide_type))
    }

    fn divide_or_zero(&self, other: &Self, divide_type: DivideType) -> Self {
        SparsePowerWeight(self.0.divide_or_zero(&other.0, divide_type))
    }

    fn is_member(&self) -> bool {
        self.0.is_member()
    }

    fn approx_eq(&self, other: &Self, delta: f64) -> bool {
        self.0.approx_eq(&other.0, delta)
    }

    fn quantize(&self, delta: f64) -> Self {
        SparsePowerWeight(self.0.quantize(delta))
    }

    fn reverse(&self) -> Self::Reverse {
        SparsePowerWeight(self.0.reverse())
    }

    fn properties() -> Properties {
        W::properties()
            & (Properties::LEFT_SEMIRING
                | Properties::RIGHT_SEMIRING
                | Properties::COMMUTATIVE
                | Properties::IDEMPOTENT)
    }

    fn type_name() -> &'static str {
        cached_type_name::<Self>(|| {
            let mut name = format!("{}_^n", W::type_name());
            if K::BITS != 32 {
                name.push_str(&format!("_{}", K::BITS));
            }
            name
        })
    }
}

impl<W: Semiring, K: TupleKey> fmt::Display for SparsePowerWeight<W, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<W: Semiring, K: TupleKey> FromStr for SparsePowerWeight<W, K> {
    type Err = WeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SparseTupleWeight<W, K>>().map(SparsePowerWeight)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Scalar products and dot product
// ══════════════════════════════════════════════════════════════════════════════

/// Left scalar product `k ⊗ w`.
///
/// `k` is lifted to a tuple whose background is `k`, so the ordinary
/// element-wise `times` multiplies every coordinate (and the background) by it.
pub fn scalar_times<W: Semiring, K: TupleKey>(
    k: &W,
    w: &SparsePowerWeight<W, K>,
) -> SparsePowerWeight<W, K> {
    SparsePowerWeight(SparseTupleWeight::uniform(k.clone())).times(w)
}

/// Right scalar product `w ⊗ k`.
pub fn times_scalar<W: Semiring, K: TupleKey>(
    w: &SparsePowerWeight<W, K>,
    k: &W,
) -> SparsePowerWeight<W, K> {
    w.times(&SparsePowerWeight(SparseTupleWeight::uniform(k.clone())))
}

/// Divide every coordinate of `w` by the scalar `k`.
pub fn divide_scalar<W: Semiring, K: TupleKey>(
    w: &SparsePowerWeight<W, K>,
    k: &W,
    divide_type: DivideType,
) -> SparsePowerWeight<W, K> {
    w.divide(&SparsePowerWeight(SparseTupleWeight::uniform(k.clone())), divide_type)
}

/// `⊕` over the explicit coordinates of `w1 ⊗ w2`, starting from `W::zero()`.
pub fn dot_product<W: Semiring, K: TupleKey>(
    w1: &SparsePowerWeight<W, K>,
    w2: &SparsePowerWeight<W, K>,
) -> W {
    w1.times(w2)
        .iter()
        .fold(W::zero(), |acc, (_, value)| acc.plus(value))
}

// ══════════════════════════════════════════════════════════════════════════════
// Type names
// ══════════════════════════════════════════════════════════════════════════════

type TypeNames = RwLock<HashMap<TypeId, &'static str>>;

static TYPE_NAMES: OnceLock<TypeNames> = OnceLock::new();

/// Type name of `T`, built by `build` the first time it is requested.
///
/// Each name is stored once and never replaced.
fn cached_type_name<T: 'static>(build: impl FnOnce() -> String) -> &'static str {
    let names = TYPE_NAMES.get_or_init(|| RwLock::new(HashMap::new()));
    let id = TypeId::of::<T>();

    if let Some(name) = names.read().get(&id).copied() {
        return name;
    }

    // Built before locking: composite names recurse into their base names.
    let name = build();
    let mut names = names.write();
    *names.entry(id).or_insert_with(|| Box::leak(name.into_boxed_str()))
}
