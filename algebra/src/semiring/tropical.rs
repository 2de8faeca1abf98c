//! Tropical semiring `(R ∪ {+inf}, min, +, +inf, 0.0)`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{format_float, parse_float, quantize_float, DivideType, Properties, Semiring, WeightParseError};

/// Tropical semiring weight: `(R ∪ {+inf}, min, +, +inf, 0.0)`.
///
/// - `plus = min`: selects the best (lowest-cost) alternative
/// - `times = +`: accumulates costs along a path
/// - `zero = +inf`: unreachable (identity for min)
/// - `one = 0.0`: zero cost (identity for addition)
///
/// NaN and `-inf` are not members; `no_weight()` is NaN. Equality and
/// ordering use `f64::total_cmp`, so `no_weight() == no_weight()`.
#[derive(Clone, Copy)]
pub struct TropicalWeight(pub f64);

impl TropicalWeight {
    /// Create a new tropical weight.
    #[inline]
    pub const fn new(value: f64) -> Self {
        TropicalWeight(value)
    }

    /// Get the underlying `f64` value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Positive infinity (unreachable / zero element).
    #[inline]
    pub const fn infinity() -> Self {
        TropicalWeight(f64::INFINITY)
    }

    /// Whether this weight is infinite (unreachable).
    #[inline]
    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }
}

impl Semiring for TropicalWeight {
    type Reverse = TropicalWeight;

    #[inline]
    fn zero() -> Self {
        TropicalWeight::infinity()
    }

    #[inline]
    fn one() -> Self {
        TropicalWeight(0.0)
    }

    #[inline]
    fn no_weight() -> Self {
        TropicalWeight(f64::NAN)
    }

    #[inline]
    fn plus(&self, other: &Self) -> Self {
        if !self.is_member() || !other.is_member() {
            return Self::no_weight();
        }
        TropicalWeight(self.0.min(other.0))
    }

    #[inline]
    fn times(&self, other: &Self) -> Self {
        if !self.is_member() || !other.is_member() {
            return Self::no_weight();
        }
        TropicalWeight(self.0 + other.0)
    }

    fn divide(&self, other: &Self, _divide_type: DivideType) -> Self {
        if !self.is_member() || !other.is_member() || other.is_zero() {
            Self::no_weight()
        } else if self.is_zero() {
            Self::zero()
        } else {
            TropicalWeight(self.0 - other.0)
        }
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.is_infinite() && self.0.is_sign_positive()
    }

    #[inline]
    fn is_member(&self) -> bool {
        !self.0.is_nan() && self.0 != f64::NEG_INFINITY
    }

    fn approx_eq(&self, other: &Self, delta: f64) -> bool {
        if self.is_zero() && other.is_zero() {
            true
        } else if self.is_zero() || other.is_zero() {
            false
        } else {
            (self.0 - other.0).abs() <= delta
        }
    }

    fn quantize(&self, delta: f64) -> Self {
        TropicalWeight(quantize_float(self.0, delta))
    }

    #[inline]
    fn reverse(&self) -> Self {
        *self
    }

    fn properties() -> Properties {
        Properties::SEMIRING | Properties::COMMUTATIVE | Properties::IDEMPOTENT | Properties::PATH
    }

    fn type_name() -> &'static str {
        "tropical"
    }
}

impl fmt::Debug for TropicalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TropicalWeight(")?;
        format_float(f, self.0)?;
        write!(f, ")")
    }
}

impl fmt::Display for TropicalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_float(f, self.0)
    }
}

impl FromStr for TropicalWeight {
    type Err = WeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_float(Self::type_name(), s).map(TropicalWeight)
    }
}

impl PartialEq for TropicalWeight {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for TropicalWeight {}

impl PartialOrd for TropicalWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TropicalWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for TropicalWeight {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for TropicalWeight {
    fn default() -> Self {
        Self::one()
    }
}

impl From<f64> for TropicalWeight {
    fn from(value: f64) -> Self {
        TropicalWeight(value)
    }
}
