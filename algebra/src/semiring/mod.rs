//! Semiring weights for weighted automata.
//!
//! Provides the `Semiring` trait every weight type implements, the property
//! bit set describing which algebraic laws a weight obeys, and the numeric
//! weights `TropicalWeight` and (feature `log-semiring`) `LogWeight`.
//!
//! ## Semiring
//!
//! A semiring `(K, ⊕, ⊗, 0, 1)` pairs a commutative monoid `(K, ⊕, 0)` that
//! combines parallel paths with a monoid `(K, ⊗, 1)` that sequences path
//! segments. `⊗` distributes over `⊕` and `0` annihilates under `⊗`.
//!
//! Composite weights (see [`crate::sparse_power`]) are parameterized over any
//! `Semiring`, so every law a composite weight satisfies is inherited from the
//! laws of its base weight and the flags reported by [`Semiring::properties`].

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

mod tropical;
pub use tropical::TropicalWeight;

#[cfg(feature = "log-semiring")]
mod log;
#[cfg(feature = "log-semiring")]
pub use log::LogWeight;

/// Default tolerance for approximate equality and quantization.
pub const DELTA: f64 = 1.0 / 1024.0;

// ══════════════════════════════════════════════════════════════════════════════
// Divide type and properties
// ══════════════════════════════════════════════════════════════════════════════

/// Which side a division cancels.
///
/// For `c = a ⊗ b`, `c.divide(a, Left) == b` and `c.divide(b, Right) == a`.
/// Commutative semirings treat all three the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DivideType {
    /// Left division: cancels a left factor.
    Left,
    /// Right division: cancels a right factor.
    Right,
    /// Division where either side is acceptable.
    #[default]
    Any,
}

/// Algebraic property flags of a weight type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Properties(u64);

impl Properties {
    /// No properties.
    pub const NONE: Properties = Properties(0);
    /// `⊗` left-distributes over `⊕`.
    pub const LEFT_SEMIRING: Properties = Properties(0x1);
    /// `⊗` right-distributes over `⊕`.
    pub const RIGHT_SEMIRING: Properties = Properties(0x2);
    /// Both left and right distributive.
    pub const SEMIRING: Properties = Properties(0x3);
    /// `⊗` is commutative.
    pub const COMMUTATIVE: Properties = Properties(0x4);
    /// `a ⊕ a == a`.
    pub const IDEMPOTENT: Properties = Properties(0x8);
    /// `a ⊕ b ∈ {a, b}`.
    pub const PATH: Properties = Properties(0x10);

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every flag in `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Properties) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Properties {
    type Output = Properties;

    fn bitor(self, rhs: Properties) -> Properties {
        Properties(self.0 | rhs.0)
    }
}

impl BitAnd for Properties {
    type Output = Properties;

    fn bitand(self, rhs: Properties) -> Properties {
        Properties(self.0 & rhs.0)
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Properties, &str); 5] = [
            (Properties::LEFT_SEMIRING, "LEFT_SEMIRING"),
            (Properties::RIGHT_SEMIRING, "RIGHT_SEMIRING"),
            (Properties::COMMUTATIVE, "COMMUTATIVE"),
            (Properties::IDEMPOTENT, "IDEMPOTENT"),
            (Properties::PATH, "PATH"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "Properties(NONE)")
        } else {
            write!(f, "Properties({})", set.join(" | "))
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Semiring trait
// ══════════════════════════════════════════════════════════════════════════════

/// Error produced when a weight cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightParseError {
    /// The text is not a valid value for the weight type.
    #[error("invalid {weight_type} weight: {text:?}")]
    Invalid {
        /// Weight type identifier.
        weight_type: String,
        /// Offending text.
        text: String,
    },
    /// A composite weight has the wrong number of elements.
    #[error("malformed {weight_type} weight {text:?}: {reason}")]
    Malformed {
        /// Weight type identifier.
        weight_type: String,
        /// Offending text.
        text: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl WeightParseError {
    pub(crate) fn invalid(weight_type: &str, text: &str) -> Self {
        WeightParseError::Invalid { weight_type: weight_type.to_string(), text: text.to_string() }
    }
}

/// A semiring weight.
///
/// Properties assumed by every algorithm in this crate:
/// - `(K, plus, zero)` is a commutative monoid
/// - `(K, times, one)` is a monoid
/// - `times` distributes over `plus` on the sides reported by `properties()`
/// - `zero.times(a) == a.times(zero) == zero`
///
/// Text conversion goes through `Display` / `FromStr`; the text form is the
/// one used by potential files and automaton text files.
pub trait Semiring:
    Clone + fmt::Debug + fmt::Display + FromStr<Err = WeightParseError> + PartialEq + Send + Sync + 'static
{
    /// Weight type of the reversed semiring (`a ⊗ᴿ b = b ⊗ a`).
    type Reverse: Semiring;

    /// Additive identity. Annihilates under `times`.
    fn zero() -> Self;
    /// Multiplicative identity.
    fn one() -> Self;
    /// A value outside the semiring, produced by undefined operations.
    fn no_weight() -> Self;

    /// Semiring addition: combines parallel paths.
    fn plus(&self, other: &Self) -> Self;
    /// Semiring multiplication: sequences path segments.
    fn times(&self, other: &Self) -> Self;
    /// Semiring division. Dividing by `zero()` yields `no_weight()`.
    fn divide(&self, other: &Self, divide_type: DivideType) -> Self;
    /// Division where a `zero()` divisor yields `zero()` instead of
    /// `no_weight()`. Composite weights apply the rule per component.
    fn divide_or_zero(&self, other: &Self, divide_type: DivideType) -> Self {
        if other.is_zero() {
            Self::zero()
        } else {
            self.divide(other, divide_type)
        }
    }

    /// Whether this is the additive identity.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
    /// Whether this is the multiplicative identity.
    fn is_one(&self) -> bool {
        *self == Self::one()
    }
    /// Whether this value belongs to the semiring (is not `no_weight()`).
    fn is_member(&self) -> bool;

    /// Approximate equality within `delta`.
    fn approx_eq(&self, other: &Self, delta: f64) -> bool;
    /// Round to a canonical representative within `delta`.
    fn quantize(&self, delta: f64) -> Self;
    /// The same value seen as an element of the reversed semiring.
    fn reverse(&self) -> Self::Reverse;

    /// Algebraic property flags.
    fn properties() -> Properties;
    /// Weight type identifier (e.g. `"tropical"`).
    fn type_name() -> &'static str;
}

// ══════════════════════════════════════════════════════════════════════════════
// Float text helpers
// ══════════════════════════════════════════════════════════════════════════════

pub(crate) fn format_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value == f64::INFINITY {
        write!(f, "Infinity")
    } else if value == f64::NEG_INFINITY {
        write!(f, "-Infinity")
    } else if value.is_nan() {
        write!(f, "BadNumber")
    } else {
        write!(f, "{}", value)
    }
}

pub(crate) fn parse_float(weight_type: &str, text: &str) -> Result<f64, WeightParseError> {
    match text.trim() {
        "Infinity" | "inf" => Ok(f64::INFINITY),
        "-Infinity" | "-inf" => Ok(f64::NEG_INFINITY),
        "BadNumber" => Ok(f64::NAN),
        other => other
            .parse::<f64>()
            .map(positive_zero)
            .map_err(|_| WeightParseError::invalid(weight_type, text)),
    }
}

/// Map `-0.0` to `0.0` so float weights compare bitwise against `one()`.
pub(crate) fn positive_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

pub(crate) fn quantize_float(value: f64, delta: f64) -> f64 {
    if value.is_infinite() || value.is_nan() {
        value
    } else {
        (value / delta + 0.5).floor() * delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_contains() {
        let p = Properties::SEMIRING | Properties::COMMUTATIVE;
        assert!(p.contains(Properties::LEFT_SEMIRING));
        assert!(p.contains(Properties::RIGHT_SEMIRING));
        assert!(!p.contains(Properties::IDEMPOTENT));
        assert_eq!(p & Properties::COMMUTATIVE, Properties::COMMUTATIVE);
    }

    #[test]
    fn test_properties_debug() {
        assert_eq!(format!("{:?}", Properties::NONE), "Properties(NONE)");
        assert_eq!(
            format!("{:?}", Properties::LEFT_SEMIRING | Properties::PATH),
            "Properties(LEFT_SEMIRING | PATH)"
        );
    }

    #[test]
    fn test_parse_float_specials() {
        assert_eq!(parse_float("tropical", "Infinity"), Ok(f64::INFINITY));
        assert_eq!(parse_float("tropical", "-Infinity"), Ok(f64::NEG_INFINITY));
        assert!(parse_float("tropical", "BadNumber").map(f64::is_nan).unwrap_or(false));
        assert_eq!(parse_float("tropical", " 2.5 "), Ok(2.5));
        assert!(parse_float("tropical", "two").is_err());
    }

    #[test]
    fn test_parse_float_negative_zero() {
        let value = parse_float("tropical", "-0").expect("valid float");
        assert!(value.is_sign_positive());
        assert_eq!(value.to_bits(), 0.0f64.to_bits());
        assert!(positive_zero(-0.0).is_sign_positive());
    }

    #[test]
    fn test_quantize_float() {
        assert_eq!(quantize_float(1.0 + 1e-6, DELTA), 1.0);
        assert_eq!(quantize_float(f64::INFINITY, DELTA), f64::INFINITY);
    }
}
