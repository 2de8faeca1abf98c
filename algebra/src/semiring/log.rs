//! Log semiring `(R ∪ {+inf}, log-sum-exp, +, +inf, 0.0)`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{
    format_float, parse_float, positive_zero, quantize_float, DivideType, Properties, Semiring,
    WeightParseError,
};

/// Log semiring weight: `(R ∪ {+inf}, log-sum-exp, +, +inf, 0.0)`.
///
/// Represents negative log probabilities: `w = -ln(p)`.
///
/// - `plus = log-sum-exp`: combines probabilities: `-ln(exp(-a) + exp(-b))`
/// - `times = +`: multiplies probabilities
/// - `zero = +inf`: probability 0
/// - `one = 0.0`: probability 1
///
/// Unlike `TropicalWeight`, `LogWeight` is **not idempotent**.
#[derive(Clone, Copy)]
pub struct LogWeight(pub f64);

impl LogWeight {
    /// Create a new log weight from a raw negative-log value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        LogWeight(value)
    }

    /// Get the underlying `f64` value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Create a log weight from a probability `p` in `[0, 1]`.
    #[inline]
    pub fn from_probability(p: f64) -> Self {
        LogWeight(positive_zero(-p.ln()))
    }

    /// Convert back to a probability: `p = exp(-w)`.
    #[inline]
    pub fn to_probability(self) -> f64 {
        (-self.0).exp()
    }

    /// Numerically stable `-ln(exp(-a) + exp(-b))`.
    #[inline]
    fn log_sum_exp(a: f64, b: f64) -> f64 {
        if a == f64::INFINITY {
            return b;
        }
        if b == f64::INFINITY {
            return a;
        }
        let min_val = a.min(b);
        min_val - (-(a - b).abs()).exp().ln_1p()
    }
}

impl Semiring for LogWeight {
    type Reverse = LogWeight;

    #[inline]
    fn zero() -> Self {
        LogWeight(f64::INFINITY)
    }

    #[inline]
    fn one() -> Self {
        LogWeight(0.0)
    }

    #[inline]
    fn no_weight() -> Self {
        LogWeight(f64::NAN)
    }

    #[inline]
    fn plus(&self, other: &Self) -> Self {
        if !self.is_member() || !other.is_member() {
            return Self::no_weight();
        }
        LogWeight(Self::log_sum_exp(self.0, other.0))
    }

    #[inline]
    fn times(&self, other: &Self) -> Self {
        if !self.is_member() || !other.is_member() {
            return Self::no_weight();
        }
        LogWeight(self.0 + other.0)
    }

    fn divide(&self, other: &Self, _divide_type: DivideType) -> Self {
        if !self.is_member() || !other.is_member() || other.is_zero() {
            Self::no_weight()
        } else if self.is_zero() {
            Self::zero()
        } else {
            LogWeight(self.0 - other.0)
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
        LogWeight(quantize_float(self.0, delta))
    }

    #[inline]
    fn reverse(&self) -> Self {
        *self
    }

    fn properties() -> Properties {
        Properties::SEMIRING | Properties::COMMUTATIVE
    }

    fn type_name() -> &'static str {
        "log"
    }
}

impl fmt::Debug for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogWeight(")?;
        format_float(f, self.0)?;
        write!(f, ")")
    }
}

impl fmt::Display for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_float(f, self.0)
    }
}

impl FromStr for LogWeight {
    type Err = WeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_float(Self::type_name(), s).map(LogWeight)
    }
}

impl PartialEq for LogWeight {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for LogWeight {}

impl PartialOrd for LogWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for LogWeight {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for LogWeight {
    fn default() -> Self {
        Self::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_weight_semiring_laws() {
        let a = LogWeight::new(2.0);
        let b = LogWeight::new(3.0);
        let z = LogWeight::zero();
        let one = LogWeight::one();

        assert!(z.plus(&a).approx_eq(&a, 1e-10));
        assert!(a.plus(&z).approx_eq(&a, 1e-10));
        assert!(one.times(&a).approx_eq(&a, 1e-10));
        assert!(a.times(&one).approx_eq(&a, 1e-10));
        assert!(z.times(&a).is_zero());
        assert!(a.times(&z).is_zero());
        assert!(a.plus(&b).approx_eq(&b.plus(&a), 1e-10));
    }

    #[test]
    fn test_log_weight_probability_roundtrip() {
        for &p in &[0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            let p_back = LogWeight::from_probability(p).to_probability();
            assert!((p - p_back).abs() < 1e-12, "roundtrip failed for p={}: got {}", p, p_back);
        }
        assert!(LogWeight::from_probability(0.0).is_zero());
    }

    #[test]
    fn test_log_weight_certain_probability_is_one() {
        assert_eq!(LogWeight::from_probability(1.0), LogWeight::one());
        assert!(LogWeight::from_probability(1.0).is_one());
        let parsed: LogWeight = "-0.0".parse().expect("valid weight");
        assert_eq!(parsed, LogWeight::one());
        assert!(parsed.is_one());
    }

    #[test]
    fn test_log_weight_non_idempotent() {
        let a = LogWeight::new(2.0);
        let expected = 2.0 - 2.0_f64.ln();
        assert!((a.plus(&a).value() - expected).abs() < 1e-10);
        assert!(!LogWeight::properties().contains(Properties::IDEMPOTENT));
    }

    #[test]
    fn test_log_weight_numerical_stability() {
        let large = LogWeight::new(1000.0);
        let small = LogWeight::new(1.0);
        let result = large.plus(&small);
        assert!((result.value() - 1.0).abs() < 1e-6);
        assert!(!result.value().is_nan());
    }

    #[test]
    fn test_log_weight_divide() {
        let a = LogWeight::new(2.0);
        let b = LogWeight::new(3.0);
        assert_eq!(a.times(&b).divide(&b, DivideType::Right), a);
        assert!(!a.divide(&LogWeight::zero(), DivideType::Left).is_member());
    }

    #[test]
    fn test_log_weight_display() {
        assert_eq!(LogWeight::new(1.5).to_string(), "1.5");
        assert_eq!(LogWeight::zero().to_string(), "Infinity");
        assert_eq!("0.25".parse::<LogWeight>(), Ok(LogWeight::new(0.25)));
    }
}
