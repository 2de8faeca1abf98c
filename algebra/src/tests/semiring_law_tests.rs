//! Property tests for the semiring laws of scalar and sparse power weights,
//! the canonical form of sparse tuples, and the power-weight products.

use proptest::prelude::*;

use crate::semiring::{DivideType, Semiring, TropicalWeight};
use crate::sparse_power::{dot_product, scalar_times, times_scalar, SparsePowerWeight};
use crate::sparse_tuple::SparseTupleWeight;

type T = TropicalWeight;
type Power = SparsePowerWeight<T, i32>;

// Integer-valued costs keep tropical arithmetic exact.
fn arb_tropical() -> impl Strategy<Value = T> {
    prop_oneof![
        9 => (0i32..50).prop_map(|v| T::new(v as f64)),
        1 => Just(T::zero()),
    ]
}

fn arb_finite_tropical() -> impl Strategy<Value = T> {
    (-20i32..50).prop_map(|v| T::new(v as f64))
}

/// Power weights with a Zero background.
fn arb_sparse_power() -> impl Strategy<Value = Power> {
    prop::collection::vec((-6i32..6, arb_tropical()), 0..8).prop_map(|pairs| Power::from_pairs(pairs))
}

/// Power weights with any background, including the lifted scalars.
fn arb_power() -> impl Strategy<Value = Power> {
    (arb_tropical(), prop::collection::vec((-6i32..6, arb_tropical()), 0..8)).prop_map(
        |(background, pairs)| {
            let mut tuple = SparseTupleWeight::uniform(background);
            for (key, weight) in pairs {
                tuple.insert(key, weight);
            }
            Power::from(tuple)
        },
    )
}

fn is_canonical(w: &Power) -> bool {
    let tuple = w.as_tuple();
    let keys: Vec<i32> = tuple.keys().collect();
    keys.windows(2).all(|pair| pair[0] < pair[1])
        && tuple.iter().all(|(_, value)| value != tuple.background())
}

/// Keys stored in either operand, plus one key outside the generated range.
fn sample_keys(a: &Power, b: &Power) -> Vec<i32> {
    let mut keys: Vec<i32> = a.as_tuple().keys().chain(b.as_tuple().keys()).collect();
    keys.push(100);
    keys.sort_unstable();
    keys.dedup();
    keys
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ── Tropical ──

    #[test]
    fn prop_tropical_plus_commutative_associative(a in arb_tropical(), b in arb_tropical(), c in arb_tropical()) {
        prop_assert_eq!(a.plus(&b), b.plus(&a));
        prop_assert_eq!(a.plus(&b).plus(&c), a.plus(&b.plus(&c)));
    }

    #[test]
    fn prop_tropical_times_distributes(a in arb_tropical(), b in arb_tropical(), c in arb_tropical()) {
        prop_assert_eq!(a.times(&b.plus(&c)), a.times(&b).plus(&a.times(&c)));
        prop_assert_eq!(b.plus(&c).times(&a), b.times(&a).plus(&c.times(&a)));
    }

    #[test]
    fn prop_tropical_identities(a in arb_tropical()) {
        prop_assert_eq!(a.plus(&T::zero()), a);
        prop_assert_eq!(a.times(&T::one()), a);
        prop_assert!(a.times(&T::zero()).is_zero());
        prop_assert_eq!(a.plus(&a), a);
    }

    #[test]
    fn prop_tropical_divide_inverts_times(a in arb_finite_tropical(), b in arb_finite_tropical()) {
        prop_assert_eq!(a.times(&b).divide(&b, DivideType::Right), a);
        prop_assert_eq!(b.times(&a).divide(&b, DivideType::Left), a);
    }

    // ── Log ──

    #[cfg(feature = "log-semiring")]
    #[test]
    fn prop_log_laws(a in 0i32..20, b in 0i32..20, c in 0i32..20) {
        use crate::semiring::LogWeight;
        let (a, b, c) = (LogWeight::new(a as f64), LogWeight::new(b as f64), LogWeight::new(c as f64));
        let tol = 1e-9;
        prop_assert!(a.plus(&b).approx_eq(&b.plus(&a), tol));
        prop_assert!(a.plus(&b).plus(&c).approx_eq(&a.plus(&b.plus(&c)), tol));
        prop_assert!(a.times(&b.plus(&c)).approx_eq(&a.times(&b).plus(&a.times(&c)), tol));
        prop_assert!(a.plus(&LogWeight::zero()).approx_eq(&a, tol));
        prop_assert!(a.times(&LogWeight::zero()).is_zero());
    }

    // ── Sparse power ──

    #[test]
    fn prop_power_results_are_canonical(a in arb_power(), b in arb_power()) {
        prop_assert!(is_canonical(&a));
        prop_assert!(is_canonical(&a.plus(&b)));
        prop_assert!(is_canonical(&a.times(&b)));
        prop_assert!(is_canonical(&a.quantize(crate::semiring::DELTA)));
    }

    #[test]
    fn prop_power_plus_commutative_associative(a in arb_power(), b in arb_power(), c in arb_power()) {
        prop_assert_eq!(a.plus(&b), b.plus(&a));
        prop_assert_eq!(a.plus(&b).plus(&c), a.plus(&b.plus(&c)));
    }

    #[test]
    fn prop_power_times_associative_distributes(a in arb_power(), b in arb_power(), c in arb_power()) {
        prop_assert_eq!(a.times(&b).times(&c), a.times(&b.times(&c)));
        prop_assert_eq!(a.times(&b.plus(&c)), a.times(&b).plus(&a.times(&c)));
    }

    #[test]
    fn prop_power_identities(a in arb_power()) {
        prop_assert_eq!(a.plus(&Power::zero()), a.clone());
        prop_assert_eq!(a.times(&Power::one()), a.clone());
        prop_assert_eq!(Power::one().times(&a), a.clone());
        prop_assert_eq!(a.times(&Power::zero()), Power::zero());
    }

    #[test]
    fn prop_power_merge_covers_key_union(a in arb_power(), b in arb_power()) {
        let sum = a.plus(&b);
        let product = a.times(&b);
        for key in sample_keys(&a, &b) {
            prop_assert_eq!(*sum.get(&key), a.get(&key).plus(b.get(&key)));
            prop_assert_eq!(*product.get(&key), a.get(&key).times(b.get(&key)));
        }
        let union = sample_keys(&a, &b);
        prop_assert!(sum.as_tuple().keys().all(|k| union.contains(&k)));
    }

    #[test]
    fn prop_dot_product_sums_per_key_products(a in arb_sparse_power(), b in arb_sparse_power()) {
        let expected = sample_keys(&a, &b)
            .iter()
            .fold(T::zero(), |acc, key| acc.plus(&a.get(key).times(b.get(key))));
        prop_assert_eq!(dot_product(&a, &b), expected);
    }

    #[test]
    fn prop_scalar_products_multiply_every_key(k in arb_tropical(), w in arb_power()) {
        let left = scalar_times(&k, &w);
        let right = times_scalar(&w, &k);
        for key in sample_keys(&w, &w) {
            prop_assert_eq!(*left.get(&key), k.times(w.get(&key)));
            prop_assert_eq!(*right.get(&key), w.get(&key).times(&k));
        }
        prop_assert!(is_canonical(&left));
    }

    #[test]
    fn prop_power_approx_eq_reflexive(a in arb_power()) {
        prop_assert!(a.approx_eq(&a, crate::semiring::DELTA));
        prop_assert!(a.approx_eq(&a.quantize(crate::semiring::DELTA), crate::semiring::DELTA));
    }
}

#[test]
fn test_power_approx_eq_respects_delta() {
    let a = Power::from_pair(1, T::new(1.0));
    let b = Power::from_pair(1, T::new(1.25));
    assert!(!a.approx_eq(&b, 0.1));
    assert!(a.approx_eq(&b, 0.5));
}

#[test]
fn test_power_of_power_keeps_laws() {
    type Nested = SparsePowerWeight<Power, i16>;
    let inner = Power::from_pairs(vec![(1, T::new(2.0)), (2, T::new(3.0))]);
    let a = Nested::from_pair(0, inner.clone());
    let b = Nested::from_pair(0, Power::from_pair(2, T::new(1.0)));
    assert_eq!(a.plus(&b), b.plus(&a));
    assert_eq!(a.times(&Nested::one()), a);
    assert_eq!(*a.plus(&b).get(&0), inner.plus(&Power::from_pair(2, T::new(1.0))));
    assert_eq!(Nested::type_name(), "tropical_^n_^n_16");
}
