//! Sparse key-indexed tuples of semiring weights.
//!
//! A `SparseTupleWeight<W, K>` maps integer keys to weights. Every key that is
//! not stored explicitly reads as the tuple's *background* value. Ordinary
//! sparse tuples have a `W::zero()` background; the multiplicative identity is
//! the tuple whose background is `W::one()`; a scalar `k` lifted into a tuple
//! has background `k`. No key value is reserved.
//!
//! ## Canonical form
//!
//! - explicit entries are sorted by key, with no duplicate keys
//! - no explicit entry equals the background
//!
//! Every constructor and mutator restores this form, so structural equality is
//! semantic equality.
//!
//! ## Merge
//!
//! All element-wise operations (`plus`, `times`, `divide`, `approx_eq`) go
//! through [`SparseTupleWeight::map`], a single ordered merge over the union of
//! both key sets, parameterized by a [`TupleMapper`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::semiring::{DivideType, Semiring, WeightParseError};

/// Separator between elements in the text form.
pub const WEIGHT_SEPARATOR: char = ',';

// ══════════════════════════════════════════════════════════════════════════════
// Keys
// ══════════════════════════════════════════════════════════════════════════════

/// Signed integer key type of a sparse tuple.
pub trait TupleKey:
    Copy + Ord + Hash + fmt::Debug + fmt::Display + FromStr + Send + Sync + 'static
{
    /// Width of the key in bits.
    const BITS: u32;
}

macro_rules! impl_tuple_key {
    ($($t:ty),*) => {
        $(
            impl TupleKey for $t {
                const BITS: u32 = <$t>::BITS;
            }
        )*
    };
}

impl_tuple_key!(i8, i16, i32, i64);

// ══════════════════════════════════════════════════════════════════════════════
// Mappers
// ══════════════════════════════════════════════════════════════════════════════

/// Per-key combining rule for [`SparseTupleWeight::map`].
///
/// `key` is `None` when combining the two backgrounds.
pub trait TupleMapper<W, K> {
    /// Combine the values both operands hold at `key`.
    fn map(&self, key: Option<K>, v1: &W, v2: &W) -> W;
}

/// `v1 ⊕ v2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlusMapper;

impl<W: Semiring, K> TupleMapper<W, K> for PlusMapper {
    #[inline]
    fn map(&self, _key: Option<K>, v1: &W, v2: &W) -> W {
        v1.plus(v2)
    }
}

/// `v1 ⊗ v2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimesMapper;

impl<W: Semiring, K> TupleMapper<W, K> for TimesMapper {
    #[inline]
    fn map(&self, _key: Option<K>, v1: &W, v2: &W) -> W {
        v1.times(v2)
    }
}

/// `v1 ⊘ v2` on the configured side.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivideMapper(pub DivideType);

impl<W: Semiring, K> TupleMapper<W, K> for DivideMapper {
    #[inline]
    fn map(&self, _key: Option<K>, v1: &W, v2: &W) -> W {
        v1.divide(v2, self.0)
    }
}

/// `v1 ⊘ v2` on the configured side, with a `Zero` divisor yielding `Zero`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivideOrZeroMapper(pub DivideType);

impl<W: Semiring, K> TupleMapper<W, K> for DivideOrZeroMapper {
    #[inline]
    fn map(&self, _key: Option<K>, v1: &W, v2: &W) -> W {
        v1.divide_or_zero(v2, self.0)
    }
}

/// `One` where the operands are approximately equal, `Zero` elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMapper {
    /// Tolerance passed to `Semiring::approx_eq`.
    pub delta: f64,
}

impl<W: Semiring, K> TupleMapper<W, K> for ApproxMapper {
    #[inline]
    fn map(&self, _key: Option<K>, v1: &W, v2: &W) -> W {
        if v1.approx_eq(v2, self.delta) {
            W::one()
        } else {
            W::zero()
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// SparseTupleWeight
// ══════════════════════════════════════════════════════════════════════════════

/// Classification of a tuple by its background and explicit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleKind {
    /// Zero background, no explicit entries: the additive identity.
    Zero,
    /// One background, no explicit entries: the multiplicative identity.
    One,
    /// Anything else.
    Sparse,
}

/// A sparse tuple of weights indexed by integer keys.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseTupleWeight<W, K = i32> {
    background: W,
    entries: Vec<(K, W)>,
}

impl<W: Semiring, K: TupleKey> SparseTupleWeight<W, K> {
    /// The empty tuple: every key reads as `W::zero()`.
    pub fn new() -> Self {
        Self::uniform(W::zero())
    }

    /// The additive identity.
    pub fn zero() -> Self {
        Self::uniform(W::zero())
    }

    /// The multiplicative identity: every key reads as `W::one()`.
    pub fn one() -> Self {
        Self::uniform(W::one())
    }

    /// A tuple reading as `W::no_weight()` everywhere.
    pub fn no_weight() -> Self {
        Self::uniform(W::no_weight())
    }

    /// A tuple with no explicit entries whose every key reads as `background`.
    pub fn uniform(background: W) -> Self {
        SparseTupleWeight { background, entries: Vec::new() }
    }

    /// A zero-background tuple holding `weight` at `key`.
    pub fn from_pair(key: K, weight: W) -> Self {
        let mut tuple = Self::new();
        tuple.push(key, weight);
        tuple
    }

    /// A zero-background tuple built from `(key, weight)` pairs in any order.
    ///
    /// Repeated keys keep the last weight given for them; Zero weights are
    /// dropped.
    pub fn from_pairs<I: IntoIterator<Item = (K, W)>>(pairs: I) -> Self {
        let mut sorted: Vec<(K, W)> = pairs.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut deduped: Vec<(K, W)> = Vec::with_capacity(sorted.len());
        for (key, weight) in sorted {
            match deduped.last_mut() {
                Some(last) if last.0 == key => last.1 = weight,
                _ => deduped.push((key, weight)),
            }
        }

        let mut tuple = Self::new();
        for (key, weight) in deduped {
            tuple.push(key, weight);
        }
        tuple
    }

    /// Set the value at `key`, keeping the canonical form.
    pub fn insert(&mut self, key: K, weight: W) {
        match self.entries.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(pos) if weight == self.background => {
                self.entries.remove(pos);
            },
            Ok(pos) => self.entries[pos].1 = weight,
            Err(_) if weight == self.background => {},
            Err(pos) => self.entries.insert(pos, (key, weight)),
        }
    }

    /// Append an entry whose key is greater than every stored key.
    fn push(&mut self, key: K, weight: W) {
        debug_assert!(self.entries.last().map_or(true, |(last, _)| *last < key));
        if weight != self.background {
            self.entries.push((key, weight));
        }
    }

    /// The value at `key` (the background if not stored explicitly).
    pub fn get(&self, key: &K) -> &W {
        match self.entries.binary_search_by(|(k, _)| k.cmp(key)) {
            Ok(pos) => &self.entries[pos].1,
            Err(_) => &self.background,
        }
    }

    /// The value every key without an explicit entry reads as.
    pub fn background(&self) -> &W {
        &self.background
    }

    /// Explicit entries in ascending key order.
    pub fn iter(&self) -> std::slice::Iter<'_, (K, W)> {
        self.entries.iter()
    }

    /// Keys of the explicit entries in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tuple has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zero / One / Sparse classification.
    pub fn kind(&self) -> TupleKind {
        if !self.entries.is_empty() {
            TupleKind::Sparse
        } else if self.background.is_zero() {
            TupleKind::Zero
        } else if self.background.is_one() {
            TupleKind::One
        } else {
            TupleKind::Sparse
        }
    }

    /// Merge two tuples key by key.
    ///
    /// The result background is `mapper(None, b1, b2)`. Each key stored in
    /// either operand is visited once, in ascending order; a key missing from
    /// one operand reads that operand's background. Results equal to the
    /// result background are not stored.
    pub fn map<M: TupleMapper<W, K>>(&self, other: &Self, mapper: &M) -> Self {
        let background = mapper.map(None, &self.background, &other.background);
        let mut result = SparseTupleWeight {
            background,
            entries: Vec::with_capacity(self.entries.len().max(other.entries.len())),
        };

        let (mut i, mut j) = (0, 0);
        loop {
            let (key, value) = match (self.entries.get(i), other.entries.get(j)) {
                (Some((k1, v1)), Some((k2, v2))) => match k1.cmp(k2) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                        (*k1, mapper.map(Some(*k1), v1, v2))
                    },
                    Ordering::Less => {
                        i += 1;
                        (*k1, mapper.map(Some(*k1), v1, &other.background))
                    },
                    Ordering::Greater => {
                        j += 1;
                        (*k2, mapper.map(Some(*k2), &self.background, v2))
                    },
                },
                (Some((k1, v1)), None) => {
                    i += 1;
                    (*k1, mapper.map(Some(*k1), v1, &other.background))
                },
                (None, Some((k2, v2))) => {
                    j += 1;
                    (*k2, mapper.map(Some(*k2), &self.background, v2))
                },
                (None, None) => break,
            };
            result.push(key, value);
        }

        result
    }

    /// Element-wise `⊕`.
    pub fn plus(&self, other: &Self) -> Self {
        self.map(other, &PlusMapper)
    }

    /// Element-wise `⊗`.
    pub fn times(&self, other: &Self) -> Self {
        self.map(other, &TimesMapper)
    }

    /// Element-wise division.
    pub fn divide(&self, other: &Self, divide_type: DivideType) -> Self {
        self.map(other, &DivideMapper(divide_type))
    }

    /// Element-wise division where each `Zero` divisor yields `Zero`.
    pub fn divide_or_zero(&self, other: &Self, divide_type: DivideType) -> Self {
        self.map(other, &DivideOrZeroMapper(divide_type))
    }

    /// Whether every aligned value (backgrounds included) is approximately
    /// equal. A stored Zero-equivalent value and an absent key are
    /// indistinguishable.
    pub fn approx_eq(&self, other: &Self, delta: f64) -> bool {
        self.map(other, &ApproxMapper { delta }).kind() == TupleKind::One
    }

    /// Whether the background and every entry are semiring members.
    pub fn is_member(&self) -> bool {
        self.background.is_member() && self.entries.iter().all(|(_, w)| w.is_member())
    }

    /// Quantize the background and every entry.
    pub fn quantize(&self, delta: f64) -> Self {
        let mut result = Self::uniform(self.background.quantize(delta));
        for (key, weight) in &self.entries {
            result.push(*key, weight.quantize(delta));
        }
        result
    }

    /// Reverse the background and every entry.
    pub fn reverse(&self) -> SparseTupleWeight<W::Reverse, K> {
        let mut result = SparseTupleWeight::<W::Reverse, K>::uniform(self.background.reverse());
        for (key, weight) in &self.entries {
            result.push(*key, weight.reverse());
        }
        result
    }
}

impl<W: Semiring, K: TupleKey> Default for SparseTupleWeight<W, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Semiring, K: TupleKey> FromIterator<(K, W)> for SparseTupleWeight<W, K> {
    fn from_iter<I: IntoIterator<Item = (K, W)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a, W, K> IntoIterator for &'a SparseTupleWeight<W, K> {
    type Item = &'a (K, W);
    type IntoIter = std::slice::Iter<'a, (K, W)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<W: Hash, K: Hash> Hash for SparseTupleWeight<W, K> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.background.hash(state);
        self.entries.hash(state);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Text form: `background,k1,v1,k2,v2,...`
// ══════════════════════════════════════════════════════════════════════════════

fn write_element(f: &mut fmt::Formatter<'_>, element: &dyn fmt::Display) -> fmt::Result {
    let text = element.to_string();
    if text.contains(WEIGHT_SEPARATOR) {
        write!(f, "({})", text)
    } else {
        write!(f, "{}", text)
    }
}

impl<W: Semiring, K: TupleKey> fmt::Display for SparseTupleWeight<W, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, &self.background)?;
        for (key, weight) in &self.entries {
            write!(f, "{}{}{}", WEIGHT_SEPARATOR, key, WEIGHT_SEPARATOR)?;
            write_element(f, weight)?;
        }
        Ok(())
    }
}

/// Split `text` on separators outside parentheses, stripping one level of
/// enclosing parentheses from each element.
pub(crate) fn split_elements(text: &str) -> Option<Vec<&str>> {
    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            c if c == WEIGHT_SEPARATOR && depth == 0 => {
                elements.push(&text[start..idx]);
                start = idx + ch.len_utf8();
            },
            _ => {},
        }
    }
    if depth != 0 {
        return None;
    }
    elements.push(&text[start..]);

    Some(
        elements
            .into_iter()
            .map(|e| {
                let e = e.trim();
                e.strip_prefix('(').and_then(|inner| inner.strip_suffix(')')).unwrap_or(e)
            })
            .collect(),
    )
}

impl<W: Semiring, K: TupleKey> FromStr for SparseTupleWeight<W, K> {
    type Err = WeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &'static str| WeightParseError::Malformed {
            weight_type: "sparse_tuple".to_string(),
            text: s.to_string(),
            reason,
        };

        let elements = split_elements(s).ok_or_else(|| malformed("unbalanced parentheses"))?;
        let (background, rest) = elements.split_first().ok_or_else(|| malformed("empty"))?;
        if rest.len() % 2 != 0 {
            return Err(malformed("key without a value"));
        }

        let mut tuple = Self::uniform(background.parse::<W>()?);
        for pair in rest.chunks(2) {
            let key = pair[0]
                .parse::<K>()
                .map_err(|_| WeightParseError::invalid("sparse_tuple key", pair[0]))?;
            tuple.insert(key, pair[1].parse::<W>()?);
        }
        Ok(tuple)
    }
}
