//! Runtime-tagged values and the auxiliary index containers.
//!
//! [`Variant`] is the dynamically typed value crossing the boundary to the
//! host language. [`Range`], [`Set`] and [`Tuple`] are the sequence kinds
//! accepted by matrix indexing.

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::{BooleanMatrix, ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};
use crate::scalar::{Scalar, Value};
use num_complex::Complex64;
use std::fmt;

// ============================================================
// Value tags
// ============================================================

/// Tag identifying the kind of a [`Variant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value.
    None,
    /// Any variant.
    Variant,
    /// Boolean scalar.
    Boolean,
    /// Integer scalar.
    Integer,
    /// Real scalar.
    Real,
    /// Complex scalar.
    Complex,
    /// Set.
    Set,
    /// Tuple.
    Tuple,
    /// Range.
    Range,
    /// Boolean matrix.
    MatrixBoolean,
    /// Integer matrix.
    MatrixInteger,
    /// Real matrix.
    MatrixReal,
    /// Complex matrix.
    MatrixComplex,
}

impl ValueType {
    /// External tag spelling.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Variant => "VARIANT",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Complex => "COMPLEX",
            Self::Set => "SET",
            Self::Tuple => "TUPLE",
            Self::Range => "RANGE",
            Self::MatrixBoolean => "MATRIX_BOOLEAN",
            Self::MatrixInteger => "MATRIX_INTEGER",
            Self::MatrixReal => "MATRIX_REAL",
            Self::MatrixComplex => "MATRIX_COMPLEX",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================
// Range
// ============================================================

/// Arithmetic sequence `first, first + step, ...` not passing `last`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    first: i64,
    step: i64,
    last: i64,
}

impl Range {
    /// `[first, last]` with step 1.
    #[must_use]
    pub const fn new(first: i64, last: i64) -> Self {
        Self {
            first,
            step: 1,
            last,
        }
    }

    /// `[first, second, ..., last]`; the step is `second - first`.
    pub fn with_second(first: i64, second: i64, last: i64) -> MatrixResult<Self> {
        let step = second
            .checked_sub(first)
            .ok_or_else(|| MatrixError::parameter("range step overflows"))?;
        if step == 0 {
            return Err(MatrixError::parameter("range step must be non-zero"));
        }
        Ok(Self { first, step, last })
    }

    /// First term.
    #[must_use]
    pub const fn first(&self) -> i64 {
        self.first
    }

    /// Distance between consecutive terms.
    #[must_use]
    pub const fn step(&self) -> i64 {
        self.step
    }

    /// Bound of the sequence (inclusive when reached exactly).
    #[must_use]
    pub const fn last(&self) -> i64 {
        self.last
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        let (first, step, last) = (
            i128::from(self.first),
            i128::from(self.step),
            i128::from(self.last),
        );
        let span = last - first;
        if span != 0 && (span < 0) != (step < 0) {
            return 0;
        }
        usize::try_from(span / step + 1).unwrap_or(usize::MAX)
    }

    /// Whether the range has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Term `k`, 1-based.
    #[must_use]
    pub fn get(&self, k: usize) -> Option<i64> {
        if k == 0 || k > self.len() {
            return None;
        }
        let offset = i128::from(self.step) * (k as i128 - 1);
        i64::try_from(i128::from(self.first) + offset).ok()
    }

    /// Terms in order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        (1..=self.len()).filter_map(move |k| self.get(k))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "[{}..{}]", self.first, self.last)
        } else {
            write!(f, "[{}, {}..{}]", self.first, self.first.wrapping_add(self.step), self.last)
        }
    }
}

// ============================================================
// Set
// ============================================================

/// Collection of distinct scalar values.
///
/// Iteration follows insertion order, which is stable for a given set.
#[derive(Clone, Debug, Default)]
pub struct Set {
    items: Vec<Value>,
}

impl Set {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`; returns `false` if a numerically equal value is present.
    pub fn insert(&mut self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Whether a numerically equal value is present.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item == value)
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}

impl<V: Into<Value>> FromIterator<V> for Set {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|v| other.contains(v))
    }
}

// ============================================================
// Tuple
// ============================================================

/// Ordered sequence of variants, 1-based.
#[derive(Clone, Debug, Default)]
pub struct Tuple {
    items: Vec<Variant>,
}

impl Tuple {
    /// Empty tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element.
    pub fn push(&mut self, item: impl Into<Variant>) {
        self.items.push(item.into());
    }

    /// Element `k`, 1-based.
    #[must_use]
    pub fn get(&self, k: usize) -> Option<&Variant> {
        k.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the tuple is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.items.iter()
    }
}

impl<V: Into<Variant>> FromIterator<V> for Tuple {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================
// Variant
// ============================================================

/// Dynamically typed value.
#[derive(Clone, Debug, Default)]
pub enum Variant {
    /// No value.
    #[default]
    None,
    /// Boolean scalar.
    Boolean(bool),
    /// Integer scalar.
    Integer(i64),
    /// Real scalar.
    Real(f64),
    /// Complex scalar.
    Complex(Complex64),
    /// Set of scalars.
    Set(Set),
    /// Tuple of variants.
    Tuple(Tuple),
    /// Integer range.
    Range(Range),
    /// Boolean matrix.
    MatrixBoolean(BooleanMatrix),
    /// Integer matrix.
    MatrixInteger(IntegerMatrix),
    /// Real matrix.
    MatrixReal(RealMatrix),
    /// Complex matrix.
    MatrixComplex(ComplexMatrix),
}

impl Variant {
    /// Tag of the carried value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Real(_) => ValueType::Real,
            Self::Complex(_) => ValueType::Complex,
            Self::Set(_) => ValueType::Set,
            Self::Tuple(_) => ValueType::Tuple,
            Self::Range(_) => ValueType::Range,
            Self::MatrixBoolean(_) => ValueType::MatrixBoolean,
            Self::MatrixInteger(_) => ValueType::MatrixInteger,
            Self::MatrixReal(_) => ValueType::MatrixReal,
            Self::MatrixComplex(_) => ValueType::MatrixComplex,
        }
    }

    /// The carried scalar, if this is a scalar variant.
    #[must_use]
    pub fn scalar(&self) -> Option<Value> {
        match *self {
            Self::Boolean(b) => Some(Value::Boolean(b)),
            Self::Integer(i) => Some(Value::Integer(i)),
            Self::Real(x) => Some(Value::Real(x)),
            Self::Complex(z) => Some(Value::Complex(z)),
            _ => None,
        }
    }

    /// Convert to a scalar of kind `S`, preserving the value.
    pub fn to_scalar<S: Scalar>(&self) -> MatrixResult<S> {
        self.scalar()
            .and_then(S::from_value)
            .ok_or(MatrixError::InvalidRuntimeConversion {
                from: self.value_type(),
                to: S::KIND.value_type(),
            })
    }
}

impl From<Value> for Variant {
    fn from(value: Value) -> Self {
        match value {
            Value::Boolean(b) => Self::Boolean(b),
            Value::Integer(i) => Self::Integer(i),
            Value::Real(x) => Self::Real(x),
            Value::Complex(z) => Self::Complex(z),
        }
    }
}

macro_rules! variant_from {
    ($($ty:ty => $arm:ident),* $(,)?) => {
        $(impl From<$ty> for Variant {
            fn from(value: $ty) -> Self {
                Self::$arm(value)
            }
        })*
    };
}

variant_from! {
    bool => Boolean,
    i64 => Integer,
    f64 => Real,
    Complex64 => Complex,
    Set => Set,
    Tuple => Tuple,
    Range => Range,
    Matrix<bool> => MatrixBoolean,
    Matrix<i64> => MatrixInteger,
    Matrix<f64> => MatrixReal,
    Matrix<Complex64> => MatrixComplex,
}
