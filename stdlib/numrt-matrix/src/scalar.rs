//! The scalar domain.
//!
//! Four scalar kinds are supported, ordered by widening:
//! `Boolean < Integer < Real < Complex`. Each kind implements [`Scalar`];
//! [`WidenFrom`] and [`Join`] encode the lossless conversions and the result
//! kind of mixed arithmetic.

use crate::variant::ValueType;
use num_complex::Complex64;
use std::cmp::Ordering;
use std::fmt;

/// Boolean scalar.
pub type Boolean = bool;
/// 64-bit signed integer scalar.
pub type Integer = i64;
/// IEEE 754 binary64 scalar.
pub type Real = f64;
/// Pair of reals.
pub type Complex = Complex64;

/// 2^63 as a double; the first real above the integer range.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

// ============================================================
// Kinds and dynamic values
// ============================================================

/// Scalar kind tag, ordered by widening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarKind {
    /// `bool`.
    Boolean,
    /// `i64`.
    Integer,
    /// `f64`.
    Real,
    /// `Complex64`.
    Complex,
}

impl ScalarKind {
    /// Value tag of a scalar of this kind.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::Boolean => ValueType::Boolean,
            Self::Integer => ValueType::Integer,
            Self::Real => ValueType::Real,
            Self::Complex => ValueType::Complex,
        }
    }

    /// Value tag of a matrix of this kind.
    #[must_use]
    pub const fn matrix_value_type(self) -> ValueType {
        match self {
            Self::Boolean => ValueType::MatrixBoolean,
            Self::Integer => ValueType::MatrixInteger,
            Self::Real => ValueType::MatrixReal,
            Self::Complex => ValueType::MatrixComplex,
        }
    }
}

/// A scalar of any kind.
#[derive(Clone, Copy, Debug)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Real value.
    Real(f64),
    /// Complex value.
    Complex(Complex64),
}

impl Value {
    /// Kind of the value.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::Integer(_) => ScalarKind::Integer,
            Self::Real(_) => ScalarKind::Real,
            Self::Complex(_) => ScalarKind::Complex,
        }
    }

    /// Value tag of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.kind().value_type()
    }

    /// The value as an integer, if it is a mathematical integer in range.
    #[must_use]
    pub fn to_integer(&self) -> Option<i64> {
        match *self {
            Self::Boolean(b) => Some(i64::from(b)),
            Self::Integer(i) => Some(i),
            Self::Real(x) => real_to_integer(x),
            Self::Complex(z) if z.im == 0.0 => real_to_integer(z.re),
            Self::Complex(_) => None,
        }
    }

    /// The value as a real, if it has no imaginary part.
    #[must_use]
    pub fn to_real(&self) -> Option<f64> {
        match *self {
            Self::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
            Self::Integer(i) => Some(i as f64),
            Self::Real(x) => Some(x),
            Self::Complex(z) if z.im == 0.0 => Some(z.re),
            Self::Complex(_) => None,
        }
    }

    /// The value as a complex. Always succeeds.
    #[must_use]
    pub fn to_complex(&self) -> Complex64 {
        match *self {
            Self::Complex(z) => z,
            other => Complex64::new(other.to_real().unwrap_or(f64::NAN), 0.0),
        }
    }
}

fn real_to_integer(x: f64) -> Option<i64> {
    if x.fract() == 0.0 && (-TWO_POW_63..TWO_POW_63).contains(&x) {
        Some(x as i64)
    } else {
        None
    }
}

/// Whether `value` denotes a mathematical integer in the 64-bit range.
///
/// Reals need a zero fractional part; complex values additionally need a zero
/// imaginary part.
pub fn to_integer(value: impl Into<Value>) -> Option<i64> {
    value.into().to_integer()
}

/// `base^exponent`, saturating on overflow.
///
/// Negative exponents only have integer results for `base` of `1` or `-1`;
/// other bases yield `None`.
#[must_use]
pub fn integer_pow(base: i64, exponent: i64) -> Option<i64> {
    if exponent < 0 {
        return match base {
            1 => Some(1),
            -1 => Some(if exponent % 2 == 0 { 1 } else { -1 }),
            _ => None,
        };
    }
    let exponent = u32::try_from(exponent).unwrap_or(u32::MAX);
    Some(base.saturating_pow(exponent))
}

/// Numeric equality across kinds: values are compared after widening to the
/// wider of the two kinds.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match self.kind().max(other.kind()) {
            ScalarKind::Boolean | ScalarKind::Integer => self.to_integer() == other.to_integer(),
            ScalarKind::Real => self.to_real() == other.to_real(),
            ScalarKind::Complex => self.to_complex() == other.to_complex(),
        }
    }
}

/// Complex values order lexicographically by real then imaginary part; NaN in
/// any component makes the pair incomparable.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.kind().max(other.kind()) {
            ScalarKind::Boolean | ScalarKind::Integer => {
                self.to_integer()?.partial_cmp(&other.to_integer()?)
            }
            ScalarKind::Real => self.to_real()?.partial_cmp(&other.to_real()?),
            ScalarKind::Complex => {
                let (a, b) = (self.to_complex(), other.to_complex());
                if a.re.is_nan() || a.im.is_nan() || b.re.is_nan() || b.im.is_nan() {
                    return None;
                }
                match a.re.partial_cmp(&b.re)? {
                    Ordering::Equal => a.im.partial_cmp(&b.im),
                    ord => Some(ord),
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(x) => write!(f, "{x}"),
            Self::Complex(z) => write!(f, "{z}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Complex64> for Value {
    fn from(value: Complex64) -> Self {
        Self::Complex(value)
    }
}

// ============================================================
// Scalar trait
// ============================================================

/// A coefficient type of a matrix.
pub trait Scalar:
    Copy + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static
{
    /// Kind tag.
    const KIND: ScalarKind;

    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// Addition in the kind's semiring.
    fn plus(self, rhs: Self) -> Self;

    /// Multiplication in the kind's semiring.
    fn times(self, rhs: Self) -> Self;

    /// Complex conjugate; the identity on non-complex kinds.
    #[inline]
    fn conj(self) -> Self {
        self
    }

    /// Whether the value equals the additive identity.
    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Whether the value is the additive identity bit for bit.
    ///
    /// Sparse storage omits exactly these, so a signed zero keeps its sign
    /// across layout changes.
    #[inline]
    fn is_unsigned_zero(&self) -> bool {
        self.is_zero()
    }

    /// Box into a dynamic [`Value`].
    fn to_value(self) -> Value;

    /// Value-preserving conversion from any kind.
    fn from_value(value: Value) -> Option<Self>;

    /// Total order used for storage ordering.
    fn total_cmp(&self, other: &Self) -> Ordering;
}

/// Scalars with an additive inverse.
pub trait Signed: Scalar {
    /// Additive inverse.
    fn negate(self) -> Self;
}

/// Scalars closed under division.
pub trait Field: Signed {
    /// Quotient.
    fn divide(self, rhs: Self) -> Self;
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn zero() -> Self {
        false
    }

    fn one() -> Self {
        true
    }

    fn plus(self, rhs: Self) -> Self {
        self || rhs
    }

    fn times(self, rhs: Self) -> Self {
        self && rhs
    }

    fn to_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(b),
            other => match other.to_integer()? {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Scalar for i64 {
    const KIND: ScalarKind = ScalarKind::Integer;

    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }

    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    fn times(self, rhs: Self) -> Self {
        self.saturating_mul(rhs)
    }

    fn to_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.to_integer()
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Signed for i64 {
    fn negate(self) -> Self {
        self.wrapping_neg()
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Real;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    fn to_value(self) -> Value {
        Value::Real(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.to_real()
    }

    fn is_unsigned_zero(&self) -> bool {
        self.to_bits() == 0
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

impl Signed for f64 {
    fn negate(self) -> Self {
        -self
    }
}

impl Field for f64 {
    fn divide(self, rhs: Self) -> Self {
        self / rhs
    }
}

impl Scalar for Complex64 {
    const KIND: ScalarKind = ScalarKind::Complex;

    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }

    fn one() -> Self {
        Complex64::new(1.0, 0.0)
    }

    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    fn conj(self) -> Self {
        Complex64::conj(&self)
    }

    fn to_value(self) -> Value {
        Value::Complex(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value.to_complex())
    }

    fn is_unsigned_zero(&self) -> bool {
        self.re.to_bits() == 0 && self.im.to_bits() == 0
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.re
            .total_cmp(&other.re)
            .then_with(|| self.im.total_cmp(&other.im))
    }
}

impl Signed for Complex64 {
    fn negate(self) -> Self {
        -self
    }
}

impl Field for Complex64 {
    fn divide(self, rhs: Self) -> Self {
        self / rhs
    }
}

// ============================================================
// Widening and joins
// ============================================================

/// Lossless conversion from a narrower (or equal) kind.
pub trait WidenFrom<S: Scalar>: Scalar {
    /// Convert `value` into `Self`.
    fn widen_from(value: S) -> Self;
}

macro_rules! widen {
    ($from:ty => $to:ty, |$v:ident| $body:expr) => {
        impl WidenFrom<$from> for $to {
            #[inline]
            fn widen_from($v: $from) -> Self {
                $body
            }
        }
    };
}

widen!(bool => bool, |v| v);
widen!(bool => i64, |v| i64::from(v));
widen!(bool => f64, |v| if v { 1.0 } else { 0.0 });
widen!(bool => Complex64, |v| Complex64::new(if v { 1.0 } else { 0.0 }, 0.0));
widen!(i64 => i64, |v| v);
widen!(i64 => f64, |v| v as f64);
widen!(i64 => Complex64, |v| Complex64::new(v as f64, 0.0));
widen!(f64 => f64, |v| v);
widen!(f64 => Complex64, |v| Complex64::new(v, 0.0));
widen!(Complex64 => Complex64, |v| v);

/// Result kind of arithmetic between `Self` and `Rhs`.
///
/// This is the widening join, except that it is never narrower than
/// `Integer`: summing or multiplying booleans counts, so it needs integers.
pub trait Join<Rhs: Scalar>: Scalar {
    /// The joined kind.
    type Output: Scalar + WidenFrom<Self> + WidenFrom<Rhs>;
}

macro_rules! join {
    ($($lhs:ty, $rhs:ty => $out:ty;)*) => {
        $(impl Join<$rhs> for $lhs {
            type Output = $out;
        })*
    };
}

join! {
    bool, bool => i64;
    bool, i64 => i64;
    bool, f64 => f64;
    bool, Complex64 => Complex64;
    i64, bool => i64;
    i64, i64 => i64;
    i64, f64 => f64;
    i64, Complex64 => Complex64;
    f64, bool => f64;
    f64, i64 => f64;
    f64, f64 => f64;
    f64, Complex64 => Complex64;
    Complex64, bool => Complex64;
    Complex64, i64 => Complex64;
    Complex64, f64 => Complex64;
    Complex64, Complex64 => Complex64;
}
