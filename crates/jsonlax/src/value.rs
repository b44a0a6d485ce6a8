//! JSON value types.
//!
//! This module defines the [`Value`] enum, which represents any value the
//! scanner can produce, and the [`BigNumber`] decimal representation used
//! when scanning with `use_decimal`.

use std::fmt;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::encoder::Encoder;
use crate::key::Key;
use crate::options::EncoderOptions;

/// An ordered sequence of values.
pub type Array = Vec<Value>;

/// An ordered mapping from [`Key`] to [`Value`].
///
/// Insertion order is preserved; equality is order-insensitive.
pub type Object = IndexMap<Key, Value>;

/// A JSON value in the permissive superset this crate accepts.
///
/// # Examples
///
/// ```
/// use jsonlax::{Key, Object, Value};
///
/// let mut map = Object::new();
/// map.insert(Key::from("key"), Value::from("value"));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key": "value"}"#);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The `null` literal.
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// An arbitrary-precision integer.
    Int(BigInt),
    /// An IEEE-754 binary64 number.
    Float(f64),
    /// A decimal number, produced by scanning with `use_decimal`.
    BigNumber(BigNumber),
    /// A decoded string.
    Str(String),
    /// An ordered sequence.
    Array(Array),
    /// An ordered mapping.
    Object(Object),
}

/// A decimal number that can also hold the non-finite values the
/// permissive grammar names.
///
/// `bigdecimal` has no representation for infinities or NaN, so those are
/// separate variants; scanning `NaN` or `Infinity` with both
/// `allow_nan_and_infinity` and `use_decimal` produces them.
#[derive(Clone, Debug, PartialEq)]
pub enum BigNumber {
    /// A finite decimal.
    Finite(BigDecimal),
    /// Positive or negative infinity.
    Infinity {
        /// Whether this is `-Infinity`.
        negative: bool,
    },
    /// Not-a-number. A signaling NaN is never serializable.
    Nan {
        /// Whether this is a signaling NaN.
        signaling: bool,
    },
}

impl BigNumber {
    /// Returns `true` for the [`Finite`](BigNumber::Finite) variant.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        matches!(self, BigNumber::Finite(_))
    }

    /// Returns `true` for either NaN variant.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        matches!(self, BigNumber::Nan { .. })
    }

    /// Returns `true` for a signaling NaN.
    #[must_use]
    pub fn is_signaling(&self) -> bool {
        matches!(self, BigNumber::Nan { signaling: true })
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BigNumber::Finite(d) => d.fmt(f),
            BigNumber::Infinity { negative: false } => f.write_str("Infinity"),
            BigNumber::Infinity { negative: true } => f.write_str("-Infinity"),
            BigNumber::Nan { signaling: false } => f.write_str("NaN"),
            BigNumber::Nan { signaling: true } => f.write_str("sNaN"),
        }
    }
}

impl From<BigDecimal> for BigNumber {
    fn from(d: BigDecimal) -> Self {
        BigNumber::Finite(d)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(BigInt::from(v))
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Self::BigNumber(BigNumber::Finite(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Bool`].
    ///
    /// [`Bool`]: Value::Bool
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` for any of the numeric variants.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonlax::Value;
    ///
    /// assert!(Value::Float(42.0).is_number());
    /// assert!(Value::from(42i64).is_number());
    /// assert!(!Value::Null.is_number());
    /// ```
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(..) | Self::Float(..) | Self::BigNumber(..))
    }

    /// Returns `true` if the value is [`Str`].
    ///
    /// [`Str`]: Value::Str
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Str(..))
    }

    /// Returns `true` if the value is [`Array`].
    ///
    /// [`Array`]: Value::Array
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is [`Object`].
    ///
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }
}

/// Formats the value as compact JSON.
///
/// Non-finite numbers print as `NaN`/`Infinity`/`-Infinity` and scalar
/// keys are coerced to text; only a signaling NaN decimal, which has no
/// textual form, makes formatting fail.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoder = Encoder::new(EncoderOptions {
            allow_nan_and_infinity: true,
            allow_non_str_keys: true,
            ..EncoderOptions::default()
        });
        match encoder.encode(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}
