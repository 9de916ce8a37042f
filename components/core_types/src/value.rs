//! JavaScript value representation.
//!
//! This module provides the core `Value` enum that represents every
//! JavaScript value as a small `Copy` tagged variant. Primitive values are
//! stored inline, while strings and objects are referenced through a
//! [`HeapRef`] into the engine's managed heap.

use num_traits::ToPrimitive;

use crate::heap_ref::HeapRef;
use crate::number;

/// Represents any JavaScript value.
///
/// # Tagged Representation
///
/// The variant is the tag and the payload is stored next to it:
/// - `Integer` is the unboxed fast path for numbers that are integral, fit in
///   32 bits and are not `-0`
/// - `Double` holds every other number
/// - `String` and `Object` hold a reference into the managed heap
/// - `Empty` is the transient "hole / not yet bound" sentinel and never
///   escapes to script code
///
/// A compact 64-bit NaN-boxed form is available through [`Value::encode`].
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let number = Value::from_number(42.0);
/// assert!(number.is_integer());
/// assert_eq!(number.type_of(), "number");
///
/// let fraction = Value::from_number(0.5);
/// assert!(fraction.is_double());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer (fits in 32 bits, unboxed fast path)
    Integer(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// Interned heap string
    String(HeapRef),
    /// Heap object (plain object, array, function, wrapper, ...)
    Object(HeapRef),
    /// Hole / unbound marker used inside storage, never a script value
    Empty,
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::from_number(n)
    }
}

impl Value {
    /// Canonical NaN value.
    pub const NAN: Value = Value::Double(f64::NAN);

    /// Creates a number value, choosing the integer fast path when the
    /// number is integral, within `i32` range and not negative zero.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::from_number(7.0), Value::Integer(7));
    /// assert!(Value::from_number(-0.0).is_double());
    /// assert!(Value::from_number(4294967296.0).is_double());
    /// ```
    pub fn from_number(n: f64) -> Value {
        if n.fract() == 0.0 && !(n == 0.0 && n.is_sign_negative()) {
            if let Some(i) = n.to_i32() {
                return Value::Integer(i);
            }
        }
        Value::Double(n)
    }

    /// Creates a number value from an unsigned 32-bit integer.
    pub fn from_u32(n: u32) -> Value {
        match i32::try_from(n) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Double(f64::from(n)),
        }
    }

    /// Returns true for `undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `null` or `undefined`.
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Returns true for booleans.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Returns true when the number is stored on the integer fast path.
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Returns true when the number is stored as a double.
    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    /// Returns true for either number representation.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Double(_))
    }

    /// Returns true when the value references the managed heap.
    pub fn is_managed(&self) -> bool {
        matches!(self, Value::String(_) | Value::Object(_))
    }

    /// Returns true for heap strings.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns true for heap objects.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns true for the internal hole marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Returns true for any primitive (non-object, non-empty) value.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Object(_) | Value::Empty)
    }

    /// Returns true when the value is a number and that number is NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Double(d) if d.is_nan())
    }

    /// Returns the boolean payload.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload of the fast path.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the double payload.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the numeric value of either number representation.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(f64::from(*i)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the heap reference of a string or object.
    pub fn as_heap_ref(&self) -> Option<HeapRef> {
        match self {
            Value::String(r) | Value::Object(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the heap reference of a string.
    pub fn as_string(&self) -> Option<HeapRef> {
        match self {
            Value::String(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the heap reference of an object.
    pub fn as_object(&self) -> Option<HeapRef> {
        match self {
            Value::Object(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the JavaScript `typeof` result.
    ///
    /// Functions report `"object"` here because callability lives on the
    /// heap; the engine refines this to `"function"`.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined | Value::Empty => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// ToNumber for primitives that need no heap access.
    ///
    /// Returns `None` for strings and objects.
    pub fn to_number_primitive(&self) -> Option<f64> {
        match self {
            Value::Undefined | Value::Empty => Some(f64::NAN),
            Value::Null => Some(0.0),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Integer(i) => Some(f64::from(*i)),
            Value::Double(d) => Some(*d),
            Value::String(_) | Value::Object(_) => None,
        }
    }

    /// Strict Equality Comparison (`===`).
    ///
    /// Strings are interned by the heap, so equal strings share a reference
    /// and compare by identity. NaN is never equal to itself and `+0`
    /// equals `-0`.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::NAN.strict_equals(&Value::NAN));
    /// assert!(Value::Integer(0).strict_equals(&Value::Double(-0.0)));
    /// assert!(!Value::Integer(1).strict_equals(&Value::Boolean(true)));
    /// ```
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            _ if self.is_number() && other.is_number() => {
                self.as_number() == other.as_number()
            }
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Empty, Value::Empty) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }

    /// SameValue: like strict equality but NaN equals NaN and `+0 != -0`.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            _ => self.strict_equals(other),
        }
    }

    /// SameValueZero: like SameValue but `+0` equals `-0`.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => (a.is_nan() && b.is_nan()) || a == b,
            _ => self.strict_equals(other),
        }
    }

    /// Integer-fast-path addition; falls back to double on overflow.
    ///
    /// Returns `None` unless both operands are numbers.
    pub fn add(&self, other: &Value) -> Option<Value> {
        number::add(self, other)
    }

    /// Integer-fast-path subtraction; falls back to double on overflow.
    pub fn sub(&self, other: &Value) -> Option<Value> {
        number::sub(self, other)
    }

    /// Integer-fast-path multiplication; falls back to double on overflow
    /// or negative-zero results.
    pub fn mul(&self, other: &Value) -> Option<Value> {
        number::mul(self, other)
    }
}
