//! Compact NaN-boxed encoding of [`Value`].
//!
//! Every value fits in one 64-bit word:
//!
//! ```text
//! non-NaN double   stored verbatim
//! NaN              0x7FF8_0000_0000_0000 (canonical, positive quiet NaN)
//! tagged kinds     0xFFFx_pppp_pppp_pppp
//!                  top 16 bits = tag, low 48 bits = payload
//! ```
//!
//! Tagged kinds live in the negative quiet-NaN space. Since every NaN double
//! is canonicalised to the positive quiet NaN before encoding, no double can
//! collide with a tag.

use crate::heap_ref::HeapRef;
use crate::value::Value;

const TAG_SHIFT: u32 = 48;
const PAYLOAD_MASK: u64 = (1 << TAG_SHIFT) - 1;
const CANONICAL_NAN: u64 = 0x7FF8_0000_0000_0000;

const TAG_INTEGER: u64 = 0xFFF9;
const TAG_BOOLEAN: u64 = 0xFFFA;
const TAG_NULL: u64 = 0xFFFB;
const TAG_UNDEFINED: u64 = 0xFFFC;
const TAG_EMPTY: u64 = 0xFFFD;
const TAG_STRING: u64 = 0xFFFE;
const TAG_OBJECT: u64 = 0xFFFF;

/// Raw 64-bit NaN-boxed form of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawValue(u64);

impl RawValue {
    /// Wraps raw bits. Any bit pattern decodes to some value.
    pub const fn from_bits(bits: u64) -> Self {
        RawValue(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    const fn tagged(tag: u64, payload: u64) -> Self {
        RawValue((tag << TAG_SHIFT) | (payload & PAYLOAD_MASK))
    }

    fn tag(self) -> u64 {
        self.0 >> TAG_SHIFT
    }

    fn payload(self) -> u64 {
        self.0 & PAYLOAD_MASK
    }

    /// Decodes the word back into a [`Value`].
    ///
    /// Bit patterns in the tag space that no encoder produces (tag `0xFFF8`)
    /// are negative NaNs and decode as NaN.
    pub fn decode(self) -> Value {
        match self.tag() {
            TAG_INTEGER => Value::Integer(self.payload() as u32 as i32),
            TAG_BOOLEAN => Value::Boolean(self.payload() != 0),
            TAG_NULL => Value::Null,
            TAG_UNDEFINED => Value::Undefined,
            TAG_EMPTY => Value::Empty,
            TAG_STRING => Value::String(unpack_ref(self.payload())),
            TAG_OBJECT => Value::Object(unpack_ref(self.payload())),
            _ => Value::Double(f64::from_bits(self.0)),
        }
    }
}

fn pack_ref(r: HeapRef) -> u64 {
    (u64::from(r.generation()) << 32) | u64::from(r.raw_index())
}

fn unpack_ref(payload: u64) -> HeapRef {
    HeapRef::new(payload as u32, (payload >> 32) as u16)
}

impl Value {
    /// Encodes the value into its NaN-boxed word.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let v = Value::Integer(-5);
    /// assert_eq!(v.encode().decode(), v);
    /// assert!(Value::Double(f64::NAN).encode().decode().is_nan());
    /// ```
    pub fn encode(&self) -> RawValue {
        match *self {
            Value::Integer(i) => RawValue::tagged(TAG_INTEGER, u64::from(i as u32)),
            Value::Boolean(b) => RawValue::tagged(TAG_BOOLEAN, u64::from(b)),
            Value::Null => RawValue::tagged(TAG_NULL, 0),
            Value::Undefined => RawValue::tagged(TAG_UNDEFINED, 0),
            Value::Empty => RawValue::tagged(TAG_EMPTY, 0),
            Value::String(r) => RawValue::tagged(TAG_STRING, pack_ref(r)),
            Value::Object(r) => RawValue::tagged(TAG_OBJECT, pack_ref(r)),
            Value::Double(d) if d.is_nan() => RawValue(CANONICAL_NAN),
            Value::Double(d) => RawValue(d.to_bits()),
        }
    }
}
