//! Core JavaScript value types and error handling.
//!
//! This crate provides the foundational types for the engine core,
//! including value representation, its compact raw encoding, property keys,
//! numeric conversions and the error taxonomy. It has no knowledge of the
//! heap beyond the [`HeapRef`] handle type.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`RawValue`] - NaN-boxed 64-bit encoding of a `Value`
//! - [`HeapRef`] / [`PropertyKey`] - references into the managed heap
//! - [`ErrorKind`] / [`JsError`] - JavaScript errors
//! - [`JsResult`] / [`PendingException`] - exception propagation
//!
//! # Examples
//!
//! ```
//! use core_types::{Value, JsError, ErrorKind};
//!
//! let sum = Value::Integer(i32::MAX).add(&Value::Integer(1)).unwrap();
//! assert_eq!(sum, Value::Double(2147483648.0));
//!
//! let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod heap_ref;
mod number;
mod raw;
mod value;

pub use error::{ErrorKind, JsError, JsResult, PendingException};
pub use heap_ref::{parse_array_index, HeapRef, PropertyKey, MAX_ARRAY_INDEX};
pub use number::{
    number_to_string, string_to_number, to_int32, to_integer_or_infinity, to_uint16, to_uint32,
};
pub use raw::RawValue;
pub use value::Value;

/// Integer fast-path arithmetic helpers.
pub mod arith {
    pub use crate::number::{add, mul, neg, sub};
}
