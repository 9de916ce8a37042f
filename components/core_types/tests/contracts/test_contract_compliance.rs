//! Contract compliance tests for core_types
//!
//! These tests pin the public surface other components build on.

use core_types::{
    arith, ErrorKind, HeapRef, JsError, JsResult, PendingException, PropertyKey, RawValue, Value,
    MAX_ARRAY_INDEX,
};

#[cfg(test)]
mod value_contract_tests {
    use super::*;

    /// Contract: Value has exactly the tagged variants and is Copy
    #[test]
    fn test_value_variants_are_copy() {
        let r = HeapRef::new(0, 0);
        let values = [
            Value::Undefined,
            Value::Null,
            Value::Boolean(true),
            Value::Integer(0),
            Value::Double(0.5),
            Value::String(r),
            Value::Object(r),
            Value::Empty,
        ];
        let copy = values;
        assert_eq!(copy.len(), 8);
        assert_eq!(values[3], copy[3]);
    }

    /// Contract: RawValue is one machine word
    #[test]
    fn test_raw_value_is_64_bits() {
        assert_eq!(std::mem::size_of::<RawValue>(), 8);
    }

    /// Contract: managed refs survive the raw encoding with their generation
    #[test]
    fn test_raw_encoding_keeps_generation() {
        let r = HeapRef::new(123_456, 77);
        assert_eq!(Value::Object(r).encode().decode(), Value::Object(r));
        assert_eq!(Value::String(r).encode().decode().as_string(), Some(r));
    }

    /// Contract: arith module exposes the integer fast paths
    #[test]
    fn test_arith_module() {
        assert_eq!(arith::add(&Value::Integer(1), &Value::Integer(2)), Some(Value::Integer(3)));
        assert_eq!(arith::neg(&Value::Integer(0)).map(|v| v.is_double()), Some(true));
    }
}

#[cfg(test)]
mod key_contract_tests {
    use super::*;

    #[test]
    fn test_property_key_index() {
        assert_eq!(PropertyKey::from(5u32).as_index(), Some(5));
        assert_eq!(PropertyKey::Index(MAX_ARRAY_INDEX).as_string(), None);
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    #[test]
    fn test_error_kinds_cover_constructors() {
        assert_eq!(ErrorKind::ALL.len(), 8);
        assert_eq!(ErrorKind::ALL[ErrorKind::RangeError.ordinal()], ErrorKind::RangeError);
    }

    #[test]
    fn test_js_result_alias() {
        let ok: JsResult<Value> = Ok(Value::Null);
        let err: JsResult<Value> = Err(PendingException);
        assert!(ok.is_ok() && err.is_err());
        let _ = JsError::new(ErrorKind::SyntaxError, "unexpected token");
    }
}
