//! Unit tests for Value

use core_types::{HeapRef, Value};

#[cfg(test)]
mod value_creation_tests {
    use super::*;

    #[test]
    fn test_from_number_prefers_integer() {
        assert_eq!(Value::from_number(42.0), Value::Integer(42));
        assert_eq!(Value::from_number(-7.0), Value::Integer(-7));
        assert_eq!(Value::from_number(i32::MIN as f64), Value::Integer(i32::MIN));
    }

    #[test]
    fn test_from_number_keeps_doubles() {
        assert_eq!(Value::from_number(1.5), Value::Double(1.5));
        assert!(Value::from_number(-0.0).is_double());
        assert!(Value::from_number(2147483648.0).is_double());
        assert!(Value::from_number(f64::NAN).is_nan());
        assert!(Value::from_number(f64::INFINITY).is_double());
    }

    #[test]
    fn test_from_u32() {
        assert_eq!(Value::from_u32(5), Value::Integer(5));
        assert_eq!(Value::from_u32(u32::MAX), Value::Double(4294967295.0));
    }

    #[test]
    fn test_conversions_from_rust_types() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(3), Value::Integer(3));
        assert_eq!(Value::default(), Value::Undefined);
    }
}

#[cfg(test)]
mod value_tag_tests {
    use super::*;

    #[test]
    fn test_tag_predicates() {
        let r = HeapRef::new(1, 0);
        assert!(Value::Undefined.is_null_or_undefined());
        assert!(Value::Null.is_null_or_undefined());
        assert!(!Value::Boolean(false).is_null_or_undefined());
        assert!(Value::Integer(1).is_number() && Value::Double(1.5).is_number());
        assert!(Value::String(r).is_managed() && Value::Object(r).is_managed());
        assert!(!Value::Integer(1).is_managed());
        assert!(Value::Empty.is_empty());
        assert!(Value::String(r).is_primitive());
        assert!(!Value::Object(r).is_primitive());
    }

    #[test]
    fn test_accessors() {
        let r = HeapRef::new(4, 2);
        assert_eq!(Value::Integer(3).as_number(), Some(3.0));
        assert_eq!(Value::Double(2.5).as_integer(), None);
        assert_eq!(Value::Object(r).as_object(), Some(r));
        assert_eq!(Value::Object(r).as_string(), None);
        assert_eq!(Value::String(r).as_heap_ref(), Some(r));
        assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Double(0.5).type_of(), "number");
        assert_eq!(Value::String(HeapRef::new(0, 0)).type_of(), "string");
    }
}

#[cfg(test)]
mod value_equality_tests {
    use super::*;

    #[test]
    fn test_nan_is_not_strict_equal() {
        assert!(!Value::NAN.strict_equals(&Value::NAN));
        assert!(Value::NAN.same_value(&Value::NAN));
        assert!(Value::NAN.same_value_zero(&Value::NAN));
    }

    #[test]
    fn test_zero_signs() {
        let pos = Value::Integer(0);
        let neg = Value::Double(-0.0);
        assert!(pos.strict_equals(&neg));
        assert!(!pos.same_value(&neg));
        assert!(pos.same_value_zero(&neg));
    }

    #[test]
    fn test_integer_double_cross_compare() {
        assert!(Value::Integer(2).strict_equals(&Value::Double(2.0)));
        assert!(!Value::Integer(2).strict_equals(&Value::Double(2.5)));
    }

    #[test]
    fn test_strings_compare_by_identity() {
        let a = HeapRef::new(1, 0);
        let b = HeapRef::new(2, 0);
        assert!(Value::String(a).strict_equals(&Value::String(a)));
        assert!(!Value::String(a).strict_equals(&Value::String(b)));
    }

    #[test]
    fn test_no_cross_type_equality() {
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(!Value::Integer(1).strict_equals(&Value::Boolean(true)));
    }
}

#[cfg(test)]
mod value_arith_tests {
    use super::*;

    #[test]
    fn test_add_overflow_falls_back_to_double() {
        let r = Value::Integer(i32::MAX).add(&Value::Integer(1)).unwrap();
        assert_eq!(r, Value::Double(2147483648.0));
    }

    #[test]
    fn test_sub_overflow_falls_back_to_double() {
        let r = Value::Integer(i32::MIN).sub(&Value::Integer(1)).unwrap();
        assert_eq!(r, Value::Double(-2147483649.0));
    }

    #[test]
    fn test_mul_negative_zero() {
        let r = Value::Integer(0).mul(&Value::Integer(-5)).unwrap();
        assert!(r.is_double());
        assert!(r.as_number().unwrap().is_sign_negative());
    }

    #[test]
    fn test_non_number_operands() {
        assert_eq!(Value::Null.add(&Value::Integer(1)), None);
    }
}
