//! Property tests for the raw value encoding and integer fast paths

use core_types::{HeapRef, RawValue, Value};
use proptest::prelude::*;

fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        Just(Value::Empty),
        any::<bool>().prop_map(Value::Boolean),
        any::<i32>().prop_map(Value::Integer),
        any::<f64>().prop_map(Value::Double),
        (any::<u32>(), any::<u16>()).prop_map(|(i, g)| Value::String(HeapRef::new(i, g))),
        (any::<u32>(), any::<u16>()).prop_map(|(i, g)| Value::Object(HeapRef::new(i, g))),
    ]
}

proptest! {
    #[test]
    fn encoding_round_trips(value in any_value()) {
        let decoded = value.encode().decode();
        if value.is_nan() {
            prop_assert!(decoded.is_nan());
            prop_assert!(!decoded.strict_equals(&decoded));
        } else {
            prop_assert!(decoded.same_value(&value));
            prop_assert_eq!(decoded.type_of(), value.type_of());
        }
    }

    #[test]
    fn raw_bits_round_trip(value in any_value()) {
        let raw = value.encode();
        prop_assert_eq!(RawValue::from_bits(raw.bits()), raw);
    }

    #[test]
    fn integer_add_matches_double_math(a in any::<i32>(), b in any::<i32>()) {
        let sum = Value::Integer(a).add(&Value::Integer(b)).unwrap();
        prop_assert_eq!(sum.as_number().unwrap(), f64::from(a) + f64::from(b));
    }

    #[test]
    fn integer_mul_matches_double_math(a in any::<i32>(), b in any::<i32>()) {
        let product = Value::Integer(a).mul(&Value::Integer(b)).unwrap();
        let expected = f64::from(a) * f64::from(b);
        prop_assert_eq!(product.as_number().unwrap(), expected);
        prop_assert_eq!(product.as_number().unwrap().is_sign_negative(), expected.is_sign_negative());
    }

    #[test]
    fn from_number_is_lossless(n in any::<f64>()) {
        let v = Value::from_number(n);
        prop_assert!(v.same_value(&Value::Double(n)));
    }
}
