//! Value representation and equality integration tests
//!
//! The tagged encoding from core_types applied to values that reference
//! real heap cells, plus the comparison operations the engine builds on it.

use core_types::{JsResult, RawValue, Value};
use engine::{CallArgs, Engine};

fn seven(_: &mut Engine, _: &CallArgs) -> JsResult<Value> {
    Ok(Value::Integer(7))
}

/// Test: heap references survive the NaN-boxed encoding with their generation
#[test]
fn test_tagged_round_trip_of_live_references() {
    let mut engine = Engine::new();
    let obj = engine.new_object();
    let text = engine.new_string("boxed");
    let values = [
        Value::Object(obj),
        text,
        Value::Integer(i32::MIN),
        Value::Double(-0.0),
        Value::Double(f64::INFINITY),
        Value::Boolean(false),
        Value::Empty,
    ];
    for value in values {
        let decoded = RawValue::from_bits(value.encode().bits()).decode();
        assert!(decoded.same_value(&value), "{value:?} decoded as {decoded:?}");
    }
    let decoded = Value::Object(obj).encode().decode();
    assert_eq!(engine.heap().object(decoded.as_object().unwrap()).class, engine.heap().object(obj).class);
}

/// Test: a reused arena slot does not resurrect stale references
#[test]
fn test_stale_reference_after_collection() {
    let mut engine = Engine::new();
    let old = engine.new_object();
    let stale = Value::Object(old).encode();
    engine.run_gc();
    let fresh = engine.new_object();
    let decoded = stale.decode().as_object().unwrap();
    assert!(engine.heap().try_object(decoded).is_none());
    assert!(engine.heap().try_object(fresh).is_some());
}

/// Test: integer and double forms of the same number compare equal
#[test]
fn test_number_forms_are_interchangeable() {
    let two = Value::from_number(2.0);
    assert_eq!(two, Value::Integer(2));
    assert!(Value::Integer(2).strict_equals(&Value::Double(2.0)));
    assert!(Value::from_number(-0.0).is_double());
    assert!(!Value::Double(0.0).same_value(&Value::Double(-0.0)));
    assert!(Value::Double(0.0).same_value_zero(&Value::Double(-0.0)));
    assert!(Value::NAN.same_value(&Value::NAN));
    assert!(!Value::NAN.strict_equals(&Value::NAN));
}

/// Test: loose equality edge cases across types
#[test]
fn test_loose_equality_edge_cases() {
    let mut engine = Engine::new();
    let zero = engine.new_string("0");
    let blank = engine.new_string(" \t");
    let null_text = engine.new_string("null");

    assert!(engine.loose_equals(Value::Boolean(false), zero).unwrap());
    assert!(engine.loose_equals(Value::Integer(0), blank).unwrap());
    assert!(!engine.loose_equals(Value::Null, Value::Boolean(false)).unwrap());
    assert!(!engine.loose_equals(Value::Undefined, Value::Integer(0)).unwrap());
    assert!(!engine.loose_equals(Value::Null, null_text).unwrap());
    assert!(engine.loose_equals(Value::Undefined, Value::Null).unwrap());

    let obj = engine.new_object();
    engine.install_method(obj, "valueOf", seven, 0);
    let text = engine.new_string("7");
    assert!(engine.loose_equals(Value::Object(obj), text).unwrap());
    assert!(engine.loose_equals(Value::Object(obj), Value::Double(7.0)).unwrap());
    let other = engine.new_object();
    engine.install_method(other, "valueOf", seven, 0);
    assert!(!engine.loose_equals(Value::Object(obj), Value::Object(other)).unwrap());

    let array = engine.new_array(&[Value::Integer(7)]);
    let tag = engine.new_string("[object Array]");
    assert!(engine.loose_equals(Value::Object(array), tag).unwrap());
}

/// Test: strings are interned, so equal text means the same reference
#[test]
fn test_interned_strings_compare_by_identity() {
    let mut engine = Engine::new();
    let a = engine.new_string("same");
    let joined = format!("{}{}", "sa", "me");
    let b = engine.new_string(&joined);
    assert_eq!(a, b);
    assert!(a.strict_equals(&b));
    assert_eq!(engine.type_of(a), "string");
}
