//! Object model integration tests
//!
//! Hidden classes from memory_manager seen through the engine's property
//! protocol and inline caches.

use core_types::{ErrorKind, PropertyKey, Value};
use engine::{Engine, LookupState};
use integration_tests::{object_with, own_names};

/// Test: objects built the same way share a class, others do not
#[test]
fn test_class_sharing_follows_insertion_history() {
    let mut engine = Engine::new();
    let a = object_with(&mut engine, &[("x", Value::Integer(1)), ("y", Value::Integer(2))]).unwrap();
    let b = object_with(&mut engine, &[("x", Value::Integer(3)), ("y", Value::Integer(4))]).unwrap();
    let c = object_with(&mut engine, &[("y", Value::Integer(5)), ("x", Value::Integer(6))]).unwrap();

    let heap = engine.heap();
    assert_eq!(heap.object(a).class, heap.object(b).class);
    assert_ne!(heap.object(a).class, heap.object(c).class);
}

/// Test: the class always describes exactly the object's slots
#[test]
fn test_class_matches_slots_through_changes() {
    let mut engine = Engine::new();
    let names = ["a", "b", "c", "d", "e"];
    let obj = engine.new_object();
    for (i, name) in names.iter().enumerate() {
        let key = engine.key(name);
        engine.put(Value::Object(obj), key, Value::Integer(i as i32)).unwrap();
    }
    for name in ["b", "d"] {
        let key = engine.key(name);
        assert!(engine.delete_property(obj, key));
    }
    engine.seal(obj);

    let heap = engine.heap();
    let object = heap.object(obj);
    assert_eq!(heap.classes().get(object.class).property_count(), object.slots.len());
    assert_eq!(own_names(&engine, obj), ["a", "c", "e"]);
    let e = engine.key("e");
    assert_eq!(engine.get(obj, e).unwrap(), Value::Integer(4));
}

/// Test: a cached load stays correct when the receiver's shape changes
#[test]
fn test_cache_follows_shape_changes() {
    let mut engine = Engine::new();
    let obj = object_with(&mut engine, &[("x", Value::Integer(1))]).unwrap();
    let mut lookup = engine.create_lookup("x");
    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Integer(1));

    // Re-adding `x` after `pad` gives it a different slot and class.
    let pad = engine.key("pad");
    engine.put(Value::Object(obj), pad, Value::Integer(0)).unwrap();
    let x = engine.key("x");
    engine.delete_property(obj, x);
    engine.put(Value::Object(obj), x, Value::Integer(2)).unwrap();

    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Integer(2));
    assert!(matches!(lookup.state(), LookupState::Polymorphic(_) | LookupState::Monomorphic(_)));
}

/// Test: enumeration puts indices first, then names in insertion order
#[test]
fn test_enumeration_order() {
    let mut engine = Engine::new();
    let obj = object_with(
        &mut engine,
        &[
            ("b", Value::Null),
            ("2", Value::Null),
            ("a", Value::Null),
            ("1", Value::Null),
            ("4294967295", Value::Null),
        ],
    )
    .unwrap();
    assert_eq!(own_names(&engine, obj), ["1", "2", "b", "a", "4294967295"]);

    let array = engine.keys(obj);
    let length = engine.key("length");
    assert_eq!(engine.get(array, length).unwrap(), Value::Integer(5));
}

/// Test: writing to a frozen object is silent in sloppy code, a TypeError in strict
#[test]
fn test_frozen_write_sloppy_vs_strict() {
    let mut engine = Engine::new();
    let obj = object_with(&mut engine, &[("x", Value::Integer(1))]).unwrap();
    assert!(engine.freeze(obj));
    let x = engine.key("x");

    engine.put(Value::Object(obj), x, Value::Integer(2)).unwrap();
    assert_eq!(engine.get(obj, x).unwrap(), Value::Integer(1));

    engine.set_global_strict(true);
    assert!(engine.put(Value::Object(obj), x, Value::Integer(2)).is_err());
    let error = engine.take_error().unwrap();
    assert_eq!(error.kind, ErrorKind::TypeError);
    assert_eq!(engine.get(obj, x).unwrap(), Value::Integer(1));
}

/// Test: arrays switch to sparse storage without changing observable keys
#[test]
fn test_array_storage_switch_is_invisible() {
    let mut engine = Engine::new();
    let array = engine.new_array(&[Value::Integer(0), Value::Integer(1)]);
    engine.put_index(array, 100_000, Value::Integer(2)).unwrap();
    assert!(!engine.heap().object(array).elements.is_dense());
    assert_eq!(own_names(&engine, array), ["0", "1", "100000", "length"]);
    assert_eq!(engine.get_index(array, 1).unwrap(), Value::Integer(1));
    assert!(engine.has_property(array, PropertyKey::Index(100_000)));
}
