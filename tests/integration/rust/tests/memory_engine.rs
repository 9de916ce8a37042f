//! Memory manager and engine integration tests
//!
//! Verifies that engine-owned roots (frames, contexts, handles, constants,
//! the pending exception) keep heap cells alive across collections.

use core_types::{ErrorKind, JsResult, Value};
use engine::{CallArgs, Engine, EngineConfig};
use integration_tests::object_with;
use memory_manager::HeapConfig;

fn collect_inside_call(engine: &mut Engine, _: &CallArgs) -> JsResult<Value> {
    engine.run_gc();
    let arguments = engine.arguments()?;
    engine.get_index(arguments, 0)
}

fn allocate_and_throw(engine: &mut Engine, _: &CallArgs) -> JsResult<Value> {
    let error = engine.new_error(ErrorKind::RangeError, "lost?");
    Err(engine.throw(Value::Object(error)))
}

/// Test: a weak handle reports an object once the last strong root is gone
#[test]
fn test_weak_count_drops_to_zero() {
    let mut engine = Engine::new();
    let objects: Vec<_> = (0..10).map(|_| engine.new_object()).collect();
    let weak: Vec<_> = objects.iter().map(|&o| engine.weak(Value::Object(o))).collect();
    let strong: Vec<_> = objects.iter().map(|&o| engine.persistent(Value::Object(o))).collect();

    engine.run_gc();
    assert_eq!(weak.iter().filter(|w| !w.is_cleared()).count(), 10);
    assert_eq!(engine.heap().weak_count(), 10);

    drop(strong);
    engine.run_gc();
    assert_eq!(weak.iter().filter(|w| !w.is_cleared()).count(), 0);
    assert_eq!(engine.heap().weak_count(), 0);
    for object in objects {
        assert!(engine.heap().try_object(object).is_none());
    }
}

/// Test: arguments of an active call survive a collection inside the call
#[test]
fn test_active_frames_are_roots() {
    let mut engine = Engine::new();
    let f = engine.new_function("f", collect_inside_call, 1, false);
    let arg = engine.new_object();
    let weak = engine.weak(Value::Object(arg));
    let result = engine.call(Value::Object(f), Value::Undefined, &[Value::Object(arg)]).unwrap();
    assert_eq!(result, Value::Object(arg));
    assert!(!weak.is_cleared());
}

/// Test: the pending exception is a root until taken
#[test]
fn test_pending_exception_survives_collection() {
    let mut engine = Engine::new();
    let f = engine.new_function("f", allocate_and_throw, 0, false);
    assert!(engine.call(Value::Object(f), Value::Undefined, &[]).is_err());
    engine.run_gc();
    let error = engine.take_error().unwrap();
    assert_eq!(error.kind, ErrorKind::RangeError);
    assert_eq!(error.message, "lost?");
}

/// Test: constants live as long as the engine
#[test]
fn test_constants_are_roots() {
    let mut engine = Engine::new();
    let obj = object_with(&mut engine, &[("k", Value::Integer(3))]).unwrap();
    let index = engine.add_constant(Value::Object(obj));
    engine.run_gc();
    assert_eq!(engine.constant(index), Some(Value::Object(obj)));
    assert_eq!(engine.get_named(obj, "k").unwrap(), Value::Integer(3));
}

/// Test: a small threshold collects repeatedly while reachable data stays intact
#[test]
fn test_collection_under_allocation_pressure() {
    let config = EngineConfig {
        heap: HeapConfig {
            gc_threshold: 32,
            growth_factor: 1.5,
            max_cells: None,
        },
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(config);
    let list = engine.new_array(&[]);
    let keep = engine.persistent(Value::Object(list));
    for i in 0..200 {
        let item = object_with(&mut engine, &[("i", Value::Integer(i))]).unwrap();
        if i % 10 == 0 {
            let length = engine.heap().object(list).elements.length();
            engine.put_index(list, length, Value::Object(item)).unwrap();
        }
    }
    let stats = engine.gc_stats();
    assert!(stats.collections > 0);
    assert!(stats.reclaimed > 0);

    for index in 0..20 {
        let item = engine.get_index(list, index).unwrap().as_object().unwrap();
        assert_eq!(engine.get_named(item, "i").unwrap(), Value::Integer(index as i32 * 10));
    }
    drop(keep);
}
