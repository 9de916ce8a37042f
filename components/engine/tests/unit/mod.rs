//! Unit tests for engine components working together

use core_types::{ErrorKind, JsResult, PropertyKey, Value};
use engine::{CallArgs, Engine, EngineConfig, IndexedLookup, LookupState, PropertyDescriptor};
use memory_manager::{HeapConfig, PropertyAttributes};

fn seven(_: &mut Engine, _: &CallArgs) -> JsResult<Value> {
    Ok(Value::Integer(7))
}

fn store_doubled(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    let value = engine.to_number(args.get(0))?;
    let key = engine.key("stored");
    let this = args.this;
    let target = engine.to_object(this)?;
    engine.define_data_property(target, key, Value::from_number(value * 2.0), PropertyAttributes::default())?;
    Ok(Value::Undefined)
}

fn throws_type_error(engine: &mut Engine, _: &CallArgs) -> JsResult<Value> {
    Err(engine.throw_error(ErrorKind::TypeError, "inner failure"))
}

fn calls_first_argument(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    engine.call(args.get(0), Value::Undefined, &[])
}

fn recurse(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    engine.call(Value::Object(args.callee), Value::Undefined, &[])
}

fn write_to_frozen(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    let key = engine.key("x");
    engine.put(args.get(0), key, Value::Integer(2))?;
    Ok(Value::Boolean(true))
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_array_grows_and_truncates() {
    let mut engine = Engine::new();
    let values = [Value::Integer(1), Value::Integer(2), Value::Integer(3)];
    let array = engine.new_array(&values);
    let length = engine.key("length");

    engine.put_index(array, 10, Value::Integer(11)).unwrap();
    assert_eq!(engine.get(array, length).unwrap(), Value::Integer(11));
    assert_eq!(engine.get_index(array, 5).unwrap(), Value::Undefined);

    engine.put(Value::Object(array), length, Value::Integer(2)).unwrap();
    assert_eq!(engine.get_index(array, 2).unwrap(), Value::Undefined);
    assert_eq!(engine.get_index(array, 1).unwrap(), Value::Integer(2));
    assert!(!engine.has_own_property(array, PropertyKey::Index(10)));
}

#[test]
fn test_far_write_makes_array_sparse() {
    let mut engine = Engine::new();
    let array = engine.new_array(&[]);
    engine.put_index(array, 1_000_000, Value::Boolean(true)).unwrap();
    assert!(!engine.heap().object(array).elements.is_dense());
    let length = engine.key("length");
    assert_eq!(engine.get(array, length).unwrap(), Value::Integer(1_000_001));
    assert_eq!(engine.own_property_keys(array)[0], PropertyKey::Index(1_000_000));
}

#[test]
fn test_invalid_length_is_range_error() {
    let mut engine = Engine::new();
    let array = engine.new_array(&[]);
    let length = engine.key("length");
    assert!(engine.put(Value::Object(array), length, Value::Double(1.5)).is_err());
    assert_eq!(engine.take_error().unwrap().kind, ErrorKind::RangeError);
}

// ============================================================================
// Accessors and prototypes
// ============================================================================

#[test]
fn test_getter_and_setter_run_against_receiver() {
    let mut engine = Engine::new();
    let proto = engine.new_object();
    let getter = engine.new_function("get", seven, 0, false);
    let setter = engine.new_function("set", store_doubled, 1, false);
    let key = engine.key("value");
    engine
        .define_accessor(proto, key, Value::Object(getter), Value::Object(setter), PropertyAttributes::CONFIGURABLE)
        .unwrap();

    let obj = engine.new_object_with_prototype(Value::Object(proto), memory_manager::ObjectKind::Ordinary);
    assert_eq!(engine.get(obj, key).unwrap(), Value::Integer(7));
    engine.put(Value::Object(obj), key, Value::Integer(4)).unwrap();
    let stored = engine.key("stored");
    assert_eq!(engine.get(obj, stored).unwrap(), Value::Integer(8));
    assert!(!engine.has_own_property(proto, stored));
}

#[test]
fn test_inherited_read_only_blocks_assignment() {
    let mut engine = Engine::new();
    let proto = engine.new_object();
    let key = engine.key("fixed");
    engine
        .define_data_property(proto, key, Value::Integer(1), PropertyAttributes::empty())
        .unwrap();
    let obj = engine.new_object_with_prototype(Value::Object(proto), memory_manager::ObjectKind::Ordinary);
    engine.put(Value::Object(obj), key, Value::Integer(2)).unwrap();
    assert!(!engine.has_own_property(obj, key));

    engine.set_global_strict(true);
    assert!(engine.put(Value::Object(obj), key, Value::Integer(2)).is_err());
    assert_eq!(engine.take_error().unwrap().kind, ErrorKind::TypeError);
}

#[test]
fn test_redefining_non_configurable_throws() {
    let mut engine = Engine::new();
    let obj = engine.new_object();
    let key = engine.key("locked");
    engine
        .define_data_property(obj, key, Value::Integer(1), PropertyAttributes::empty())
        .unwrap();
    let changed = PropertyDescriptor::data(Value::Integer(2), PropertyAttributes::empty());
    assert!(!engine.define_own_property(obj, key, changed).unwrap());
    let same = PropertyDescriptor::value(Value::Integer(1));
    assert!(engine.define_own_property(obj, key, same).unwrap());
    assert!(engine.define_property_or_throw(obj, key, changed).is_err());
    let error = engine.take_error().unwrap();
    assert_eq!(error.message, "Cannot redefine property: locked");
}

// ============================================================================
// Inline caches
// ============================================================================

#[test]
fn test_cached_load_sees_shadowing_property() {
    let mut engine = Engine::new();
    let proto = engine.new_object();
    let key = engine.key("x");
    engine.put(Value::Object(proto), key, Value::Integer(1)).unwrap();
    let obj = engine.new_object_with_prototype(Value::Object(proto), memory_manager::ObjectKind::Ordinary);

    let mut lookup = engine.create_lookup("x");
    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Integer(1));
    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Integer(1));
    assert_eq!(lookup.hits(), 1);

    engine.put(Value::Object(obj), key, Value::Integer(2)).unwrap();
    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Integer(2));
}

#[test]
fn test_cached_load_after_prototype_delete() {
    let mut engine = Engine::new();
    let proto = engine.new_object();
    let key = engine.key("x");
    engine.put(Value::Object(proto), key, Value::Integer(1)).unwrap();
    let obj = engine.new_object_with_prototype(Value::Object(proto), memory_manager::ObjectKind::Ordinary);

    let mut lookup = engine.create_lookup("x");
    engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap();
    engine.put(Value::Object(proto), key, Value::Integer(5)).unwrap();
    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Integer(5));

    assert!(engine.delete_property(proto, key));
    assert_eq!(engine.lookup_get(&mut lookup, Value::Object(obj)).unwrap(), Value::Undefined);
}

#[test]
fn test_cached_store_then_freeze() {
    let mut engine = Engine::new();
    let obj = engine.new_object();
    let key = engine.key("x");
    engine.put(Value::Object(obj), key, Value::Integer(0)).unwrap();

    let mut lookup = engine.create_lookup("x");
    engine.lookup_set(&mut lookup, Value::Object(obj), Value::Integer(1)).unwrap();
    engine.lookup_set(&mut lookup, Value::Object(obj), Value::Integer(2)).unwrap();
    assert!(matches!(lookup.state(), LookupState::Monomorphic(_)));

    engine.freeze(obj);
    engine.lookup_set(&mut lookup, Value::Object(obj), Value::Integer(3)).unwrap();
    assert_eq!(engine.get(obj, key).unwrap(), Value::Integer(2));
}

#[test]
fn test_indexed_lookup_goes_generic_on_sparse() {
    let mut engine = Engine::new();
    let array = engine.new_array(&[Value::Integer(1)]);
    let mut lookup = IndexedLookup::default();
    assert_eq!(engine.indexed_get(&mut lookup, Value::Object(array), 0).unwrap(), Value::Integer(1));
    assert_eq!(lookup, IndexedLookup::Dense);
    engine.put_index(array, 5_000_000, Value::Null).unwrap();
    assert_eq!(engine.indexed_get(&mut lookup, Value::Object(array), 1).unwrap(), Value::Undefined);
    assert_eq!(lookup, IndexedLookup::Generic);
}

// ============================================================================
// Calls and exceptions
// ============================================================================

#[test]
fn test_exception_unwinds_nested_calls() {
    let mut engine = Engine::new();
    let inner = engine.new_function("inner", throws_type_error, 0, false);
    let outer = engine.new_function("outer", calls_first_argument, 1, false);
    let result = engine.call(Value::Object(outer), Value::Undefined, &[Value::Object(inner)]);
    assert!(result.is_err());
    assert_eq!(engine.call_depth(), 0);
    let error = engine.take_error().unwrap();
    assert_eq!(error.kind, ErrorKind::TypeError);
    assert_eq!(error.message, "inner failure");
    assert!(!engine.has_exception());
}

#[test]
fn test_runaway_recursion_is_range_error() {
    let config = EngineConfig {
        max_call_depth: 32,
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(config);
    let f = engine.new_function("f", recurse, 0, false);
    assert!(engine.call(Value::Object(f), Value::Undefined, &[]).is_err());
    assert_eq!(engine.take_error().unwrap().kind, ErrorKind::RangeError);
    assert_eq!(engine.call_depth(), 0);
}

#[test]
fn test_callee_strictness_decides_failed_writes() {
    let mut engine = Engine::new();
    let obj = engine.new_object();
    let key = engine.key("x");
    engine.put(Value::Object(obj), key, Value::Integer(1)).unwrap();
    engine.freeze(obj);

    let sloppy = engine.new_function("sloppy", write_to_frozen, 1, false);
    let strict = engine.new_function("strict", write_to_frozen, 1, true);
    let args = [Value::Object(obj)];
    assert_eq!(engine.call(Value::Object(sloppy), Value::Undefined, &args).unwrap(), Value::Boolean(true));
    assert!(engine.call(Value::Object(strict), Value::Undefined, &args).is_err());
    let error = engine.take_error().unwrap();
    assert_eq!(error.message, "Cannot assign to read only property 'x' of object");
}

// ============================================================================
// Garbage collection
// ============================================================================

#[test]
fn test_rooted_graph_survives_collection() {
    let mut engine = Engine::new();
    let parent = engine.new_object();
    let keep = engine.persistent(Value::Object(parent));
    let child = engine.new_object();
    let key = engine.key("child");
    engine.put(Value::Object(parent), key, Value::Object(child)).unwrap();

    engine.run_gc();
    assert_eq!(engine.get(parent, key).unwrap(), Value::Object(child));
    assert!(engine.heap().try_object(child).is_some());
    drop(keep);
}

#[test]
fn test_weak_handle_clears_when_unreachable() {
    let mut engine = Engine::new();
    let obj = engine.new_object();
    let weak = engine.weak(Value::Object(obj));
    let keep = engine.persistent(Value::Object(obj));
    engine.run_gc();
    assert_eq!(weak.get(), Some(Value::Object(obj)));

    drop(keep);
    let report = engine.run_gc();
    assert!(weak.is_cleared());
    assert!(report.weak_cleared >= 1);
    assert!(engine.heap().try_object(obj).is_none());
}

#[test]
fn test_allocation_triggers_collection_and_keeps_globals() {
    let config = EngineConfig {
        heap: HeapConfig {
            gc_threshold: 64,
            ..HeapConfig::default()
        },
        ..EngineConfig::default()
    };
    let mut engine = Engine::with_config(config);
    let global = engine.global_object();
    let kept = engine.new_object();
    let key = engine.key("kept");
    engine.put(Value::Object(global), key, Value::Object(kept)).unwrap();

    for _ in 0..1_000 {
        engine.new_object();
    }
    assert!(engine.gc_stats().collections > 0);
    assert!(engine.heap().try_object(kept).is_some());
    assert_eq!(engine.get_binding("kept").unwrap(), Value::Object(kept));
}

#[test]
fn test_handle_scope_roots_until_dropped() {
    let mut engine = Engine::new();
    let obj = engine.new_object();
    let weak = engine.weak(Value::Object(obj));
    {
        let scope = engine.handle_scope();
        scope.root(Value::Object(obj));
        engine.run_gc();
        assert!(!weak.is_cleared());
    }
    engine.run_gc();
    assert!(weak.is_cleared());
}
