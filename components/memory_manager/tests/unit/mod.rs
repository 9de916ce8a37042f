//! Unit tests for memory manager components

use core_types::Value;
use memory_manager::{
    ArrayStorage, CallContext, ContextKind, ContextRecord, Heap, HeapConfig, NoRoots, ObjectKind,
    PropertyAttributes, Slot, Tracer, SPARSE_GAP_LIMIT,
};

// ============================================================================
// Hidden class tests
// ============================================================================

#[test]
fn test_shape_invariant_holds_through_add_and_remove() {
    let mut heap = Heap::default();
    let obj = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let names: Vec<_> = (0..10).map(|i| heap.intern(&format!("p{i}"))).collect();
    for (i, &name) in names.iter().enumerate() {
        heap.add_own_slot(obj, name, PropertyAttributes::default(), Slot::Data(Value::Integer(i as i32)));
        let o = heap.object(obj);
        assert_eq!(heap.classes().get(o.class).property_count(), o.slots.len());
    }
    for &name in names.iter().step_by(3) {
        heap.remove_own_slot(obj, name);
        let o = heap.object(obj);
        assert_eq!(heap.classes().get(o.class).property_count(), o.slots.len());
    }
    let p4 = heap.find_own_slot(obj, names[4]).unwrap();
    assert_eq!(p4.value, Slot::Data(Value::Integer(4)));
}

#[test]
fn test_objects_with_same_history_share_class() {
    let mut heap = Heap::default();
    let proto = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let a = heap.intern("a");
    let b = heap.intern("b");
    let mut objects = Vec::new();
    for _ in 0..3 {
        let o = heap.alloc_object(Value::Object(proto), ObjectKind::Ordinary);
        heap.add_own_slot(o, a, PropertyAttributes::default(), Slot::Data(Value::Null));
        heap.add_own_slot(o, b, PropertyAttributes::default(), Slot::Data(Value::Null));
        objects.push(o);
    }
    let class = heap.object(objects[0]).class;
    assert!(objects.iter().all(|&o| heap.object(o).class == class));

    let other_order = heap.alloc_object(Value::Object(proto), ObjectKind::Ordinary);
    heap.add_own_slot(other_order, b, PropertyAttributes::default(), Slot::Data(Value::Null));
    heap.add_own_slot(other_order, a, PropertyAttributes::default(), Slot::Data(Value::Null));
    assert_ne!(heap.object(other_order).class, class);
}

#[test]
fn test_freeze_moves_object_to_frozen_class() {
    let mut heap = Heap::default();
    let obj = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let x = heap.intern("x");
    heap.add_own_slot(obj, x, PropertyAttributes::default(), Slot::Data(Value::Integer(1)));
    heap.object_mut(obj).elements.set_value(0, Value::Integer(2));
    heap.restrict_object(obj, true);

    let o = heap.object(obj);
    let class = heap.classes().get(o.class);
    assert!(!class.is_extensible());
    assert!(!class.find(x).unwrap().1.is_writable());
    assert!(!o.elements.get(0).unwrap().attributes.is_writable());
}

#[test]
fn test_set_prototype_changes_class() {
    let mut heap = Heap::default();
    let p1 = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let obj = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let before = heap.object(obj).class;
    heap.set_class_prototype(obj, Value::Object(p1));
    assert_ne!(heap.object(obj).class, before);
    assert_eq!(heap.prototype_of(obj), Value::Object(p1));
}

// ============================================================================
// Element storage tests
// ============================================================================

#[test]
fn test_sparse_conversion_keeps_elements() {
    let mut storage = ArrayStorage::from_values(vec![Value::Integer(1), Value::Integer(2)]);
    storage.set_value(SPARSE_GAP_LIMIT * 4, Value::Integer(3));
    assert!(!storage.is_dense());
    assert_eq!(storage.count(), 3);
    assert_eq!(storage.indices(), vec![0, 1, SPARSE_GAP_LIMIT * 4]);
}

// ============================================================================
// Collector tests
// ============================================================================

#[test]
fn test_context_chain_keeps_locals_alive() {
    let mut heap = Heap::default();
    let global = heap.alloc_context(ContextRecord {
        kind: ContextKind::Global,
        outer: None,
        strict: false,
    });
    let captured = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let locals_class = heap.classes_mut().empty_class(Value::Null);
    let call = heap.alloc_context(ContextRecord {
        kind: ContextKind::Call(CallContext {
            function: Value::Undefined,
            this: Value::Undefined,
            arguments: vec![],
            arguments_object: None,
            locals_class,
            locals: vec![Value::Object(captured)],
        }),
        outer: Some(global),
        strict: true,
    });

    let roots = move |t: &mut Tracer<'_>| t.mark_ref(call);
    let report = heap.collect(&roots);
    assert_eq!(report.reclaimed, 0);
    assert!(heap.is_live(global));
    assert!(heap.is_live(captured));
    assert!(heap.classes().is_live(locals_class));
}

#[test]
fn test_dead_classes_are_collected() {
    let mut heap = Heap::default();
    let obj = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let k = heap.intern("k");
    heap.add_own_slot(obj, k, PropertyAttributes::default(), Slot::Data(Value::Null));
    let classes_before = heap.classes().len();
    let report = heap.collect(&NoRoots);
    assert_eq!(report.classes_reclaimed, classes_before);
    assert!(heap.classes().is_empty());
}

#[test]
fn test_stats_accumulate() {
    let mut heap = Heap::new(HeapConfig::default());
    heap.intern("a");
    heap.collect(&NoRoots);
    heap.intern("b");
    heap.collect(&NoRoots);
    let stats = heap.stats();
    assert_eq!(stats.collections, 2);
    assert_eq!(stats.reclaimed, 2);
    assert_eq!(stats.live, 0);
}

#[test]
fn test_weak_handle_to_primitive_never_clears() {
    let mut heap = Heap::default();
    let weak = heap.weak(Value::Integer(7));
    heap.collect(&NoRoots);
    assert_eq!(weak.get(), Some(Value::Integer(7)));
}
