//! Contract tests verifying the memory_manager API surface.

use core_types::{HeapRef, Value};
use memory_manager::{
    ClassId, ClassPool, Heap, HeapCell, HeapConfig, NoRoots, ObjectKind, Persistent,
    PropertyAttributes, RootSource, Tracer, WeakHandle,
};

/// Heap::new(config) -> Self
#[test]
fn contract_heap_new() {
    let heap = Heap::new(HeapConfig::default());
    assert_eq!(heap.live_cells(), 0);
    assert_eq!(heap.config().gc_threshold, 4096);
}

/// Heap::allocate(cell) -> HeapRef
#[test]
fn contract_heap_allocate() {
    let mut heap = Heap::default();
    let r: HeapRef = heap.intern("x");
    assert!(matches!(heap.get(r), HeapCell::String(_)));
    assert!(heap.is_live(r));
}

/// Heap::collect(&dyn RootSource) -> CollectionReport
#[test]
fn contract_heap_collect() {
    struct Roots(HeapRef);
    impl RootSource for Roots {
        fn trace_roots(&self, tracer: &mut Tracer<'_>) {
            tracer.mark_ref(self.0);
        }
    }
    let mut heap = Heap::default();
    let kept = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let report = heap.collect(&Roots(kept));
    assert_eq!(report.reclaimed, 1);
    assert_eq!(report.live, 1);
}

/// ClassPool transitions return ClassId values
#[test]
fn contract_class_pool() {
    let mut pool = ClassPool::new();
    let root: ClassId = pool.empty_class(Value::Null);
    let (next, slot) = pool.add_member(root, HeapRef::new(0, 0), PropertyAttributes::default());
    assert_eq!(slot, 0);
    assert_eq!(pool.get(next).parent(), Some(root));
}

/// Persistent and WeakHandle are RAII handles
#[test]
fn contract_handles() {
    let mut heap = Heap::default();
    let obj = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
    let strong: Persistent = heap.persistent(Value::Object(obj));
    let weak: WeakHandle = heap.weak(Value::Object(obj));
    heap.collect(&NoRoots);
    assert_eq!(strong.get(), weak.get().unwrap());
}
