//! GC integration for engine allocation
//!
//! Every allocation the engine performs goes through [`Engine::allocate`],
//! which runs a collection first when the heap asks for one. The engine
//! reports its roots to the collector: intrinsics, pinned names and
//! identifiers, the context chain of every frame, the pending exception,
//! the constant table, and the cell about to be allocated.

use core_types::{HeapRef, Value};
use memory_manager::{
    CollectionReport, ContextRecord, HandleScope, HeapCell, JsObject, ObjectKind, Persistent,
    RootSource, Trace, Tracer, WeakHandle,
};

use crate::call_frame::CallFrame;
use crate::engine::Engine;
use crate::intrinsics::{Intrinsics, Names};

struct EngineRoots<'a> {
    intrinsics: &'a Intrinsics,
    names: &'a Names,
    frames: &'a [CallFrame],
    exception: Option<Value>,
    identifiers: &'a [HeapRef],
    constants: &'a [Value],
    pending: Option<&'a HeapCell>,
}

impl RootSource for EngineRoots<'_> {
    fn trace_roots(&self, tracer: &mut Tracer<'_>) {
        self.intrinsics.trace(tracer);
        self.names.trace(tracer);
        for frame in self.frames {
            frame.trace(tracer);
        }
        if let Some(exception) = self.exception {
            tracer.mark_value(exception);
        }
        for &identifier in self.identifiers {
            tracer.mark_ref(identifier);
        }
        for &constant in self.constants {
            tracer.mark_value(constant);
        }
        if let Some(cell) = self.pending {
            cell.trace(tracer);
        }
    }
}

impl Engine {
    fn collect_with(&mut self, pending: Option<&HeapCell>) -> CollectionReport {
        let roots = EngineRoots {
            intrinsics: &self.intrinsics,
            names: &self.names,
            frames: &self.frames,
            exception: self.exception,
            identifiers: &self.identifiers,
            constants: &self.constants,
            pending,
        };
        self.heap.collect(&roots)
    }

    /// Runs a full collection now.
    pub fn run_gc(&mut self) -> CollectionReport {
        self.collect_with(None)
    }

    /// Stores a cell, collecting first if the heap is due.
    pub fn allocate(&mut self, cell: HeapCell) -> HeapRef {
        if self.heap.should_collect() {
            self.collect_with(Some(&cell));
        }
        self.heap.allocate(cell)
    }

    /// Returns the interned string for `text`.
    pub fn intern(&mut self, text: &str) -> HeapRef {
        if let Some(existing) = self.heap.lookup_interned(text) {
            return existing;
        }
        if self.heap.should_collect() {
            self.collect_with(None);
        }
        self.heap.intern(text)
    }

    /// Interns `text` and returns it as a string value.
    pub fn new_string(&mut self, text: &str) -> Value {
        Value::String(self.intern(text))
    }

    /// Allocates an empty object of `kind` inheriting from `prototype`.
    pub fn new_object_with_prototype(&mut self, prototype: Value, kind: ObjectKind) -> HeapRef {
        let class = self.heap.classes_mut().empty_class(prototype);
        self.allocate(HeapCell::Object(JsObject::new(class, kind)))
    }

    /// Allocates a plain object inheriting from `Object.prototype`.
    pub fn new_object(&mut self) -> HeapRef {
        let prototype = Value::Object(self.intrinsics.object_prototype);
        self.new_object_with_prototype(prototype, ObjectKind::Ordinary)
    }

    /// Allocates an array holding `values`.
    pub fn new_array(&mut self, values: &[Value]) -> HeapRef {
        let prototype = Value::Object(self.intrinsics.array_prototype);
        let class = self.heap.classes_mut().empty_class(prototype);
        let mut object = JsObject::new(
            class,
            ObjectKind::Array {
                length_writable: true,
            },
        );
        object.elements = memory_manager::ArrayStorage::from_values(values.to_vec());
        self.allocate(HeapCell::Object(object))
    }

    pub(crate) fn alloc_context(&mut self, context: ContextRecord) -> HeapRef {
        self.allocate(HeapCell::Context(context))
    }

    /// Pins an interned name for the lifetime of the engine.
    pub fn pin_identifier(&mut self, name: HeapRef) {
        if self.identifier_set.insert(name) {
            self.identifiers.push(name);
        }
    }

    /// Adds a value to the constant table, keeping it alive for the
    /// lifetime of the engine. Returns its index.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Constant at `index`.
    pub fn constant(&self, index: usize) -> Option<Value> {
        self.constants.get(index).copied()
    }

    /// Opens a handle scope for rooting temporaries.
    pub fn handle_scope(&self) -> HandleScope {
        self.heap.handle_scope()
    }

    /// Roots `value` until the returned handle is dropped.
    pub fn persistent(&self, value: Value) -> Persistent {
        self.heap.persistent(value)
    }

    /// Observes `value` without keeping it alive.
    pub fn weak(&self, value: Value) -> WeakHandle {
        self.heap.weak(value)
    }
}
