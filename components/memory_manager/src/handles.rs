//! Rooting handles.
//!
//! Host code and engine internals keep values alive across allocations by
//! registering them in the heap's [`RootSet`]:
//!
//! - [`HandleScope`] / [`Local`]: stack-scoped roots, released in LIFO order
//!   when the scope is dropped.
//! - [`Persistent`]: a root that lives until the handle is dropped.
//! - [`WeakHandle`]: observes a value without keeping it alive; reads
//!   `None` once the target has been reclaimed.

use std::cell::RefCell;
use std::rc::Rc;

use core_types::{HeapRef, Value};

use crate::gc::Tracer;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Entry {
    Free,
    Held(Value),
    Cleared,
}

#[derive(Debug, Default)]
struct SlotTable {
    entries: Vec<Entry>,
    free: Vec<usize>,
}

impl SlotTable {
    fn insert(&mut self, value: Value) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.entries[index] = Entry::Held(value);
                index
            }
            None => {
                self.entries.push(Entry::Held(value));
                self.entries.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        self.entries[index] = Entry::Free;
        self.free.push(index);
    }

    fn get(&self, index: usize) -> Option<Value> {
        match self.entries[index] {
            Entry::Held(value) => Some(value),
            Entry::Free | Entry::Cleared => None,
        }
    }

    fn held(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Entry::Held(v) => Some(*v),
            _ => None,
        })
    }
}

/// Handle tables shared between a heap and the handles that point into it.
#[derive(Debug, Default)]
pub struct RootSet {
    scoped: RefCell<Vec<Value>>,
    persistent: RefCell<SlotTable>,
    weak: RefCell<SlotTable>,
}

impl RootSet {
    /// Number of live scoped handles.
    pub fn scoped_len(&self) -> usize {
        self.scoped.borrow().len()
    }

    /// Number of live persistent handles.
    pub fn persistent_len(&self) -> usize {
        self.persistent.borrow().held().count()
    }

    /// Number of weak handles whose heap target is still alive. Handles to
    /// primitives never clear and are not counted.
    pub fn weak_len(&self) -> usize {
        self.weak.borrow().held().filter(Value::is_managed).count()
    }

    pub(crate) fn trace(&self, tracer: &mut Tracer<'_>) {
        for &value in self.scoped.borrow().iter() {
            tracer.mark_value(value);
        }
        for value in self.persistent.borrow().held() {
            tracer.mark_value(value);
        }
    }

    /// Clears weak entries whose managed target fails `alive`.
    pub(crate) fn clear_dead_weak(&self, alive: impl Fn(HeapRef) -> bool) -> usize {
        let mut weak = self.weak.borrow_mut();
        let mut cleared = 0;
        for entry in weak.entries.iter_mut() {
            if let Entry::Held(value) = *entry {
                if value.as_heap_ref().is_some_and(|r| !alive(r)) {
                    *entry = Entry::Cleared;
                    cleared += 1;
                }
            }
        }
        cleared
    }
}

/// Region of scoped roots. Values rooted through it stay alive until the
/// scope is dropped.
#[derive(Debug)]
pub struct HandleScope {
    roots: Rc<RootSet>,
    base: usize,
}

impl HandleScope {
    /// Opens a scope on top of the current scoped-handle stack.
    pub fn new(roots: &Rc<RootSet>) -> Self {
        let base = roots.scoped_len();
        HandleScope {
            roots: Rc::clone(roots),
            base,
        }
    }

    /// Roots `value` for the lifetime of this scope.
    pub fn root(&self, value: Value) -> Local<'_> {
        let mut scoped = self.roots.scoped.borrow_mut();
        scoped.push(value);
        Local {
            roots: &self.roots,
            index: scoped.len() - 1,
        }
    }

    /// Roots every value in `values`.
    pub fn root_all(&self, values: &[Value]) {
        self.roots.scoped.borrow_mut().extend_from_slice(values);
    }
}

impl Drop for HandleScope {
    fn drop(&mut self) {
        let mut scoped = self.roots.scoped.borrow_mut();
        debug_assert!(scoped.len() >= self.base, "handle scopes released out of order");
        scoped.truncate(self.base);
    }
}

/// A value rooted in a [`HandleScope`].
#[derive(Debug, Clone, Copy)]
pub struct Local<'s> {
    roots: &'s RootSet,
    index: usize,
}

impl Local<'_> {
    /// Current value.
    pub fn get(&self) -> Value {
        self.roots.scoped.borrow()[self.index]
    }

    /// Replaces the rooted value.
    pub fn set(&self, value: Value) {
        self.roots.scoped.borrow_mut()[self.index] = value;
    }
}

/// A root that lives as long as the handle.
#[derive(Debug)]
pub struct Persistent {
    roots: Rc<RootSet>,
    index: usize,
}

impl Persistent {
    /// Roots `value` until the returned handle is dropped.
    pub fn new(roots: &Rc<RootSet>, value: Value) -> Self {
        let index = roots.persistent.borrow_mut().insert(value);
        Persistent {
            roots: Rc::clone(roots),
            index,
        }
    }

    /// Current value.
    pub fn get(&self) -> Value {
        self.roots
            .persistent
            .borrow()
            .get(self.index)
            .unwrap_or(Value::Undefined)
    }

    /// Replaces the rooted value.
    pub fn set(&self, value: Value) {
        self.roots.persistent.borrow_mut().entries[self.index] = Entry::Held(value);
    }
}

impl Clone for Persistent {
    fn clone(&self) -> Self {
        Persistent::new(&self.roots, self.get())
    }
}

impl Drop for Persistent {
    fn drop(&mut self) {
        self.roots.persistent.borrow_mut().release(self.index);
    }
}

/// A non-owning reference that is cleared when its target is collected.
#[derive(Debug)]
pub struct WeakHandle {
    roots: Rc<RootSet>,
    index: usize,
}

impl WeakHandle {
    /// Observes `value` without rooting it.
    pub fn new(roots: &Rc<RootSet>, value: Value) -> Self {
        let index = roots.weak.borrow_mut().insert(value);
        WeakHandle {
            roots: Rc::clone(roots),
            index,
        }
    }

    /// The target, or `None` once it has been reclaimed.
    pub fn get(&self) -> Option<Value> {
        self.roots.weak.borrow().get(self.index)
    }

    /// Returns true once the target has been reclaimed.
    pub fn is_cleared(&self) -> bool {
        self.get().is_none()
    }
}

impl Drop for WeakHandle {
    fn drop(&mut self) {
        self.roots.weak.borrow_mut().release(self.index);
    }
}
