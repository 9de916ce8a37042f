//! Managed heap arena.
//!
//! Cells live in a vector of slots indexed by [`HeapRef`]. Freed slots go
//! on a free list and are reused; each reuse bumps the slot's generation.
//! The heap also owns the string intern table, the hidden-class pool and
//! the handle tables, so a single `Heap` is everything the collector
//! needs to see.

use std::collections::HashMap;
use std::rc::Rc;

use core_types::{HeapRef, Value};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::cell::{HeapCell, JsString};
use crate::context::ContextRecord;
use crate::gc::{GcStats, MarkBits};
use crate::handles::{HandleScope, Persistent, RootSet, WeakHandle};
use crate::hidden_class::{ClassId, ClassPool};
use crate::object::{JsObject, ObjectKind};

/// Collector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Allocations between collections, at minimum
    pub gc_threshold: usize,
    /// After a collection the next threshold is `live * growth_factor`
    /// (never below `gc_threshold`)
    pub growth_factor: f64,
    /// Hard limit on live cells; `None` means unbounded
    pub max_cells: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        HeapConfig {
            gc_threshold: 4096,
            growth_factor: 2.0,
            max_cells: None,
        }
    }
}

/// One arena slot.
#[derive(Debug)]
pub struct CellSlot {
    pub(crate) generation: u16,
    pub(crate) cell: Option<HeapCell>,
}

/// The managed heap.
#[derive(Debug)]
pub struct Heap {
    pub(crate) cells: Vec<CellSlot>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) marks: MarkBits,
    pub(crate) class_marks: MarkBits,
    pub(crate) strings: HashMap<Rc<str>, HeapRef>,
    pub(crate) classes: ClassPool,
    pub(crate) roots: Rc<RootSet>,
    pub(crate) config: HeapConfig,
    pub(crate) stats: GcStats,
    pub(crate) live: usize,
    pub(crate) allocated_since_gc: usize,
    pub(crate) threshold: usize,
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new(HeapConfig::default())
    }
}

impl Heap {
    /// Creates an empty heap.
    pub fn new(config: HeapConfig) -> Self {
        Heap {
            cells: Vec::new(),
            free_list: Vec::new(),
            marks: MarkBits::default(),
            class_marks: MarkBits::default(),
            strings: HashMap::new(),
            classes: ClassPool::new(),
            roots: Rc::new(RootSet::default()),
            config,
            stats: GcStats::default(),
            live: 0,
            allocated_since_gc: 0,
            threshold: config.gc_threshold,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Collector statistics.
    pub fn stats(&self) -> GcStats {
        self.stats
    }

    /// Number of live cells.
    pub fn live_cells(&self) -> usize {
        self.live
    }

    /// Allocations left before the next collection is due.
    pub fn allocations_until_gc(&self) -> usize {
        self.threshold.saturating_sub(self.allocated_since_gc)
    }

    /// Whether the owner should collect before its next allocation.
    pub fn should_collect(&self) -> bool {
        self.allocated_since_gc >= self.threshold
            || self.config.max_cells.is_some_and(|max| self.live >= max)
    }

    /// Stores a cell and returns its reference.
    ///
    /// # Panics
    ///
    /// Panics when `max_cells` live cells already exist. Owners collect
    /// first (see [`Heap::should_collect`]), so reaching this means the
    /// live set itself exceeds the limit.
    pub fn allocate(&mut self, cell: HeapCell) -> HeapRef {
        if let Some(max) = self.config.max_cells {
            if self.live >= max {
                error!(live = self.live, max, "managed heap exhausted");
                panic!("out of memory: {} live cells reached the heap limit", self.live);
            }
        }
        self.live += 1;
        self.allocated_since_gc += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.cells[index as usize];
            slot.cell = Some(cell);
            return HeapRef::new(index, slot.generation);
        }
        let index = self.cells.len() as u32;
        self.cells.push(CellSlot {
            generation: 0,
            cell: Some(cell),
        });
        HeapRef::new(index, 0)
    }

    /// Returns the interned string equal to `text`, allocating it if needed.
    pub fn intern(&mut self, text: &str) -> HeapRef {
        if let Some(&r) = self.strings.get(text) {
            return r;
        }
        let shared: Rc<str> = Rc::from(text);
        let r = self.allocate(HeapCell::String(JsString::new(Rc::clone(&shared))));
        self.strings.insert(shared, r);
        r
    }

    /// Looks up an interned string without allocating.
    pub fn lookup_interned(&self, text: &str) -> Option<HeapRef> {
        self.strings.get(text).copied()
    }

    /// Number of interned strings.
    pub fn interned_count(&self) -> usize {
        self.strings.len()
    }

    /// Allocates an empty object with the root class for `prototype`.
    pub fn alloc_object(&mut self, prototype: Value, kind: ObjectKind) -> HeapRef {
        let class = self.classes.empty_class(prototype);
        self.alloc_object_with_class(class, kind)
    }

    /// Allocates an empty object of class `class`.
    pub fn alloc_object_with_class(&mut self, class: ClassId, kind: ObjectKind) -> HeapRef {
        self.allocate(HeapCell::Object(JsObject::new(class, kind)))
    }

    /// Allocates a context record.
    pub fn alloc_context(&mut self, context: ContextRecord) -> HeapRef {
        self.allocate(HeapCell::Context(context))
    }

    /// Returns true if `r` points at a cell that has not been reclaimed.
    pub fn is_live(&self, r: HeapRef) -> bool {
        self.try_get(r).is_some()
    }

    /// The cell behind `r`, or `None` if it is stale.
    pub fn try_get(&self, r: HeapRef) -> Option<&HeapCell> {
        let slot = self.cells.get(r.index())?;
        if slot.generation != r.generation() {
            return None;
        }
        slot.cell.as_ref()
    }

    fn try_get_mut(&mut self, r: HeapRef) -> Option<&mut HeapCell> {
        let slot = self.cells.get_mut(r.index())?;
        if slot.generation != r.generation() {
            return None;
        }
        slot.cell.as_mut()
    }

    /// The cell behind `r`.
    ///
    /// # Panics
    ///
    /// Panics on a stale reference.
    pub fn get(&self, r: HeapRef) -> &HeapCell {
        match self.try_get(r) {
            Some(cell) => cell,
            None => panic!("stale heap reference {r:?}"),
        }
    }

    /// The object behind `r`, or `None` if it is stale or not an object.
    pub fn try_object(&self, r: HeapRef) -> Option<&JsObject> {
        match self.try_get(r)? {
            HeapCell::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The object behind `r`.
    ///
    /// # Panics
    ///
    /// Panics if `r` is stale or not an object.
    pub fn object(&self, r: HeapRef) -> &JsObject {
        match self.try_get(r) {
            Some(HeapCell::Object(object)) => object,
            other => panic!("expected object at {r:?}, found {}", describe(other)),
        }
    }

    /// Mutable access to the object behind `r`.
    ///
    /// # Panics
    ///
    /// Panics if `r` is stale or not an object.
    pub fn object_mut(&mut self, r: HeapRef) -> &mut JsObject {
        match self.try_get_mut(r) {
            Some(HeapCell::Object(object)) => object,
            other => panic!("expected object at {r:?}, found {}", describe(other.map(|c| &*c))),
        }
    }

    /// The string behind `r`.
    ///
    /// # Panics
    ///
    /// Panics if `r` is stale or not a string.
    pub fn js_string(&self, r: HeapRef) -> &JsString {
        match self.try_get(r) {
            Some(HeapCell::String(s)) => s,
            other => panic!("expected string at {r:?}, found {}", describe(other)),
        }
    }

    /// Text of the string behind `r`.
    pub fn string(&self, r: HeapRef) -> &str {
        self.js_string(r).as_str()
    }

    /// The context behind `r`.
    ///
    /// # Panics
    ///
    /// Panics if `r` is stale or not a context.
    pub fn context(&self, r: HeapRef) -> &ContextRecord {
        match self.try_get(r) {
            Some(HeapCell::Context(context)) => context,
            other => panic!("expected context at {r:?}, found {}", describe(other)),
        }
    }

    /// Mutable access to the context behind `r`.
    ///
    /// # Panics
    ///
    /// Panics if `r` is stale or not a context.
    pub fn context_mut(&mut self, r: HeapRef) -> &mut ContextRecord {
        match self.try_get_mut(r) {
            Some(HeapCell::Context(context)) => context,
            other => panic!("expected context at {r:?}, found {}", describe(other.map(|c| &*c))),
        }
    }

    /// The hidden-class pool.
    pub fn classes(&self) -> &ClassPool {
        &self.classes
    }

    /// Mutable access to the hidden-class pool.
    pub fn classes_mut(&mut self) -> &mut ClassPool {
        &mut self.classes
    }

    /// Handle tables of this heap.
    pub fn roots(&self) -> &Rc<RootSet> {
        &self.roots
    }

    /// Opens a handle scope.
    pub fn handle_scope(&self) -> HandleScope {
        HandleScope::new(&self.roots)
    }

    /// Creates a persistent root for `value`.
    pub fn persistent(&self, value: Value) -> Persistent {
        Persistent::new(&self.roots, value)
    }

    /// Creates a weak handle to `value`.
    pub fn weak(&self, value: Value) -> WeakHandle {
        WeakHandle::new(&self.roots, value)
    }

    /// Number of weak handles whose heap target is still alive.
    pub fn weak_count(&self) -> usize {
        self.roots.weak_len()
    }
}

fn describe(cell: Option<&HeapCell>) -> &'static str {
    cell.map_or("a stale reference", HeapCell::kind_name)
}
