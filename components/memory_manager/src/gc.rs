//! Stop-the-world mark-and-sweep collector.
//!
//! Marking starts from the heap's own handle tables plus whatever the
//! embedder's [`RootSource`] reports, then drains a gray work-list. Strings,
//! objects, contexts and hidden classes are all marked; sweeping reclaims
//! unmarked cells and classes and clears weak handles whose targets died.
//!
//! Reclaimed slots get a new generation, so a [`HeapRef`] that survived its
//! target is detectably stale instead of aliasing a later allocation.

use std::time::{Duration, Instant};

use core_types::{HeapRef, Value};
use tracing::debug;

use crate::heap::{CellSlot, Heap};
use crate::hidden_class::{ClassId, ClassPool};

/// Per-index mark bitmap.
#[derive(Debug, Default, Clone)]
pub struct MarkBits {
    words: Vec<u64>,
}

impl MarkBits {
    /// Clears every bit and sizes the map for `len` entries.
    pub fn reset(&mut self, len: usize) {
        self.words.clear();
        self.words.resize(len.div_ceil(64), 0);
    }

    /// Sets bit `index`, growing the map if needed.
    pub fn set(&mut self, index: usize) {
        let word = index / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (index % 64);
    }

    /// Returns whether bit `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|w| w & (1 << (index % 64)) != 0)
    }
}

/// Something that holds references the collector must follow.
pub trait Trace {
    /// Reports every reference held by `self` to the tracer.
    fn trace(&self, tracer: &mut Tracer<'_>);
}

/// Supplier of roots outside the heap's handle tables.
pub trait RootSource {
    /// Reports every root to the tracer.
    fn trace_roots(&self, tracer: &mut Tracer<'_>);
}

impl<F> RootSource for F
where
    F: Fn(&mut Tracer<'_>),
{
    fn trace_roots(&self, tracer: &mut Tracer<'_>) {
        self(tracer)
    }
}

/// Root source with nothing in it.
pub struct NoRoots;

impl RootSource for NoRoots {
    fn trace_roots(&self, _tracer: &mut Tracer<'_>) {}
}

/// Marking state handed to [`Trace`] implementations.
pub struct Tracer<'a> {
    cells: &'a [CellSlot],
    classes: &'a ClassPool,
    marks: &'a mut MarkBits,
    class_marks: &'a mut MarkBits,
    gray: Vec<HeapRef>,
    gray_classes: Vec<ClassId>,
    marked: usize,
}

impl<'a> Tracer<'a> {
    fn new(
        cells: &'a [CellSlot],
        classes: &'a ClassPool,
        marks: &'a mut MarkBits,
        class_marks: &'a mut MarkBits,
    ) -> Self {
        Tracer {
            cells,
            classes,
            marks,
            class_marks,
            gray: Vec::new(),
            gray_classes: Vec::new(),
            marked: 0,
        }
    }

    /// Marks the cell a value points to, if it is managed.
    pub fn mark_value(&mut self, value: Value) {
        if let Some(r) = value.as_heap_ref() {
            self.mark_ref(r);
        }
    }

    /// Marks a cell. Stale references are ignored.
    pub fn mark_ref(&mut self, r: HeapRef) {
        let live = self
            .cells
            .get(r.index())
            .is_some_and(|slot| slot.generation == r.generation() && slot.cell.is_some());
        if live && !self.marks.is_set(r.index()) {
            self.marks.set(r.index());
            self.marked += 1;
            self.gray.push(r);
        }
    }

    /// Marks a hidden class.
    pub fn mark_class(&mut self, id: ClassId) {
        if self.classes.is_live(id) && !self.class_marks.is_set(id.index()) {
            self.class_marks.set(id.index());
            self.gray_classes.push(id);
        }
    }

    fn drain(&mut self) {
        let cells = self.cells;
        let classes = self.classes;
        loop {
            if let Some(r) = self.gray.pop() {
                if let Some(cell) = cells[r.index()].cell.as_ref() {
                    cell.trace(self);
                }
            } else if let Some(id) = self.gray_classes.pop() {
                if let Some(class) = classes.try_get(id) {
                    class.trace(self);
                }
            } else {
                break;
            }
        }
    }
}

/// Outcome of one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Cells found reachable
    pub marked: usize,
    /// Cells reclaimed
    pub reclaimed: usize,
    /// Hidden classes reclaimed
    pub classes_reclaimed: usize,
    /// Weak handles cleared
    pub weak_cleared: usize,
    /// Cells alive afterwards
    pub live: usize,
}

/// Cumulative collector statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Number of collections run
    pub collections: u64,
    /// Cells marked by the last collection
    pub marked: usize,
    /// Total cells reclaimed over all collections
    pub reclaimed: u64,
    /// Cells alive after the last collection
    pub live: usize,
    /// Time spent collecting
    pub total_pause: Duration,
}

impl Heap {
    /// Runs a full collection.
    ///
    /// Roots are the heap's scoped and persistent handles plus everything
    /// `roots` reports. Returns what the cycle did.
    pub fn collect(&mut self, roots: &dyn RootSource) -> CollectionReport {
        let start = Instant::now();
        self.marks.reset(self.cells.len());
        self.class_marks.reset(self.classes.slot_count());

        let mut tracer = Tracer::new(
            &self.cells,
            &self.classes,
            &mut self.marks,
            &mut self.class_marks,
        );
        self.roots.trace(&mut tracer);
        roots.trace_roots(&mut tracer);
        tracer.drain();
        let marked = tracer.marked;

        let reclaimed = self.sweep_cells();
        let classes_reclaimed = self.classes.sweep(&self.class_marks);
        let weak_cleared = {
            let cells = &self.cells;
            let marks = &self.marks;
            self.roots.clear_dead_weak(|r| {
                marks.is_set(r.index()) && cells[r.index()].generation == r.generation()
            })
        };

        self.allocated_since_gc = 0;
        let grown = (self.live as f64 * self.config.growth_factor) as usize;
        self.threshold = grown.max(self.config.gc_threshold);

        let pause = start.elapsed();
        self.stats.collections += 1;
        self.stats.marked = marked;
        self.stats.reclaimed += reclaimed as u64;
        self.stats.live = self.live;
        self.stats.total_pause += pause;

        debug!(
            marked,
            reclaimed,
            classes_reclaimed,
            weak_cleared,
            live = self.live,
            classes = self.classes.len(),
            next_threshold = self.threshold,
            pause_us = pause.as_micros() as u64,
            "garbage collection finished"
        );

        CollectionReport {
            marked,
            reclaimed,
            classes_reclaimed,
            weak_cleared,
            live: self.live,
        }
    }

    fn sweep_cells(&mut self) -> usize {
        let mut reclaimed = 0;
        for (index, slot) in self.cells.iter_mut().enumerate() {
            if slot.cell.is_none() || self.marks.is_set(index) {
                continue;
            }
            if let Some(crate::cell::HeapCell::String(s)) = slot.cell.take() {
                self.strings.remove(s.shared());
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(index as u32);
            reclaimed += 1;
        }
        self.live -= reclaimed;
        reclaimed
    }
}
