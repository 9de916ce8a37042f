//! The engine instance.
//!
//! An [`Engine`] owns everything one JavaScript realm needs: the managed
//! heap with its class pool, the intrinsic objects, the call-frame stack,
//! the pending-exception slot, and the tables of pinned identifiers,
//! constants and native functions. Nothing is process-wide; several
//! engines can coexist on one thread.

use std::collections::{HashMap, HashSet};

use core_types::{HeapRef, Value};
use memory_manager::{GcStats, Heap};

use crate::call_frame::CallFrame;
use crate::config::EngineConfig;
use crate::function::NativeFunction;
use crate::intrinsics::{empty_function, Intrinsics, Names};

/// A JavaScript engine instance.
pub struct Engine {
    pub(crate) heap: Heap,
    pub(crate) config: EngineConfig,
    pub(crate) intrinsics: Intrinsics,
    pub(crate) names: Names,
    pub(crate) frames: Vec<CallFrame>,
    pub(crate) exception: Option<Value>,
    pub(crate) identifiers: Vec<HeapRef>,
    pub(crate) identifier_set: HashSet<HeapRef>,
    pub(crate) constants: Vec<Value>,
    pub(crate) natives: Vec<NativeFunction>,
    pub(crate) native_codes: HashMap<usize, u32>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("live_cells", &self.heap.live_cells())
            .field("classes", &self.heap.classes().len())
            .field("frames", &self.frames.len())
            .field("exception", &self.exception)
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut heap = Heap::new(config.heap);
        let names = Names::intern(&mut heap);
        let intrinsics = Intrinsics::allocate(&mut heap, &names);
        let mut engine = Engine {
            heap,
            config,
            intrinsics,
            names,
            frames: vec![CallFrame::global(intrinsics.global_context)],
            exception: None,
            identifiers: Vec::new(),
            identifier_set: HashSet::new(),
            constants: Vec::new(),
            natives: vec![empty_function as NativeFunction],
            native_codes: HashMap::from([(empty_function as NativeFunction as usize, 0)]),
        };
        engine.install_intrinsics();
        engine
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The managed heap.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Mutable access to the managed heap.
    ///
    /// Allocating directly on the heap bypasses the engine's collection
    /// trigger.
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// The intrinsic objects.
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// The global object.
    pub fn global_object(&self) -> HeapRef {
        self.intrinsics.global
    }

    /// Collector statistics.
    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }

    /// Text of an interned string.
    pub fn string_text(&self, s: HeapRef) -> &str {
        self.heap.string(s)
    }
}
