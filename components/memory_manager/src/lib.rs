//! Memory Manager - managed heap and garbage collector
//!
//! This component provides:
//! - An arena of managed cells (strings, objects, execution contexts)
//!   addressed by generation-checked [`core_types::HeapRef`]s
//! - Engine-wide string interning
//! - Hidden classes with interned transitions for shape-based caching
//! - Named slot and dense/sparse indexed property storage
//! - Scoped, persistent and weak rooting handles
//! - Stop-the-world mark-and-sweep collection

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod array;
pub mod cell;
pub mod context;
pub mod gc;
pub mod handles;
pub mod heap;
pub mod hidden_class;
pub mod object;

// Re-export main types
pub use array::{ArrayStorage, IndexedProperty, SPARSE_GAP_LIMIT};
pub use cell::{HeapCell, JsString};
pub use context::{CallContext, ContextKind, ContextRecord};
pub use gc::{CollectionReport, GcStats, MarkBits, NoRoots, RootSource, Trace, Tracer};
pub use handles::{HandleScope, Local, Persistent, RootSet, WeakHandle};
pub use heap::{CellSlot, Heap, HeapConfig};
pub use hidden_class::{ClassEntry, ClassId, ClassPool, HiddenClass, PropertyAttributes};
pub use object::{BoundFunctionData, FunctionData, JsObject, ObjectKind, OwnSlot, Slot, INLINE_SLOTS};
