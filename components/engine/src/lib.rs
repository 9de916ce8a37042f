//! Engine - one isolated JavaScript engine instance
//!
//! This crate ties the managed heap to the object model:
//! - Ordinary object internal methods (get, put, define, delete, enumerate)
//!   including array `length` and string wrapper semantics
//! - Inline lookup caches keyed by hidden class
//! - Execution contexts, call frames and identifier resolution
//! - Native function calls, construction and bound functions
//! - Garbage collection rooted at the engine's frames, handles and
//!   intrinsics
//!
//! # Example
//!
//! ```
//! use core_types::Value;
//! use engine::Engine;
//!
//! let mut engine = Engine::new();
//! let obj = engine.new_object();
//! let key = engine.key("answer");
//! engine.put(Value::Object(obj), key, Value::Integer(42)).unwrap();
//! assert_eq!(engine.get(obj, key).unwrap(), Value::Integer(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod call_frame;
pub mod config;
pub mod context;
pub mod conversion;
pub mod engine;
pub mod exception;
pub mod function;
pub mod gc_integration;
pub mod inline_cache;
pub mod intrinsics;
pub mod property;

// Re-export main types at crate root
pub use call_frame::CallFrame;
pub use config::{ConfigError, EngineConfig, DEFAULT_MAX_CALL_DEPTH};
pub use context::Binding;
pub use conversion::PreferredType;
pub use engine::Engine;
pub use function::{CallArgs, NativeFunction};
pub use inline_cache::{CacheEntry, CacheKind, IndexedLookup, Lookup, LookupState, POLYMORPHIC_CAPACITY};
pub use intrinsics::Intrinsics;
pub use property::PropertyDescriptor;
