//! Integration test suite for the engine core
//!
//! This crate provides integration tests that verify the value
//! representation, the managed heap and the engine instance work together
//! across component boundaries.

use core_types::{JsResult, Value};
use engine::Engine;

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use engine;
    pub use memory_manager;
}

/// Creates an object with the named properties set in order.
pub fn object_with(engine: &mut Engine, properties: &[(&str, Value)]) -> JsResult<core_types::HeapRef> {
    let object = engine.new_object();
    let scope = engine.handle_scope();
    scope.root(Value::Object(object));
    for &(name, value) in properties {
        let key = engine.key(name);
        engine.put(Value::Object(object), key, value)?;
    }
    Ok(object)
}

/// Own property names of `object`, as Rust strings.
pub fn own_names(engine: &Engine, object: core_types::HeapRef) -> Vec<String> {
    engine
        .own_property_keys(object)
        .into_iter()
        .map(|key| engine.key_to_string(key))
        .collect()
}
