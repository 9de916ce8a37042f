//! Pending-exception model.
//!
//! A throwing operation stores the thrown value in the engine's exception
//! slot and returns `Err(PendingException)`. Callers propagate with `?`;
//! whoever handles the exception takes the value back out with
//! [`Engine::catch_exception`]. The slot is a GC root.

use core_types::{ErrorKind, HeapRef, JsError, PendingException, Value};
use memory_manager::{ObjectKind, Slot};

use crate::engine::Engine;
use crate::intrinsics::builtin_attributes;

impl Engine {
    /// Makes `value` the pending exception.
    pub fn throw(&mut self, value: Value) -> PendingException {
        self.exception = Some(value);
        PendingException
    }

    /// Creates an error of `kind` and makes it the pending exception.
    ///
    /// ```
    /// use core_types::ErrorKind;
    /// use engine::Engine;
    ///
    /// let mut engine = Engine::new();
    /// let _ = engine.throw_error(ErrorKind::TypeError, "not callable");
    /// let error = engine.take_error().unwrap();
    /// assert_eq!(error.to_string(), "TypeError: not callable");
    /// ```
    pub fn throw_error(&mut self, kind: ErrorKind, message: &str) -> PendingException {
        let error = self.new_error(kind, message);
        self.throw(Value::Object(error))
    }

    /// Allocates an error object of `kind` with an own `message`.
    pub fn new_error(&mut self, kind: ErrorKind, message: &str) -> HeapRef {
        let prototype = Value::Object(self.intrinsics.error_prototype(kind));
        let error = self.new_object_with_prototype(prototype, ObjectKind::Error(kind));
        let scope = self.handle_scope();
        scope.root(Value::Object(error));
        let text = self.new_string(message);
        let key = self.names.message;
        self.heap
            .add_own_slot(error, key, builtin_attributes(), Slot::Data(text));
        error
    }

    /// Returns true while an exception is pending.
    pub fn has_exception(&self) -> bool {
        self.exception.is_some()
    }

    /// The pending exception, left in place.
    pub fn exception(&self) -> Option<Value> {
        self.exception
    }

    /// Clears the pending exception and returns it.
    pub fn catch_exception(&mut self) -> Option<Value> {
        self.exception.take()
    }

    /// Clears the pending exception and converts it into a host report.
    pub fn take_error(&mut self) -> Option<JsError> {
        let value = self.catch_exception()?;
        Some(self.describe_exception(value))
    }

    fn describe_exception(&mut self, value: Value) -> JsError {
        if let Some(object) = value.as_object() {
            if let ObjectKind::Error(kind) = self.heap.object(object).kind {
                let message = self
                    .heap
                    .find_own_slot(object, self.names.message)
                    .and_then(|own| match own.value {
                        Slot::Data(Value::String(s)) => Some(self.heap.string(s).to_string()),
                        _ => None,
                    })
                    .unwrap_or_default();
                return JsError::new(kind, message);
            }
        }
        let scope = self.handle_scope();
        scope.root(value);
        match self.to_rust_string(value) {
            Ok(text) => JsError::new(ErrorKind::Error, text),
            Err(_) => {
                self.catch_exception();
                JsError::new(ErrorKind::Error, "uncaught exception")
            }
        }
    }
}
