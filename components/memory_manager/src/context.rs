//! Heap layout of execution contexts.
//!
//! Contexts are managed cells so closures can capture them. Each context
//! links to its lexically enclosing one through `outer`; the chain always
//! ends at the global context.

use core_types::{HeapRef, Value};

use crate::gc::{Trace, Tracer};
use crate::hidden_class::ClassId;

/// Activation record of a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    /// Function being executed
    pub function: Value,
    /// Receiver of the call
    pub this: Value,
    /// Actual arguments
    pub arguments: Vec<Value>,
    /// Lazily created `arguments` object
    pub arguments_object: Option<HeapRef>,
    /// Layout of the local variables; keys are variable names
    pub locals_class: ClassId,
    /// Local variable values, indexed by `locals_class` slot
    pub locals: Vec<Value>,
}

/// What kind of scope a context is.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextKind {
    /// Global scope; bindings are properties of the global object
    Global,
    /// Function activation
    Call(CallContext),
    /// `with (object)` scope
    With {
        /// Binding object
        object: HeapRef,
    },
    /// `catch (name)` scope holding a single binding
    Catch {
        /// Name of the exception binding
        name: HeapRef,
        /// Caught value
        value: Value,
    },
}

/// A scope in the context chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRecord {
    /// Scope kind and payload
    pub kind: ContextKind,
    /// Enclosing context
    pub outer: Option<HeapRef>,
    /// Whether code in this scope is strict
    pub strict: bool,
}

impl ContextRecord {
    /// Call payload, for function contexts.
    pub fn call(&self) -> Option<&CallContext> {
        match &self.kind {
            ContextKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Mutable call payload, for function contexts.
    pub fn call_mut(&mut self) -> Option<&mut CallContext> {
        match &mut self.kind {
            ContextKind::Call(call) => Some(call),
            _ => None,
        }
    }
}

impl Trace for ContextRecord {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        if let Some(outer) = self.outer {
            tracer.mark_ref(outer);
        }
        match &self.kind {
            ContextKind::Global => {}
            ContextKind::Call(call) => {
                tracer.mark_value(call.function);
                tracer.mark_value(call.this);
                for &v in call.arguments.iter().chain(&call.locals) {
                    tracer.mark_value(v);
                }
                if let Some(args) = call.arguments_object {
                    tracer.mark_ref(args);
                }
                tracer.mark_class(call.locals_class);
            }
            ContextKind::With { object } => tracer.mark_ref(*object),
            ContextKind::Catch { name, value } => {
                tracer.mark_ref(*name);
                tracer.mark_value(*value);
            }
        }
    }
}
