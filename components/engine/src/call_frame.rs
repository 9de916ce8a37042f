//! Call frame for function call stack management

use core_types::{ErrorKind, HeapRef, JsResult, Value};
use memory_manager::Tracer;
use tracing::warn;

use crate::engine::Engine;

/// Call frame representing a function invocation
///
/// The bottom frame belongs to global code. Each frame tracks the context
/// its code started in and the innermost context currently active (deeper
/// when `with` or `catch` scopes are open).
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Innermost active context
    pub context: HeapRef,
    /// Context the frame was entered with
    pub base_context: HeapRef,
    /// Function being executed (`Undefined` for global code)
    pub function: Value,
    /// Whether the code is strict
    pub strict: bool,
    /// Nesting depth; global code is 0
    pub depth: usize,
}

impl CallFrame {
    /// Frame for global code.
    pub fn global(context: HeapRef) -> Self {
        Self {
            context,
            base_context: context,
            function: Value::Undefined,
            strict: false,
            depth: 0,
        }
    }

    pub(crate) fn trace(&self, tracer: &mut Tracer<'_>) {
        tracer.mark_ref(self.context);
        tracer.mark_ref(self.base_context);
        tracer.mark_value(self.function);
    }
}

impl Engine {
    /// The active frame.
    pub fn current_frame(&self) -> &CallFrame {
        // The global frame is pushed at creation and never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn current_frame_mut(&mut self) -> &mut CallFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// The active context.
    pub fn current_context(&self) -> HeapRef {
        self.current_frame().context
    }

    pub(crate) fn set_current_context(&mut self, context: HeapRef) {
        self.current_frame_mut().context = context;
    }

    /// Whether the running code is strict.
    pub fn is_strict(&self) -> bool {
        self.current_frame().strict
    }

    /// Switches global code between strict and sloppy mode.
    pub fn set_global_strict(&mut self, strict: bool) {
        self.frames[0].strict = strict;
        let global = self.intrinsics.global_context;
        self.heap.context_mut(global).strict = strict;
    }

    /// Number of active function calls.
    pub fn call_depth(&self) -> usize {
        self.current_frame().depth
    }

    /// Enters a function frame, enforcing the call-depth limit.
    pub(crate) fn push_frame(
        &mut self,
        context: HeapRef,
        function: Value,
        strict: bool,
    ) -> JsResult<()> {
        let depth = self.call_depth() + 1;
        if depth > self.config.max_call_depth {
            warn!(depth, limit = self.config.max_call_depth, "call depth limit reached");
            return Err(self.throw_error(
                ErrorKind::RangeError,
                "Maximum call stack size exceeded",
            ));
        }
        self.frames.push(CallFrame {
            context,
            base_context: context,
            function,
            strict,
            depth,
        });
        Ok(())
    }

    /// Leaves the current function frame.
    pub(crate) fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }
}
