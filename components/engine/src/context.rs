//! Identifier resolution over the context chain.
//!
//! Names resolve from the innermost context outwards: function locals,
//! `catch` bindings, `with` objects and finally the global object. The
//! `arguments` object of a function is created the first time it is
//! looked up.

use core_types::{ErrorKind, HeapRef, JsResult, PropertyKey, Value};
use memory_manager::{ArrayStorage, ContextKind, ContextRecord, PropertyAttributes, Slot};

use crate::call_frame::CallFrame;
use crate::engine::Engine;
use crate::intrinsics::builtin_attributes;

/// Where an identifier resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A local variable of a function context
    Local {
        /// The call context
        context: HeapRef,
        /// Slot in the context's locals
        slot: u32,
    },
    /// The parameter of a `catch` clause
    Catch {
        /// The catch context
        context: HeapRef,
    },
    /// A property of a `with` object or of the global object
    Object {
        /// Object holding the property
        object: HeapRef,
    },
    /// The implicit `arguments` of a function context
    Arguments {
        /// The call context
        context: HeapRef,
    },
    /// No binding with that name is visible
    Unresolvable,
}

impl Engine {
    /// Resolves `name` starting at the current context.
    pub fn resolve_binding(&self, name: HeapRef) -> Binding {
        let key = self.key_for_string(name);
        let mut cursor = Some(self.current_context());
        while let Some(context) = cursor {
            let record = self.heap.context(context);
            match &record.kind {
                ContextKind::Call(call) => {
                    let locals = self.heap.classes().get(call.locals_class);
                    if let Some(slot) = locals.lookup_property(name) {
                        return Binding::Local { context, slot };
                    }
                    if name == self.names.arguments {
                        return Binding::Arguments { context };
                    }
                }
                ContextKind::Catch { name: bound, .. } if *bound == name => {
                    return Binding::Catch { context };
                }
                ContextKind::Catch { .. } => {}
                ContextKind::With { object } => {
                    if self.has_property(*object, key) {
                        return Binding::Object { object: *object };
                    }
                }
                ContextKind::Global => {
                    let global = self.intrinsics.global;
                    if self.has_property(global, key) {
                        return Binding::Object { object: global };
                    }
                }
            }
            cursor = record.outer;
        }
        Binding::Unresolvable
    }

    /// Reads the value of identifier `name`.
    pub fn get_binding(&mut self, name: &str) -> JsResult<Value> {
        let name_ref = self.intern(name);
        match self.resolve_binding(name_ref) {
            Binding::Unresolvable => {
                let message = format!("{name} is not defined");
                Err(self.throw_error(ErrorKind::ReferenceError, &message))
            }
            binding => self.read_binding(binding, name_ref),
        }
    }

    fn read_binding(&mut self, binding: Binding, name: HeapRef) -> JsResult<Value> {
        match binding {
            Binding::Local { context, slot } => Ok(self
                .heap
                .context(context)
                .call()
                .and_then(|call| call.locals.get(slot as usize).copied())
                .unwrap_or(Value::Undefined)),
            Binding::Catch { context } => match self.heap.context(context).kind {
                ContextKind::Catch { value, .. } => Ok(value),
                _ => Ok(Value::Undefined),
            },
            Binding::Object { object } => {
                let key = self.key_for_string(name);
                self.get(object, key)
            }
            Binding::Arguments { context } => Ok(Value::Object(self.arguments_object(context))),
            Binding::Unresolvable => Ok(Value::Undefined),
        }
    }

    /// `typeof name`: `"undefined"` for unresolvable names instead of a
    /// `ReferenceError`.
    pub fn typeof_binding(&mut self, name: &str) -> JsResult<&'static str> {
        let name_ref = self.intern(name);
        let binding = self.resolve_binding(name_ref);
        if binding == Binding::Unresolvable {
            return Ok("undefined");
        }
        let value = self.read_binding(binding, name_ref)?;
        Ok(self.type_of(value))
    }

    /// Assigns to identifier `name`.
    ///
    /// Unresolvable names become global properties in sloppy code and
    /// throw a `ReferenceError` in strict code.
    pub fn set_binding(&mut self, name: &str, value: Value) -> JsResult<()> {
        let scope = self.handle_scope();
        scope.root(value);
        let name_ref = self.intern(name);
        let strict = self.is_strict();
        match self.resolve_binding(name_ref) {
            Binding::Local { context, slot } => {
                if let Some(local) = self
                    .heap
                    .context_mut(context)
                    .call_mut()
                    .and_then(|call| call.locals.get_mut(slot as usize))
                {
                    *local = value;
                }
                Ok(())
            }
            Binding::Catch { context } => {
                if let ContextKind::Catch { value: bound, .. } = &mut self.heap.context_mut(context).kind {
                    *bound = value;
                }
                Ok(())
            }
            Binding::Object { object } => {
                let key = self.key_for_string(name_ref);
                self.put_with_mode(Value::Object(object), key, value, strict)
            }
            Binding::Arguments { context } => {
                let slot = self.add_local(context, name_ref);
                if let Some(call) = self.heap.context_mut(context).call_mut() {
                    call.locals[slot as usize] = value;
                }
                Ok(())
            }
            Binding::Unresolvable if strict => {
                let message = format!("{name} is not defined");
                Err(self.throw_error(ErrorKind::ReferenceError, &message))
            }
            Binding::Unresolvable => {
                let key = self.key_for_string(name_ref);
                let global = Value::Object(self.intrinsics.global);
                self.put_with_mode(global, key, value, false)
            }
        }
    }

    /// Adds a local to a call context; returns its slot.
    fn add_local(&mut self, context: HeapRef, name: HeapRef) -> u32 {
        let Some(class) = self.heap.context(context).call().map(|c| c.locals_class) else {
            return 0;
        };
        if let Some(slot) = self.heap.classes().get(class).lookup_property(name) {
            return slot;
        }
        let (class, slot) =
            self.heap
                .classes_mut()
                .add_member(class, name, PropertyAttributes::default());
        if let Some(call) = self.heap.context_mut(context).call_mut() {
            call.locals_class = class;
            call.locals.push(Value::Undefined);
        }
        slot
    }

    /// `var name`: declares a variable in the nearest function or global
    /// scope. Redeclaring an existing variable keeps its value.
    pub fn declare_variable(&mut self, name: &str) -> JsResult<()> {
        let name_ref = self.intern(name);
        let mut cursor = Some(self.current_context());
        while let Some(context) = cursor {
            let record = self.heap.context(context);
            match record.kind {
                ContextKind::Call(_) => {
                    self.add_local(context, name_ref);
                    return Ok(());
                }
                ContextKind::Global => break,
                ContextKind::With { .. } | ContextKind::Catch { .. } => cursor = record.outer,
            }
        }
        let global = self.intrinsics.global;
        let key = self.key_for_string(name_ref);
        if self.has_own_property(global, key) {
            return Ok(());
        }
        let attributes = PropertyAttributes::WRITABLE | PropertyAttributes::ENUMERABLE;
        self.define_data_property(global, key, Value::Undefined, attributes)
    }

    /// `delete name` on an identifier.
    pub fn delete_binding(&mut self, name: &str) -> JsResult<bool> {
        let name_ref = self.intern(name);
        Ok(match self.resolve_binding(name_ref) {
            Binding::Local { .. } | Binding::Catch { .. } | Binding::Arguments { .. } => false,
            Binding::Object { object } => {
                let key = self.key_for_string(name_ref);
                self.delete_property(object, key)
            }
            Binding::Unresolvable => true,
        })
    }

    fn nearest_call_context(&self) -> Option<HeapRef> {
        let mut cursor = Some(self.current_context());
        while let Some(context) = cursor {
            let record = self.heap.context(context);
            match record.kind {
                ContextKind::Call(_) => return Some(context),
                ContextKind::Global => return None,
                _ => cursor = record.outer,
            }
        }
        None
    }

    /// The `this` of the running code.
    pub fn this_value(&self) -> Value {
        match self.nearest_call_context() {
            Some(context) => self
                .heap
                .context(context)
                .call()
                .map_or(Value::Undefined, |call| call.this),
            None => Value::Object(self.intrinsics.global),
        }
    }

    /// The `arguments` object of the running function.
    pub fn arguments(&mut self) -> JsResult<HeapRef> {
        match self.nearest_call_context() {
            Some(context) => Ok(self.arguments_object(context)),
            None => Err(self.throw_error(ErrorKind::ReferenceError, "arguments is not defined")),
        }
    }

    fn arguments_object(&mut self, context: HeapRef) -> HeapRef {
        let record = self.heap.context(context);
        let strict = record.strict;
        let Some(call) = record.call() else {
            return self.new_object();
        };
        if let Some(existing) = call.arguments_object {
            return existing;
        }
        let values = call.arguments.clone();
        let callee = call.function;

        let object = self.new_object();
        let scope = self.handle_scope();
        scope.root(Value::Object(object));
        let count = Value::from_u32(values.len() as u32);
        self.heap.object_mut(object).elements = ArrayStorage::from_values(values);
        let length = PropertyKey::String(self.names.length);
        self.store_builtin(object, length, count);
        if !strict {
            let key = PropertyKey::String(self.names.callee);
            self.store_builtin(object, key, callee);
        }
        if let Some(call) = self.heap.context_mut(context).call_mut() {
            call.arguments_object = Some(object);
        }
        object
    }

    fn store_builtin(&mut self, object: HeapRef, key: PropertyKey, value: Value) {
        if let PropertyKey::String(name) = key {
            self.heap
                .add_own_slot(object, name, builtin_attributes(), Slot::Data(value));
        }
    }

    /// Enters a `with (object)` scope.
    pub fn push_with(&mut self, object: HeapRef) {
        let scope = self.handle_scope();
        scope.root(Value::Object(object));
        let outer = self.current_context();
        let strict = self.is_strict();
        let context = self.alloc_context(ContextRecord {
            kind: ContextKind::With { object },
            outer: Some(outer),
            strict,
        });
        self.set_current_context(context);
    }

    /// Enters a `catch (name)` scope binding `value`.
    pub fn push_catch(&mut self, name: &str, value: Value) {
        let scope = self.handle_scope();
        scope.root(value);
        let name = self.intern(name);
        let outer = self.current_context();
        let strict = self.is_strict();
        let context = self.alloc_context(ContextRecord {
            kind: ContextKind::Catch { name, value },
            outer: Some(outer),
            strict,
        });
        self.set_current_context(context);
    }

    /// Leaves the innermost `with` or `catch` scope. Returns false when the
    /// current frame has none open.
    pub fn pop_context(&mut self) -> bool {
        let CallFrame {
            context,
            base_context,
            ..
        } = *self.current_frame();
        if context == base_context {
            return false;
        }
        let outer = self.heap.context(context).outer;
        match outer {
            Some(outer) => {
                self.set_current_context(outer);
                true
            }
            None => false,
        }
    }
}
