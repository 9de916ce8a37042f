//! Function objects and calls.
//!
//! Function bodies are native Rust functions registered in the engine's
//! function table; a function object stores the table index, its captured
//! context and its strictness. Calling a function allocates a call context,
//! pushes a frame, runs the native and pops the frame again whether the
//! native returned or threw.

use core_types::{
    number_to_string, to_integer_or_infinity, ErrorKind, HeapRef, JsResult, PropertyKey, Value,
};
use memory_manager::{
    BoundFunctionData, CallContext, ContextKind, ContextRecord, FunctionData, ObjectKind,
    PropertyAttributes,
};

use crate::engine::Engine;
use crate::intrinsics::builtin_attributes;

/// Signature of native function bodies.
pub type NativeFunction = fn(&mut Engine, &CallArgs) -> JsResult<Value>;

/// What a native function receives.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArgs {
    /// Receiver, already coerced for sloppy functions
    pub this: Value,
    /// Actual arguments
    pub arguments: Vec<Value>,
    /// The function object being run
    pub callee: HeapRef,
    /// The constructor `new` was applied to, or `Undefined` for a call
    pub new_target: Value,
}

impl CallArgs {
    /// Argument `index`, or `Undefined` if it was not passed.
    pub fn get(&self, index: usize) -> Value {
        self.arguments.get(index).copied().unwrap_or(Value::Undefined)
    }

    /// Number of arguments passed.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns true when no arguments were passed.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Returns true when invoked through `new`.
    pub fn is_construct(&self) -> bool {
        !self.new_target.is_undefined()
    }
}

struct FunctionTemplate<'a> {
    name: &'a str,
    native: NativeFunction,
    arity: u32,
    strict: bool,
    scope: Option<HeapRef>,
    constructor: bool,
}

impl Engine {
    /// Returns the code index of `native`, adding it to the function table
    /// the first time it is seen.
    pub fn register_native(&mut self, native: NativeFunction) -> u32 {
        let natives = &mut self.natives;
        *self.native_codes.entry(native as usize).or_insert_with(|| {
            natives.push(native);
            (natives.len() - 1) as u32
        })
    }

    fn make_function(&mut self, template: FunctionTemplate<'_>) -> HeapRef {
        let code = self.register_native(template.native);
        let scope = self.handle_scope();
        let name = self.new_string(template.name);
        scope.root(name);
        let data = FunctionData {
            code,
            name,
            scope: template.scope,
            strict: template.strict,
            constructor: template.constructor,
        };
        let prototype = Value::Object(self.intrinsics.function_prototype);
        let function = self.new_object_with_prototype(prototype, ObjectKind::Function(data));
        scope.root(Value::Object(function));

        let metadata = PropertyAttributes::CONFIGURABLE;
        self.install_property(function, "length", Value::from_u32(template.arity), metadata);
        self.install_property(function, "name", name, metadata);

        if template.constructor {
            let instance_prototype = self.new_object();
            scope.root(Value::Object(instance_prototype));
            self.install_property(
                instance_prototype,
                "constructor",
                Value::Object(function),
                builtin_attributes(),
            );
            self.install_property(
                function,
                "prototype",
                Value::Object(instance_prototype),
                PropertyAttributes::WRITABLE,
            );
        }
        function
    }

    /// Creates a constructor function with its own `prototype` object.
    ///
    /// ```
    /// use core_types::{JsResult, Value};
    /// use engine::{CallArgs, Engine};
    ///
    /// fn answer(_: &mut Engine, _: &CallArgs) -> JsResult<Value> {
    ///     Ok(Value::Integer(42))
    /// }
    ///
    /// let mut engine = Engine::new();
    /// let f = engine.new_function("answer", answer, 0, false);
    /// let result = engine.call(Value::Object(f), Value::Undefined, &[]).unwrap();
    /// assert_eq!(result, Value::Integer(42));
    /// ```
    pub fn new_function(
        &mut self,
        name: &str,
        native: NativeFunction,
        arity: u32,
        strict: bool,
    ) -> HeapRef {
        self.make_function(FunctionTemplate {
            name,
            native,
            arity,
            strict,
            scope: None,
            constructor: true,
        })
    }

    /// Creates a built-in method: strict-agnostic, not a constructor, no
    /// `prototype`.
    pub fn new_builtin(&mut self, name: &str, native: NativeFunction, arity: u32) -> HeapRef {
        self.make_function(FunctionTemplate {
            name,
            native,
            arity,
            strict: true,
            scope: None,
            constructor: false,
        })
    }

    /// Creates a function that captures the current context.
    ///
    /// When called, its call context's `outer` is the captured context, so
    /// bindings visible where the closure was made stay visible to it.
    pub fn new_closure(
        &mut self,
        name: &str,
        native: NativeFunction,
        arity: u32,
        strict: bool,
    ) -> HeapRef {
        let scope = Some(self.current_context());
        self.make_function(FunctionTemplate {
            name,
            native,
            arity,
            strict,
            scope,
            constructor: true,
        })
    }

    /// `Function.prototype.bind`.
    pub fn bind_function(
        &mut self,
        target: HeapRef,
        this: Value,
        arguments: &[Value],
    ) -> JsResult<HeapRef> {
        if !self.is_callable(Value::Object(target)) {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                "Bind must be called on a function",
            ));
        }
        let scope = self.handle_scope();
        scope.root(Value::Object(target));
        scope.root(this);
        scope.root_all(arguments);

        let target_length = self.get_named(target, "length")?;
        let length = match target_length.as_number() {
            Some(n) => (to_integer_or_infinity(n) - arguments.len() as f64).max(0.0),
            None => 0.0,
        };
        let target_name = self.get_named(target, "name")?;
        let target_name = match target_name {
            Value::String(s) => self.heap.string(s).to_string(),
            _ => String::new(),
        };

        let prototype = self.heap.prototype_of(target);
        let bound = self.new_object_with_prototype(
            prototype,
            ObjectKind::BoundFunction(BoundFunctionData {
                target,
                this,
                arguments: arguments.to_vec(),
            }),
        );
        scope.root(Value::Object(bound));
        let metadata = PropertyAttributes::CONFIGURABLE;
        self.install_property(bound, "length", Value::from_number(length), metadata);
        let name = self.new_string(&format!("bound {target_name}"));
        self.install_property(bound, "name", name, metadata);
        Ok(bound)
    }

    /// Returns true if `value` can be used with `new`.
    pub fn is_constructor(&self, value: Value) -> bool {
        let Some(object) = value.as_object().and_then(|o| self.heap.try_object(o)) else {
            return false;
        };
        match &object.kind {
            ObjectKind::Function(data) => data.constructor,
            ObjectKind::BoundFunction(bound) => self.is_constructor(Value::Object(bound.target)),
            _ => false,
        }
    }

    /// Calls `function` with `this` and `arguments`.
    ///
    /// `function`, `this` and `arguments` must be reachable by the caller.
    pub fn call(&mut self, function: Value, this: Value, arguments: &[Value]) -> JsResult<Value> {
        let callable = function
            .as_object()
            .and_then(|o| self.heap.try_object(o).map(|object| (o, object)))
            .filter(|(_, object)| object.is_callable())
            .map(|(o, object)| (o, object.kind.clone()));
        let (callee, kind) = match callable {
            Some(found) => found,
            None => {
                let text = self.describe_value(function);
                return Err(self.throw_error(
                    ErrorKind::TypeError,
                    &format!("{text} is not a function"),
                ));
            }
        };
        match kind {
            ObjectKind::BoundFunction(bound) => {
                let mut full = bound.arguments;
                full.extend_from_slice(arguments);
                self.call(Value::Object(bound.target), bound.this, &full)
            }
            ObjectKind::Function(data) => {
                self.invoke(callee, &data, this, arguments, Value::Undefined)
            }
            _ => Ok(Value::Undefined),
        }
    }

    /// `new function(...arguments)`.
    pub fn construct(&mut self, function: Value, arguments: &[Value]) -> JsResult<Value> {
        if !self.is_constructor(function) {
            let text = self.describe_value(function);
            return Err(self.throw_error(
                ErrorKind::TypeError,
                &format!("{text} is not a constructor"),
            ));
        }
        let Some(callee) = function.as_object() else {
            return Ok(Value::Undefined);
        };
        let data = match self.heap.object(callee).kind.clone() {
            ObjectKind::BoundFunction(bound) => {
                let mut full = bound.arguments;
                full.extend_from_slice(arguments);
                return self.construct(Value::Object(bound.target), &full);
            }
            ObjectKind::Function(data) => data,
            _ => return Ok(Value::Undefined),
        };

        let scope = self.handle_scope();
        scope.root(function);
        scope.root_all(arguments);
        let prototype = self.get(callee, PropertyKey::String(self.names.prototype))?;
        let prototype = if prototype.is_object() {
            prototype
        } else {
            Value::Object(self.intrinsics.object_prototype)
        };
        scope.root(prototype);
        let instance = Value::Object(self.new_object_with_prototype(prototype, ObjectKind::Ordinary));
        scope.root(instance);
        let result = self.invoke(callee, &data, instance, arguments, function)?;
        Ok(if result.is_object() { result } else { instance })
    }

    /// Looks up `name` on `receiver` and calls it with `receiver` as `this`.
    pub fn call_method(
        &mut self,
        receiver: Value,
        name: &str,
        arguments: &[Value],
    ) -> JsResult<Value> {
        let scope = self.handle_scope();
        scope.root(receiver);
        scope.root_all(arguments);
        let key = self.key(name);
        let method = self.get_value(receiver, key)?;
        scope.root(method);
        self.call(method, receiver, arguments)
    }

    fn invoke(
        &mut self,
        callee: HeapRef,
        data: &FunctionData,
        this: Value,
        arguments: &[Value],
        new_target: Value,
    ) -> JsResult<Value> {
        let Some(&native) = self.natives.get(data.code as usize) else {
            return Err(self.throw_error(ErrorKind::InternalError, "unknown native function"));
        };
        let scope = self.handle_scope();
        scope.root(Value::Object(callee));
        scope.root(this);
        scope.root_all(arguments);

        let this = if data.strict {
            this
        } else {
            match this {
                Value::Undefined | Value::Null | Value::Empty => {
                    Value::Object(self.intrinsics.global)
                }
                Value::Object(_) => this,
                primitive => Value::Object(self.to_object(primitive)?),
            }
        };
        scope.root(this);

        let locals_class = self.heap.classes_mut().empty_class(Value::Null);
        let outer = data.scope.unwrap_or(self.intrinsics.global_context);
        let context = self.alloc_context(ContextRecord {
            kind: ContextKind::Call(CallContext {
                function: Value::Object(callee),
                this,
                arguments: arguments.to_vec(),
                arguments_object: None,
                locals_class,
                locals: Vec::new(),
            }),
            outer: Some(outer),
            strict: data.strict,
        });
        self.push_frame(context, Value::Object(callee), data.strict)?;
        let args = CallArgs {
            this,
            arguments: arguments.to_vec(),
            callee,
            new_target,
        };
        let result = native(self, &args);
        self.pop_frame();
        result
    }

    /// Short rendering of a value for error messages; never calls script.
    pub(crate) fn describe_value(&self, value: Value) -> String {
        match value {
            Value::Undefined | Value::Empty => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Double(d) => number_to_string(d),
            Value::String(s) => format!("\"{}\"", self.heap.string(s)),
            Value::Object(o) => match self.heap.try_object(o).map(|obj| &obj.kind) {
                Some(ObjectKind::Function(data)) => match data.name {
                    Value::String(s) if !self.heap.js_string(s).is_empty() => {
                        format!("function {}", self.heap.string(s))
                    }
                    _ => "function".to_string(),
                },
                Some(ObjectKind::Array { .. }) => "array".to_string(),
                _ => "object".to_string(),
            },
        }
    }
}
