//! Intrinsic objects and the few natives the core itself relies on.
//!
//! `ToPrimitive` calls `toString`/`valueOf` on ordinary objects, and
//! uncaught errors are reported through `Error.prototype.toString`, so
//! those three natives live here. Everything else on the prototypes is
//! left to the embedder.

use core_types::{ErrorKind, HeapRef, JsResult, PropertyKey, Value};
use memory_manager::{
    ContextKind, ContextRecord, FunctionData, Heap, ObjectKind, PropertyAttributes, Slot, Tracer,
};

use crate::engine::Engine;
use crate::function::{CallArgs, NativeFunction};

/// Native code index of the do-nothing function behind
/// `Function.prototype`.
pub(crate) const EMPTY_FUNCTION: u32 = 0;

/// The engine's intrinsic objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsics {
    /// The global object
    pub global: HeapRef,
    /// The global context
    pub global_context: HeapRef,
    /// `Object.prototype`
    pub object_prototype: HeapRef,
    /// `Function.prototype`
    pub function_prototype: HeapRef,
    /// `Array.prototype`
    pub array_prototype: HeapRef,
    /// `String.prototype`
    pub string_prototype: HeapRef,
    /// `Number.prototype`
    pub number_prototype: HeapRef,
    /// `Boolean.prototype`
    pub boolean_prototype: HeapRef,
    /// One prototype per error kind, indexed by [`ErrorKind::ordinal`]
    pub error_prototypes: [HeapRef; ErrorKind::ALL.len()],
}

impl Intrinsics {
    pub(crate) fn allocate(heap: &mut Heap, names: &Names) -> Self {
        let object_prototype = heap.alloc_object(Value::Null, ObjectKind::Ordinary);
        let base = Value::Object(object_prototype);
        let function_prototype = heap.alloc_object(
            base,
            ObjectKind::Function(FunctionData {
                code: EMPTY_FUNCTION,
                name: Value::String(names.empty),
                scope: None,
                strict: false,
                constructor: false,
            }),
        );
        let array_prototype = heap.alloc_object(
            base,
            ObjectKind::Array {
                length_writable: true,
            },
        );
        let string_prototype = heap.alloc_object(base, ObjectKind::String(names.empty));
        let number_prototype = heap.alloc_object(base, ObjectKind::Number(0.0));
        let boolean_prototype = heap.alloc_object(base, ObjectKind::Boolean(false));

        let error_prototype = heap.alloc_object(base, ObjectKind::Ordinary);
        let mut error_prototypes = [error_prototype; ErrorKind::ALL.len()];
        for kind in ErrorKind::ALL.iter().skip(1) {
            error_prototypes[kind.ordinal()] =
                heap.alloc_object(Value::Object(error_prototype), ObjectKind::Ordinary);
        }

        let global = heap.alloc_object(base, ObjectKind::Ordinary);
        let global_context = heap.alloc_context(ContextRecord {
            kind: ContextKind::Global,
            outer: None,
            strict: false,
        });

        Intrinsics {
            global,
            global_context,
            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            number_prototype,
            boolean_prototype,
            error_prototypes,
        }
    }

    /// Prototype of errors of `kind`.
    pub fn error_prototype(&self, kind: ErrorKind) -> HeapRef {
        self.error_prototypes[kind.ordinal()]
    }

    pub(crate) fn trace(&self, tracer: &mut Tracer<'_>) {
        for r in [
            self.global,
            self.global_context,
            self.object_prototype,
            self.function_prototype,
            self.array_prototype,
            self.string_prototype,
            self.number_prototype,
            self.boolean_prototype,
        ] {
            tracer.mark_ref(r);
        }
        for &r in &self.error_prototypes {
            tracer.mark_ref(r);
        }
    }
}

/// Property names the engine uses internally, interned once.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Names {
    pub(crate) empty: HeapRef,
    pub(crate) length: HeapRef,
    pub(crate) prototype: HeapRef,
    pub(crate) constructor: HeapRef,
    pub(crate) name: HeapRef,
    pub(crate) message: HeapRef,
    pub(crate) to_string: HeapRef,
    pub(crate) value_of: HeapRef,
    pub(crate) arguments: HeapRef,
    pub(crate) callee: HeapRef,
}

impl Names {
    pub(crate) fn intern(heap: &mut Heap) -> Self {
        Names {
            empty: heap.intern(""),
            length: heap.intern("length"),
            prototype: heap.intern("prototype"),
            constructor: heap.intern("constructor"),
            name: heap.intern("name"),
            message: heap.intern("message"),
            to_string: heap.intern("toString"),
            value_of: heap.intern("valueOf"),
            arguments: heap.intern("arguments"),
            callee: heap.intern("callee"),
        }
    }

    pub(crate) fn trace(&self, tracer: &mut Tracer<'_>) {
        for r in [
            self.empty,
            self.length,
            self.prototype,
            self.constructor,
            self.name,
            self.message,
            self.to_string,
            self.value_of,
            self.arguments,
            self.callee,
        ] {
            tracer.mark_ref(r);
        }
    }
}

/// Attributes of built-in methods and properties: writable, configurable,
/// not enumerable.
pub(crate) fn builtin_attributes() -> PropertyAttributes {
    PropertyAttributes::WRITABLE | PropertyAttributes::CONFIGURABLE
}

impl Engine {
    pub(crate) fn install_intrinsics(&mut self) {
        let object_prototype = self.intrinsics.object_prototype;
        self.install_method(object_prototype, "toString", object_prototype_to_string, 0);
        self.install_method(object_prototype, "valueOf", object_prototype_value_of, 0);

        let function_prototype = self.intrinsics.function_prototype;
        let empty = Value::String(self.names.empty);
        self.install_property(function_prototype, "name", empty, PropertyAttributes::CONFIGURABLE);
        self.install_property(
            function_prototype,
            "length",
            Value::Integer(0),
            PropertyAttributes::CONFIGURABLE,
        );

        let error_prototype = self.intrinsics.error_prototype(ErrorKind::Error);
        self.install_method(error_prototype, "toString", error_prototype_to_string, 0);
        for kind in ErrorKind::ALL {
            let prototype = self.intrinsics.error_prototype(kind);
            let name = self.new_string(kind.name());
            self.install_property(prototype, "name", name, builtin_attributes());
            self.install_property(prototype, "message", empty, builtin_attributes());
        }

        let global = self.intrinsics.global;
        self.install_property(global, "globalThis", Value::Object(global), builtin_attributes());
        let fixed = PropertyAttributes::empty();
        self.install_property(global, "undefined", Value::Undefined, fixed);
        self.install_property(global, "NaN", Value::NAN, fixed);
        self.install_property(global, "Infinity", Value::Double(f64::INFINITY), fixed);
    }

    /// Adds a data property to a freshly created built-in object.
    pub(crate) fn install_property(
        &mut self,
        object: HeapRef,
        name: &str,
        value: Value,
        attributes: PropertyAttributes,
    ) {
        let scope = self.handle_scope();
        scope.root(value);
        let key = self.intern(name);
        if self.heap.find_own_slot(object, key).is_none() {
            self.heap.add_own_slot(object, key, attributes, Slot::Data(value));
        }
    }

    /// Adds a built-in method.
    pub fn install_method(
        &mut self,
        object: HeapRef,
        name: &str,
        native: NativeFunction,
        arity: u32,
    ) -> HeapRef {
        let scope = self.handle_scope();
        scope.root(Value::Object(object));
        let function = self.new_builtin(name, native, arity);
        self.install_property(object, name, Value::Object(function), builtin_attributes());
        function
    }
}

pub(crate) fn empty_function(_engine: &mut Engine, _args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Undefined)
}

fn builtin_tag(kind: &ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Ordinary => "Object",
        ObjectKind::Array { .. } => "Array",
        ObjectKind::Function(_) | ObjectKind::BoundFunction(_) => "Function",
        ObjectKind::Error(_) => "Error",
        ObjectKind::Boolean(_) => "Boolean",
        ObjectKind::Number(_) => "Number",
        ObjectKind::String(_) => "String",
    }
}

fn object_prototype_to_string(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    let tag = match args.this {
        Value::Undefined | Value::Empty => "Undefined",
        Value::Null => "Null",
        this => {
            let object = engine.to_object(this)?;
            builtin_tag(&engine.heap.object(object).kind)
        }
    };
    Ok(engine.new_string(&format!("[object {tag}]")))
}

fn object_prototype_value_of(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Object(engine.to_object(args.this)?))
}

fn error_prototype_to_string(engine: &mut Engine, args: &CallArgs) -> JsResult<Value> {
    let Value::Object(error) = args.this else {
        return Err(engine.throw_error(
            ErrorKind::TypeError,
            "Error.prototype.toString requires that 'this' be an Object",
        ));
    };
    let name = engine.get(error, PropertyKey::String(engine.names.name))?;
    let name = if name.is_undefined() {
        "Error".to_string()
    } else {
        engine.to_rust_string(name)?
    };
    let message = engine.get(error, PropertyKey::String(engine.names.message))?;
    let message = if message.is_undefined() {
        String::new()
    } else {
        engine.to_rust_string(message)?
    };
    let text = if name.is_empty() {
        message
    } else if message.is_empty() {
        name
    } else {
        format!("{name}: {message}")
    };
    Ok(engine.new_string(&text))
}
