//! Type conversions that may need the heap or call into script.

use core_types::{
    number_to_string, parse_array_index, string_to_number, ErrorKind, HeapRef, JsResult,
    PropertyKey, Value,
};
use memory_manager::ObjectKind;

use crate::engine::Engine;

/// Preferred type for `ToPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No hint; ordinary objects treat it as `Number`
    Default,
    /// `valueOf` first
    Number,
    /// `toString` first
    String,
}

impl Engine {
    /// ToBoolean.
    pub fn to_boolean(&self, value: Value) -> bool {
        match value {
            Value::Undefined | Value::Null | Value::Empty => false,
            Value::Boolean(b) => b,
            Value::Integer(i) => i != 0,
            Value::Double(d) => !(d == 0.0 || d.is_nan()),
            Value::String(s) => !self.heap.js_string(s).is_empty(),
            Value::Object(_) => true,
        }
    }

    /// ToPrimitive, calling `valueOf`/`toString` on objects.
    pub fn to_primitive(&mut self, value: Value, hint: PreferredType) -> JsResult<Value> {
        let Value::Object(object) = value else {
            return Ok(value);
        };
        let scope = self.handle_scope();
        scope.root(value);
        let order = match hint {
            PreferredType::String => [self.names.to_string, self.names.value_of],
            PreferredType::Number | PreferredType::Default => {
                [self.names.value_of, self.names.to_string]
            }
        };
        for name in order {
            let method = self.get(object, PropertyKey::String(name))?;
            if self.is_callable(method) {
                let result = self.call(method, value, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(self.throw_error(
            ErrorKind::TypeError,
            "Cannot convert object to primitive value",
        ))
    }

    /// ToNumber.
    pub fn to_number(&mut self, value: Value) -> JsResult<f64> {
        match value {
            Value::String(s) => Ok(string_to_number(self.heap.string(s))),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::Number)?;
                self.to_number(primitive)
            }
            other => Ok(other.to_number_primitive().unwrap_or(f64::NAN)),
        }
    }

    /// ToNumber, keeping the integer representation where possible.
    pub fn to_numeric(&mut self, value: Value) -> JsResult<Value> {
        match value {
            Value::Integer(_) | Value::Double(_) => Ok(value),
            other => Ok(Value::from_number(self.to_number(other)?)),
        }
    }

    /// ToString, returning the interned result.
    pub fn to_string(&mut self, value: Value) -> JsResult<HeapRef> {
        let text = match value {
            Value::String(s) => return Ok(s),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::String)?;
                return self.to_string(primitive);
            }
            Value::Undefined | Value::Empty => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Double(d) => number_to_string(d),
        };
        Ok(self.intern(&text))
    }

    /// ToString, copied out into a Rust string.
    pub fn to_rust_string(&mut self, value: Value) -> JsResult<String> {
        let s = self.to_string(value)?;
        Ok(self.heap.string(s).to_string())
    }

    /// ToObject: wraps primitives, throws on `undefined` and `null`.
    pub fn to_object(&mut self, value: Value) -> JsResult<HeapRef> {
        let (prototype, kind) = match value {
            Value::Object(object) => return Ok(object),
            Value::Undefined | Value::Null | Value::Empty => {
                return Err(self.throw_error(
                    ErrorKind::TypeError,
                    "Cannot convert undefined or null to object",
                ))
            }
            Value::Boolean(b) => (self.intrinsics.boolean_prototype, ObjectKind::Boolean(b)),
            Value::Integer(_) | Value::Double(_) => (
                self.intrinsics.number_prototype,
                ObjectKind::Number(value.as_number().unwrap_or(f64::NAN)),
            ),
            Value::String(s) => (self.intrinsics.string_prototype, ObjectKind::String(s)),
        };
        Ok(self.new_object_with_prototype(Value::Object(prototype), kind))
    }

    /// ToPropertyKey.
    pub fn to_property_key(&mut self, value: Value) -> JsResult<PropertyKey> {
        match value {
            Value::Integer(i) if i >= 0 => Ok(PropertyKey::Index(i as u32)),
            Value::String(s) => Ok(self.key_for_string(s)),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::String)?;
                self.to_property_key(primitive)
            }
            other => {
                let s = self.to_string(other)?;
                Ok(self.key_for_string(s))
            }
        }
    }

    /// Key for an interned string: canonical indices become `Index`.
    pub fn key_for_string(&self, s: HeapRef) -> PropertyKey {
        match parse_array_index(self.heap.string(s)) {
            Some(index) => PropertyKey::Index(index),
            None => PropertyKey::String(s),
        }
    }

    /// Key for a Rust string, interning it if it is not an index.
    pub fn key(&mut self, name: &str) -> PropertyKey {
        match parse_array_index(name) {
            Some(index) => PropertyKey::Index(index),
            None => PropertyKey::String(self.intern(name)),
        }
    }

    /// A key as a string value.
    pub fn key_to_value(&mut self, key: PropertyKey) -> Value {
        match key {
            PropertyKey::String(s) => Value::String(s),
            PropertyKey::Index(i) => self.new_string(&i.to_string()),
        }
    }

    /// A key as a Rust string.
    pub fn key_to_string(&self, key: PropertyKey) -> String {
        match key {
            PropertyKey::String(s) => self.heap.string(s).to_string(),
            PropertyKey::Index(i) => i.to_string(),
        }
    }

    /// Returns true for functions and bound functions.
    pub fn is_callable(&self, value: Value) -> bool {
        value
            .as_object()
            .and_then(|o| self.heap.try_object(o))
            .is_some_and(|o| o.is_callable())
    }

    /// The `typeof` operator.
    pub fn type_of(&self, value: Value) -> &'static str {
        if self.is_callable(value) {
            "function"
        } else {
            value.type_of()
        }
    }

    /// IsLooselyEqual (`==`).
    pub fn loose_equals(&mut self, a: Value, b: Value) -> JsResult<bool> {
        let a = if a.is_empty() { Value::Undefined } else { a };
        let b = if b.is_empty() { Value::Undefined } else { b };
        if a.is_number() && b.is_number() || same_type(a, b) {
            return Ok(a.strict_equals(&b));
        }
        match (a, b) {
            (x, y) if x.is_null_or_undefined() && y.is_null_or_undefined() => Ok(true),
            (x, Value::String(s)) if x.is_number() => {
                let n = string_to_number(self.heap.string(s));
                Ok(Value::from_number(n).strict_equals(&x))
            }
            (Value::String(_), y) if y.is_number() => self.loose_equals(b, a),
            (Value::Boolean(x), y) => self.loose_equals(Value::Integer(i32::from(x)), y),
            (x, Value::Boolean(y)) => self.loose_equals(x, Value::Integer(i32::from(y))),
            (Value::Object(_), y) if y.is_number() || y.is_string() => {
                let scope = self.handle_scope();
                scope.root(y);
                let primitive = self.to_primitive(a, PreferredType::Default)?;
                self.loose_equals(primitive, y)
            }
            (x, Value::Object(_)) if x.is_number() || x.is_string() => self.loose_equals(b, a),
            _ => Ok(false),
        }
    }
}

fn same_type(a: Value, b: Value) -> bool {
    matches!(
        (a, b),
        (Value::Undefined, Value::Undefined)
            | (Value::Null, Value::Null)
            | (Value::Boolean(_), Value::Boolean(_))
            | (Value::String(_), Value::String(_))
            | (Value::Object(_), Value::Object(_))
    )
}
