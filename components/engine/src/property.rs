//! The object property protocol.
//!
//! Named properties live in class-ordered slots, indexed properties in the
//! object's element storage. Arrays expose a virtual `length`, and string
//! wrappers expose `length` and one read-only property per code unit.
//! Failed writes and deletes are reported to the caller as `false`; the
//! `*_with_mode` variants turn that into a `TypeError` for strict code.

use core_types::{to_uint32, ErrorKind, HeapRef, JsResult, PropertyKey, Value};
use memory_manager::{IndexedProperty, ObjectKind, PropertyAttributes, Slot};

use crate::engine::Engine;

/// A full or partial property descriptor.
///
/// Absent fields are `None`. A descriptor with `get` or `set` is an
/// accessor descriptor; one with `value` or `writable` is a data
/// descriptor; one with neither is generic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PropertyDescriptor {
    /// `[[Value]]`
    pub value: Option<Value>,
    /// `[[Writable]]`
    pub writable: Option<bool>,
    /// `[[Get]]`
    pub get: Option<Value>,
    /// `[[Set]]`
    pub set: Option<Value>,
    /// `[[Enumerable]]`
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Complete data descriptor.
    pub fn data(value: Value, attributes: PropertyAttributes) -> Self {
        PropertyDescriptor {
            value: Some(value),
            writable: Some(attributes.is_writable()),
            get: None,
            set: None,
            enumerable: Some(attributes.is_enumerable()),
            configurable: Some(attributes.is_configurable()),
        }
    }

    /// Complete accessor descriptor.
    pub fn accessor(get: Value, set: Value, attributes: PropertyAttributes) -> Self {
        PropertyDescriptor {
            value: None,
            writable: None,
            get: Some(get),
            set: Some(set),
            enumerable: Some(attributes.is_enumerable()),
            configurable: Some(attributes.is_configurable()),
        }
    }

    /// Descriptor carrying only a value.
    pub fn value(value: Value) -> Self {
        PropertyDescriptor {
            value: Some(value),
            ..Default::default()
        }
    }

    /// Returns true if `get` or `set` is present.
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Returns true if `value` or `writable` is present.
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Returns true if the descriptor is neither data nor accessor.
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    fn from_slot(slot: Slot, attributes: PropertyAttributes) -> Self {
        match slot {
            Slot::Data(value) => Self::data(value, attributes),
            Slot::Accessor { getter, setter } => Self::accessor(getter, setter, attributes),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OwnProperty {
    slot: Slot,
    attributes: PropertyAttributes,
    /// Array `length` or a string wrapper property; not stored in a slot.
    synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetStatus {
    Done,
    ReadOnly,
    NotExtensible,
    NoSetter,
    PrimitiveReceiver,
}

fn string_length_attributes() -> PropertyAttributes {
    PropertyAttributes::empty()
}

fn string_index_attributes() -> PropertyAttributes {
    PropertyAttributes::ENUMERABLE
}

impl Engine {
    fn is_length_key(&self, key: PropertyKey) -> bool {
        key == PropertyKey::String(self.names.length)
    }

    /// Own property attributes without materialising the value.
    fn own_attributes(&self, object: HeapRef, key: PropertyKey) -> Option<PropertyAttributes> {
        let obj = self.heap.object(object);
        match (&obj.kind, key) {
            (ObjectKind::Array { length_writable }, _) if self.is_length_key(key) => {
                Some(if *length_writable {
                    PropertyAttributes::WRITABLE
                } else {
                    PropertyAttributes::empty()
                })
            }
            (ObjectKind::String(_), _) if self.is_length_key(key) => {
                Some(string_length_attributes())
            }
            (ObjectKind::String(s), PropertyKey::Index(i)) if i < self.heap.js_string(*s).len() => {
                Some(string_index_attributes())
            }
            (_, PropertyKey::Index(i)) => obj.elements.get(i).map(|p| p.attributes),
            (_, PropertyKey::String(name)) => {
                self.heap.classes().get(obj.class).find(name).map(|(_, a)| a)
            }
        }
    }

    /// Own property with its value; string wrapper indices allocate.
    fn own_property(&mut self, object: HeapRef, key: PropertyKey) -> Option<OwnProperty> {
        let synthetic = |value: Value, attributes| OwnProperty {
            slot: Slot::Data(value),
            attributes,
            synthetic: true,
        };
        if let PropertyKey::Index(i) = key {
            if let ObjectKind::String(s) = self.heap.object(object).kind {
                if let Some(unit) = self.heap.js_string(s).code_unit_at(i) {
                    let value = self.new_string(&unit);
                    return Some(synthetic(value, string_index_attributes()));
                }
            }
        }
        let obj = self.heap.object(object);
        match (&obj.kind, key) {
            (ObjectKind::Array { length_writable }, _) if self.is_length_key(key) => {
                let attributes = if *length_writable {
                    PropertyAttributes::WRITABLE
                } else {
                    PropertyAttributes::empty()
                };
                Some(synthetic(Value::from_u32(obj.elements.length()), attributes))
            }
            (ObjectKind::String(s), _) if self.is_length_key(key) => {
                let length = self.heap.js_string(*s).len();
                Some(synthetic(Value::from_u32(length), string_length_attributes()))
            }
            (_, PropertyKey::Index(i)) => obj.elements.get(i).map(|p| OwnProperty {
                slot: p.slot,
                attributes: p.attributes,
                synthetic: false,
            }),
            (_, PropertyKey::String(name)) => {
                self.heap.find_own_slot(object, name).map(|own| OwnProperty {
                    slot: own.value,
                    attributes: own.attributes,
                    synthetic: false,
                })
            }
        }
    }

    fn array_length_writable(&self, object: HeapRef) -> Option<bool> {
        match self.heap.object(object).kind {
            ObjectKind::Array { length_writable } => Some(length_writable),
            _ => None,
        }
    }

    // ---- [[Get]] ----

    /// `object[key]`.
    pub fn get(&mut self, object: HeapRef, key: PropertyKey) -> JsResult<Value> {
        self.get_with_receiver(object, key, Value::Object(object))
    }

    /// [[Get]] starting at `object` with getters invoked on `receiver`.
    pub(crate) fn get_with_receiver(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        let mut current = object;
        loop {
            if let Some(own) = self.own_property(current, key) {
                return match own.slot {
                    Slot::Data(value) => Ok(value),
                    Slot::Accessor { getter, .. } if getter.is_undefined() => Ok(Value::Undefined),
                    Slot::Accessor { getter, .. } => self.call(getter, receiver, &[]),
                };
            }
            match self.heap.prototype_of(current) {
                Value::Object(prototype) => current = prototype,
                _ => return Ok(Value::Undefined),
            }
        }
    }

    /// `object[name]` for a Rust string name.
    pub fn get_named(&mut self, object: HeapRef, name: &str) -> JsResult<Value> {
        let key = self.key(name);
        self.get(object, key)
    }

    /// `object[index]`, reading present dense elements directly.
    pub fn get_index(&mut self, object: HeapRef, index: u32) -> JsResult<Value> {
        if let Some(value) = self.heap.object(object).elements.dense_get(index) {
            return Ok(value);
        }
        self.get(object, PropertyKey::Index(index))
    }

    /// `base[key]` for any base value (GetValue on a property reference).
    pub fn get_value(&mut self, base: Value, key: PropertyKey) -> JsResult<Value> {
        let prototype = match base {
            Value::Object(object) => return self.get(object, key),
            Value::Undefined | Value::Null | Value::Empty => {
                let message = format!(
                    "Cannot read properties of {} (reading '{}')",
                    self.describe_value(base),
                    self.key_to_string(key)
                );
                return Err(self.throw_error(ErrorKind::TypeError, &message));
            }
            Value::String(s) => {
                let length = self.heap.js_string(s).len();
                if self.is_length_key(key) {
                    return Ok(Value::from_u32(length));
                }
                if let PropertyKey::Index(i) = key {
                    if let Some(unit) = self.heap.js_string(s).code_unit_at(i) {
                        return Ok(self.new_string(&unit));
                    }
                }
                self.intrinsics.string_prototype
            }
            Value::Integer(_) | Value::Double(_) => self.intrinsics.number_prototype,
            Value::Boolean(_) => self.intrinsics.boolean_prototype,
        };
        self.get_with_receiver(prototype, key, base)
    }

    // ---- [[Set]] ----

    /// `base[key] = value` with the strictness of the running code.
    pub fn put(&mut self, base: Value, key: PropertyKey, value: Value) -> JsResult<()> {
        let strict = self.is_strict();
        self.put_with_mode(base, key, value, strict)
    }

    /// `object[index] = value`.
    pub fn put_index(&mut self, object: HeapRef, index: u32, value: Value) -> JsResult<()> {
        if self.heap.object_mut(object).elements.dense_set(index, value) {
            return Ok(());
        }
        self.put(Value::Object(object), PropertyKey::Index(index), value)
    }

    /// `base[key] = value`; failures throw only when `strict`.
    pub fn put_with_mode(
        &mut self,
        base: Value,
        key: PropertyKey,
        value: Value,
        strict: bool,
    ) -> JsResult<()> {
        let status = match base {
            Value::Object(object) => self.ordinary_set(object, key, value, base)?,
            Value::Undefined | Value::Null | Value::Empty => {
                let message = format!(
                    "Cannot set properties of {} (setting '{}')",
                    self.describe_value(base),
                    self.key_to_string(key)
                );
                return Err(self.throw_error(ErrorKind::TypeError, &message));
            }
            primitive => {
                let scope = self.handle_scope();
                scope.root(primitive);
                scope.root(value);
                let wrapper = self.to_object(primitive)?;
                scope.root(Value::Object(wrapper));
                self.ordinary_set(wrapper, key, value, primitive)?
            }
        };
        if status == SetStatus::Done || !strict {
            return Ok(());
        }
        let name = self.key_to_string(key);
        let target = self.describe_value(base);
        let message = match status {
            SetStatus::ReadOnly => {
                format!("Cannot assign to read only property '{name}' of {target}")
            }
            SetStatus::NotExtensible => {
                format!("Cannot add property {name}, object is not extensible")
            }
            SetStatus::NoSetter => {
                format!("Cannot set property {name} of {target} which has only a getter")
            }
            SetStatus::PrimitiveReceiver | SetStatus::Done => {
                format!("Cannot create property '{name}' on {target}")
            }
        };
        Err(self.throw_error(ErrorKind::TypeError, &message))
    }

    /// OrdinarySet.
    fn ordinary_set(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<SetStatus> {
        let mut current = object;
        let found = loop {
            if let Some(attributes) = self.own_attributes(current, key) {
                break Some(attributes);
            }
            match self.heap.prototype_of(current) {
                Value::Object(prototype) => current = prototype,
                _ => break None,
            }
        };

        if let Some(attributes) = found {
            if attributes.is_accessor() {
                let setter = match self.own_property(current, key).map(|own| own.slot) {
                    Some(Slot::Accessor { setter, .. }) => setter,
                    _ => Value::Undefined,
                };
                if setter.is_undefined() {
                    return Ok(SetStatus::NoSetter);
                }
                self.call(setter, receiver, &[value])?;
                return Ok(SetStatus::Done);
            }
            if !attributes.is_writable() {
                return Ok(SetStatus::ReadOnly);
            }
        }

        let Value::Object(target) = receiver else {
            return Ok(SetStatus::PrimitiveReceiver);
        };
        if found.is_some() && current == target {
            return self.write_own_data(target, key, value);
        }
        self.create_data_property(target, key, value)
    }

    /// Overwrites an existing writable own data property.
    fn write_own_data(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        value: Value,
    ) -> JsResult<SetStatus> {
        if self.array_length_writable(object).is_some() && self.is_length_key(key) {
            return Ok(if self.array_set_length(object, value)? {
                SetStatus::Done
            } else {
                SetStatus::ReadOnly
            });
        }
        match key {
            PropertyKey::Index(i) => self.heap.object_mut(object).elements.set_value(i, value),
            PropertyKey::String(name) => {
                if let Some(own) = self.heap.find_own_slot(object, name) {
                    self.heap.object_mut(object).slots[own.slot as usize] = Slot::Data(value);
                }
            }
        }
        Ok(SetStatus::Done)
    }

    /// Adds a default data property to an object that lacks one.
    fn create_data_property(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        value: Value,
    ) -> JsResult<SetStatus> {
        if !self.is_extensible(object) {
            return Ok(SetStatus::NotExtensible);
        }
        match key {
            PropertyKey::Index(i) => {
                if let Some(false) = self.array_length_writable(object) {
                    if i >= self.heap.object(object).elements.length() {
                        return Ok(SetStatus::ReadOnly);
                    }
                }
                self.heap.object_mut(object).elements.set_value(i, value);
            }
            PropertyKey::String(name) => {
                self.heap
                    .add_own_slot(object, name, PropertyAttributes::default(), Slot::Data(value));
            }
        }
        Ok(SetStatus::Done)
    }

    /// ArraySetLength for a plain `array.length = value` write.
    fn array_set_length(&mut self, array: HeapRef, value: Value) -> JsResult<bool> {
        let new_length = self.to_array_length(value)?;
        if self.array_length_writable(array) == Some(false) {
            return Ok(self.heap.object(array).elements.length() == new_length);
        }
        let actual = self.heap.object_mut(array).elements.set_length(new_length);
        Ok(actual == new_length)
    }

    fn to_array_length(&mut self, value: Value) -> JsResult<u32> {
        let number = self.to_number(value)?;
        let length = to_uint32(number);
        if f64::from(length) != number {
            return Err(self.throw_error(ErrorKind::RangeError, "Invalid array length"));
        }
        Ok(length)
    }

    // ---- [[Delete]] ----

    /// `delete object[key]`: true if the property is gone afterwards.
    pub fn delete_property(&mut self, object: HeapRef, key: PropertyKey) -> bool {
        let Some(attributes) = self.own_attributes(object, key) else {
            return true;
        };
        if !attributes.is_configurable() {
            return false;
        }
        match key {
            PropertyKey::Index(i) => self.heap.object_mut(object).elements.remove(i),
            PropertyKey::String(name) => self.heap.remove_own_slot(object, name),
        }
    }

    /// `delete base[key]`; a failed delete throws in strict mode.
    pub fn delete_with_mode(&mut self, base: Value, key: PropertyKey, strict: bool) -> JsResult<bool> {
        let object = self.to_object(base)?;
        let deleted = self.delete_property(object, key);
        if !deleted && strict {
            let message = format!(
                "Cannot delete property '{}' of {}",
                self.key_to_string(key),
                self.describe_value(base)
            );
            return Err(self.throw_error(ErrorKind::TypeError, &message));
        }
        Ok(deleted)
    }

    // ---- [[DefineOwnProperty]] ----

    /// [[DefineOwnProperty]]; returns false when the definition is refused.
    pub fn define_own_property(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        if let Some(length_writable) = self.array_length_writable(object) {
            if self.is_length_key(key) {
                return self.array_define_length(object, length_writable, desc);
            }
            if let PropertyKey::Index(i) = key {
                if !length_writable && i >= self.heap.object(object).elements.length() {
                    return Ok(false);
                }
            }
        }
        let current = self.own_property(object, key);
        let extensible = self.is_extensible(object);
        Ok(self.validate_and_apply(object, key, extensible, desc, current))
    }

    /// [[DefineOwnProperty]] that throws a `TypeError` on refusal.
    pub fn define_property_or_throw(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<()> {
        if self.define_own_property(object, key, desc)? {
            return Ok(());
        }
        let message = format!("Cannot redefine property: {}", self.key_to_string(key));
        Err(self.throw_error(ErrorKind::TypeError, &message))
    }

    /// Defines a data property with `attributes`, throwing on refusal.
    pub fn define_data_property(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        value: Value,
        attributes: PropertyAttributes,
    ) -> JsResult<()> {
        self.define_property_or_throw(object, key, PropertyDescriptor::data(value, attributes))
    }

    /// Defines an accessor property, throwing on refusal.
    pub fn define_accessor(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        getter: Value,
        setter: Value,
        attributes: PropertyAttributes,
    ) -> JsResult<()> {
        let desc = PropertyDescriptor::accessor(getter, setter, attributes);
        self.define_property_or_throw(object, key, desc)
    }

    fn array_define_length(
        &mut self,
        array: HeapRef,
        length_writable: bool,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        if desc.configurable == Some(true)
            || desc.enumerable == Some(true)
            || desc.is_accessor_descriptor()
            || (!length_writable && desc.writable == Some(true))
        {
            return Ok(false);
        }
        let old_length = self.heap.object(array).elements.length();
        let mut succeeded = true;
        if let Some(value) = desc.value {
            let new_length = self.to_array_length(value)?;
            if new_length != old_length {
                if !length_writable {
                    return Ok(false);
                }
                let actual = self.heap.object_mut(array).elements.set_length(new_length);
                succeeded = actual == new_length;
            }
        }
        if desc.writable == Some(false) {
            if let ObjectKind::Array { length_writable } = &mut self.heap.object_mut(array).kind {
                *length_writable = false;
            }
        }
        Ok(succeeded)
    }

    /// ValidateAndApplyPropertyDescriptor.
    fn validate_and_apply(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        extensible: bool,
        desc: PropertyDescriptor,
        current: Option<OwnProperty>,
    ) -> bool {
        let Some(current) = current else {
            if !extensible {
                return false;
            }
            let (slot, attributes) = new_property(&desc);
            self.store_property(object, key, slot, attributes, false);
            return true;
        };
        if desc.is_empty() {
            return true;
        }

        let attrs = current.attributes;
        if !attrs.is_configurable() {
            if desc.configurable == Some(true) {
                return false;
            }
            if desc.enumerable.is_some_and(|e| e != attrs.is_enumerable()) {
                return false;
            }
            if !desc.is_generic_descriptor() && desc.is_accessor_descriptor() != attrs.is_accessor()
            {
                return false;
            }
            match current.slot {
                Slot::Accessor { getter, setter } => {
                    if desc.get.is_some_and(|g| !g.same_value(&getter))
                        || desc.set.is_some_and(|s| !s.same_value(&setter))
                    {
                        return false;
                    }
                }
                Slot::Data(old) => {
                    if !attrs.is_writable()
                        && (desc.writable == Some(true)
                            || desc.value.is_some_and(|v| !v.same_value(&old)))
                    {
                        return false;
                    }
                }
            }
        }

        if current.synthetic {
            return true;
        }
        let (slot, attributes) = merge_property(&desc, current.slot, attrs);
        self.store_property(object, key, slot, attributes, true);
        true
    }

    fn store_property(
        &mut self,
        object: HeapRef,
        key: PropertyKey,
        slot: Slot,
        attributes: PropertyAttributes,
        exists: bool,
    ) {
        match key {
            PropertyKey::Index(i) => {
                let property = IndexedProperty { slot, attributes };
                self.heap.object_mut(object).elements.define(i, property);
            }
            PropertyKey::String(name) if exists => {
                self.heap.redefine_own_slot(object, name, attributes, slot)
            }
            PropertyKey::String(name) => {
                self.heap.add_own_slot(object, name, attributes, slot);
            }
        }
    }

    // ---- Queries ----

    /// [[GetOwnProperty]].
    pub fn get_own_property(&mut self, object: HeapRef, key: PropertyKey) -> Option<PropertyDescriptor> {
        self.own_property(object, key)
            .map(|own| PropertyDescriptor::from_slot(own.slot, own.attributes))
    }

    /// [[HasProperty]]: own or inherited.
    pub fn has_property(&self, object: HeapRef, key: PropertyKey) -> bool {
        let mut current = object;
        loop {
            if self.has_own_property(current, key) {
                return true;
            }
            match self.heap.prototype_of(current) {
                Value::Object(prototype) => current = prototype,
                _ => return false,
            }
        }
    }

    /// HasOwnProperty.
    pub fn has_own_property(&self, object: HeapRef, key: PropertyKey) -> bool {
        self.own_attributes(object, key).is_some()
    }

    /// [[OwnPropertyKeys]]: indices ascending, then named keys in
    /// insertion order.
    pub fn own_property_keys(&self, object: HeapRef) -> Vec<PropertyKey> {
        let obj = self.heap.object(object);
        let mut indices = obj.elements.indices();
        let mut keys = Vec::with_capacity(indices.len() + obj.slots.len() + 1);
        match obj.kind {
            ObjectKind::String(s) => {
                let length = self.heap.js_string(s).len();
                indices.extend(0..length);
                indices.sort_unstable();
                indices.dedup();
                keys.extend(indices.into_iter().map(PropertyKey::Index));
                keys.push(PropertyKey::String(self.names.length));
            }
            ObjectKind::Array { .. } => {
                keys.extend(indices.into_iter().map(PropertyKey::Index));
                keys.push(PropertyKey::String(self.names.length));
            }
            _ => keys.extend(indices.into_iter().map(PropertyKey::Index)),
        }
        let class = self.heap.classes().get(obj.class);
        keys.extend(class.entries().iter().map(|e| PropertyKey::String(e.key)));
        keys
    }

    /// Own enumerable keys in [[OwnPropertyKeys]] order.
    pub fn own_enumerable_keys(&self, object: HeapRef) -> Vec<PropertyKey> {
        self.own_property_keys(object)
            .into_iter()
            .filter(|&key| {
                self.own_attributes(object, key)
                    .is_some_and(PropertyAttributes::is_enumerable)
            })
            .collect()
    }

    /// `Object.keys`: an array of the own enumerable key strings.
    pub fn keys(&mut self, object: HeapRef) -> HeapRef {
        let keys = self.own_enumerable_keys(object);
        let scope = self.handle_scope();
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.key_to_value(key);
            scope.root(value);
            values.push(value);
        }
        self.new_array(&values)
    }

    // ---- Prototype and integrity ----

    /// [[GetPrototypeOf]].
    pub fn get_prototype_of(&self, object: HeapRef) -> Value {
        self.heap.prototype_of(object)
    }

    /// [[SetPrototypeOf]]: false on a cycle or a non-extensible object.
    pub fn set_prototype_of(&mut self, object: HeapRef, prototype: Value) -> JsResult<bool> {
        if !prototype.is_object() && !prototype.is_null() {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                "Object prototype may only be an Object or null",
            ));
        }
        if self.heap.prototype_of(object).strict_equals(&prototype) {
            return Ok(true);
        }
        if !self.is_extensible(object) {
            return Ok(false);
        }
        let mut cursor = prototype;
        while let Value::Object(p) = cursor {
            if p == object {
                return Ok(false);
            }
            cursor = self.heap.prototype_of(p);
        }
        self.heap.set_class_prototype(object, prototype);
        Ok(true)
    }

    /// [[PreventExtensions]].
    pub fn prevent_extensions(&mut self, object: HeapRef) -> bool {
        self.heap.make_non_extensible(object);
        true
    }

    /// [[IsExtensible]].
    pub fn is_extensible(&self, object: HeapRef) -> bool {
        let class = self.heap.object(object).class;
        self.heap.classes().get(class).is_extensible()
    }

    /// `Object.seal`.
    pub fn seal(&mut self, object: HeapRef) -> bool {
        self.heap.restrict_object(object, false);
        true
    }

    /// `Object.freeze`.
    pub fn freeze(&mut self, object: HeapRef) -> bool {
        self.heap.restrict_object(object, true);
        true
    }

    /// `Object.isSealed`.
    pub fn is_sealed(&self, object: HeapRef) -> bool {
        self.test_integrity(object, false)
    }

    /// `Object.isFrozen`.
    pub fn is_frozen(&self, object: HeapRef) -> bool {
        self.test_integrity(object, true)
    }

    fn test_integrity(&self, object: HeapRef, frozen: bool) -> bool {
        if self.is_extensible(object) {
            return false;
        }
        self.own_property_keys(object).into_iter().all(|key| {
            self.own_attributes(object, key).is_none_or(|a| {
                !a.is_configurable() && (!frozen || a.is_accessor() || !a.is_writable())
            })
        })
    }
}

/// Slot and attributes for a property created from `desc`; absent fields
/// default to `undefined` and `false`.
fn new_property(desc: &PropertyDescriptor) -> (Slot, PropertyAttributes) {
    let mut attributes = PropertyAttributes::empty();
    attributes.set(PropertyAttributes::ENUMERABLE, desc.enumerable.unwrap_or(false));
    attributes.set(PropertyAttributes::CONFIGURABLE, desc.configurable.unwrap_or(false));
    if desc.is_accessor_descriptor() {
        attributes |= PropertyAttributes::ACCESSOR;
        let slot = Slot::Accessor {
            getter: desc.get.unwrap_or(Value::Undefined),
            setter: desc.set.unwrap_or(Value::Undefined),
        };
        (slot, attributes)
    } else {
        attributes.set(PropertyAttributes::WRITABLE, desc.writable.unwrap_or(false));
        (Slot::Data(desc.value.unwrap_or(Value::Undefined)), attributes)
    }
}

/// Applies the present fields of `desc` over an existing property.
fn merge_property(
    desc: &PropertyDescriptor,
    slot: Slot,
    current: PropertyAttributes,
) -> (Slot, PropertyAttributes) {
    let mut attributes = PropertyAttributes::empty();
    attributes.set(
        PropertyAttributes::ENUMERABLE,
        desc.enumerable.unwrap_or(current.is_enumerable()),
    );
    attributes.set(
        PropertyAttributes::CONFIGURABLE,
        desc.configurable.unwrap_or(current.is_configurable()),
    );
    match slot {
        Slot::Data(_) if desc.is_accessor_descriptor() => {
            attributes |= PropertyAttributes::ACCESSOR;
            let slot = Slot::Accessor {
                getter: desc.get.unwrap_or(Value::Undefined),
                setter: desc.set.unwrap_or(Value::Undefined),
            };
            (slot, attributes)
        }
        Slot::Data(old) => {
            attributes.set(
                PropertyAttributes::WRITABLE,
                desc.writable.unwrap_or(current.is_writable()),
            );
            (Slot::Data(desc.value.unwrap_or(old)), attributes)
        }
        Slot::Accessor { .. } if desc.is_data_descriptor() => {
            attributes.set(PropertyAttributes::WRITABLE, desc.writable.unwrap_or(false));
            (Slot::Data(desc.value.unwrap_or(Value::Undefined)), attributes)
        }
        Slot::Accessor { getter, setter } => {
            attributes |= PropertyAttributes::ACCESSOR;
            let slot = Slot::Accessor {
                getter: desc.get.unwrap_or(getter),
                setter: desc.set.unwrap_or(setter),
            };
            (slot, attributes)
        }
    }
}
