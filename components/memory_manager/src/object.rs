//! JavaScript object representation.
//!
//! An object is a hidden class, one slot per named property in class order,
//! element storage for array indices, and a kind tag for exotic behaviour.
//! Object-level operations that need both the class pool and the cell
//! (finding, adding and removing own properties) live on [`Heap`].

use core_types::{ErrorKind, HeapRef, Value};
use smallvec::SmallVec;
use tracing::trace;

use crate::array::ArrayStorage;
use crate::gc::{Trace, Tracer};
use crate::heap::Heap;
use crate::hidden_class::{ClassId, PropertyAttributes};

/// Named slots stored inline before spilling to the heap.
pub const INLINE_SLOTS: usize = 4;

/// Storage for one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// Data property value
    Data(Value),
    /// Accessor pair; each side is a function object or `Undefined`
    Accessor {
        /// Getter function
        getter: Value,
        /// Setter function
        setter: Value,
    },
}

impl Slot {
    /// Calls `f` for each value held by the slot.
    pub fn for_each_value(&self, f: &mut impl FnMut(Value)) {
        match *self {
            Slot::Data(value) => f(value),
            Slot::Accessor { getter, setter } => {
                f(getter);
                f(setter);
            }
        }
    }
}

/// Function object payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionData {
    /// Index into the engine's native function table
    pub code: u32,
    /// Function name (a string value)
    pub name: Value,
    /// Captured context, if the function is a closure
    pub scope: Option<HeapRef>,
    /// Strict-mode function
    pub strict: bool,
    /// Whether `new` is allowed
    pub constructor: bool,
}

/// Payload of a function produced by `Function.prototype.bind`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFunctionData {
    /// Function being wrapped
    pub target: HeapRef,
    /// Fixed `this`
    pub this: Value,
    /// Arguments prepended to every call
    pub arguments: Vec<Value>,
}

/// Exotic behaviour and internal slots of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array exotic object; its length lives in the element storage
    Array {
        /// Whether `length` is still writable
        length_writable: bool,
    },
    /// Callable function
    Function(FunctionData),
    /// Bound function
    BoundFunction(BoundFunctionData),
    /// Error instance
    Error(ErrorKind),
    /// Boolean wrapper
    Boolean(bool),
    /// Number wrapper
    Number(f64),
    /// String wrapper over an interned string
    String(HeapRef),
}

/// A managed JavaScript object.
#[derive(Debug, Clone, PartialEq)]
pub struct JsObject {
    /// Current hidden class
    pub class: ClassId,
    /// Named property storage, indexed by class slot
    pub slots: SmallVec<[Slot; INLINE_SLOTS]>,
    /// Indexed property storage
    pub elements: ArrayStorage,
    /// Exotic kind
    pub kind: ObjectKind,
}

impl JsObject {
    /// Creates an empty object of `kind` with class `class`.
    pub fn new(class: ClassId, kind: ObjectKind) -> Self {
        JsObject {
            class,
            slots: SmallVec::new(),
            elements: ArrayStorage::default(),
            kind,
        }
    }

    /// Returns true for array exotic objects.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array { .. })
    }

    /// Returns true for functions and bound functions.
    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Function(_) | ObjectKind::BoundFunction(_)
        )
    }

    /// Function payload, if this is a plain function.
    pub fn function(&self) -> Option<&FunctionData> {
        match &self.kind {
            ObjectKind::Function(data) => Some(data),
            _ => None,
        }
    }
}

impl Trace for JsObject {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        tracer.mark_class(self.class);
        for slot in &self.slots {
            slot.for_each_value(&mut |v| tracer.mark_value(v));
        }
        self.elements.for_each_value(|v| tracer.mark_value(v));
        match &self.kind {
            ObjectKind::Function(data) => {
                tracer.mark_value(data.name);
                if let Some(scope) = data.scope {
                    tracer.mark_ref(scope);
                }
            }
            ObjectKind::BoundFunction(bound) => {
                tracer.mark_ref(bound.target);
                tracer.mark_value(bound.this);
                for &arg in &bound.arguments {
                    tracer.mark_value(arg);
                }
            }
            ObjectKind::String(s) => tracer.mark_ref(*s),
            ObjectKind::Ordinary
            | ObjectKind::Array { .. }
            | ObjectKind::Error(_)
            | ObjectKind::Boolean(_)
            | ObjectKind::Number(_) => {}
        }
    }
}

/// A named own property as found in an object's class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnSlot {
    /// Slot number in the object
    pub slot: u32,
    /// Property attributes
    pub attributes: PropertyAttributes,
    /// Stored value
    pub value: Slot,
}

impl Heap {
    /// Prototype of an object, read from its class.
    pub fn prototype_of(&self, object: HeapRef) -> Value {
        self.classes().get(self.object(object).class).prototype()
    }

    /// Finds a named own property of `object`.
    pub fn find_own_slot(&self, object: HeapRef, key: HeapRef) -> Option<OwnSlot> {
        let obj = self.object(object);
        let (slot, attributes) = self.classes().get(obj.class).find(key)?;
        Some(OwnSlot {
            slot,
            attributes,
            value: obj.slots[slot as usize],
        })
    }

    /// Appends a named property, transitioning the object's class.
    ///
    /// The caller has checked that the key is absent and the object is
    /// extensible.
    pub fn add_own_slot(
        &mut self,
        object: HeapRef,
        key: HeapRef,
        attributes: PropertyAttributes,
        value: Slot,
    ) -> u32 {
        let from = self.object(object).class;
        let (to, slot) = self.classes_mut().add_member(from, key, attributes);
        let obj = self.object_mut(object);
        debug_assert_eq!(obj.slots.len(), slot as usize);
        obj.class = to;
        obj.slots.push(value);
        slot
    }

    /// Replaces attributes and value of an existing named property.
    pub fn redefine_own_slot(
        &mut self,
        object: HeapRef,
        key: HeapRef,
        attributes: PropertyAttributes,
        value: Slot,
    ) {
        let from = self.object(object).class;
        let to = self.classes_mut().change_member(from, key, attributes);
        let slot = self.classes().get(to).lookup_property(key);
        let obj = self.object_mut(object);
        obj.class = to;
        if let Some(slot) = slot {
            obj.slots[slot as usize] = value;
        }
    }

    /// Removes a named property, shifting later slots down.
    pub fn remove_own_slot(&mut self, object: HeapRef, key: HeapRef) -> bool {
        let from = self.object(object).class;
        let Some(slot) = self.classes().get(from).lookup_property(key) else {
            return false;
        };
        let to = self.classes_mut().remove_member(from, key);
        let obj = self.object_mut(object);
        obj.class = to;
        obj.slots.remove(slot as usize);
        trace!(?object, slot, "removed own property");
        true
    }

    /// Moves an object to a class with a different prototype.
    pub fn set_class_prototype(&mut self, object: HeapRef, prototype: Value) {
        let from = self.object(object).class;
        let to = self.classes_mut().with_prototype(from, prototype);
        self.object_mut(object).class = to;
    }

    /// Makes an object non-extensible.
    pub fn make_non_extensible(&mut self, object: HeapRef) {
        let from = self.object(object).class;
        let to = self.classes_mut().non_extensible(from);
        self.object_mut(object).class = to;
    }

    /// Seals (`freeze == false`) or freezes an object, elements included.
    pub fn restrict_object(&mut self, object: HeapRef, freeze: bool) {
        let from = self.object(object).class;
        let to = if freeze {
            self.classes_mut().frozen(from)
        } else {
            self.classes_mut().sealed(from)
        };
        let obj = self.object_mut(object);
        obj.class = to;
        obj.elements.restrict(freeze);
        if freeze {
            if let ObjectKind::Array { length_writable } = &mut obj.kind {
                *length_writable = false;
            }
        }
    }
}
