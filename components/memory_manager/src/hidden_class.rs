//! Hidden class system for optimizing JavaScript object property access.
//!
//! Hidden classes enable fast property access by tracking object shape
//! and using slot-based lookups instead of per-object hash tables.
//!
//! Classes are immutable once created. Every shape change (adding,
//! removing or re-attributing a property, changing the prototype, sealing,
//! freezing, preventing extensions) moves an object to a *different* class
//! reached through a transition edge. Edges are interned, so two objects
//! that went through the same sequence of changes from the same starting
//! class end up with the identical [`ClassId`]. Inline caches rely on this:
//! comparing class ids is a complete shape check.
//!
//! ```text
//!     {} (proto P)
//!         |
//!     +---+---+
//!     |       |
//!    +a      +b
//!     |       |
//!   {a}     {b}
//!     |
//!    +b
//!     |
//!   {a,b}
//! ```

use std::collections::HashMap;

use bitflags::bitflags;
use core_types::{HeapRef, Value};
use tracing::trace;

use crate::gc::MarkBits;

bitflags! {
    /// Property attributes stored in a hidden class entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyAttributes: u8 {
        /// Data property value can be changed.
        const WRITABLE = 1 << 0;
        /// Property shows up in enumeration.
        const ENUMERABLE = 1 << 1;
        /// Property can be deleted or have its attributes changed.
        const CONFIGURABLE = 1 << 2;
        /// Property is a getter/setter pair rather than a value.
        const ACCESSOR = 1 << 3;
    }
}

impl Default for PropertyAttributes {
    /// Attributes of a property created by plain assignment.
    fn default() -> Self {
        Self::WRITABLE | Self::ENUMERABLE | Self::CONFIGURABLE
    }
}

impl PropertyAttributes {
    /// Returns true for accessor properties.
    pub fn is_accessor(self) -> bool {
        self.contains(Self::ACCESSOR)
    }

    /// Returns true for data properties.
    pub fn is_data(self) -> bool {
        !self.is_accessor()
    }

    /// Returns true for writable data properties.
    pub fn is_writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    /// Returns true for enumerable properties.
    pub fn is_enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    /// Returns true for configurable properties.
    pub fn is_configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }

    /// Attributes after `Object.seal`.
    pub fn sealed(self) -> Self {
        self - Self::CONFIGURABLE
    }

    /// Attributes after `Object.freeze`. Accessors keep their setter.
    pub fn frozen(self) -> Self {
        if self.is_accessor() {
            self - Self::CONFIGURABLE
        } else {
            self - Self::CONFIGURABLE - Self::WRITABLE
        }
    }
}

/// Identifier of a hidden class in a [`ClassPool`].
///
/// Carries the generation of the pool slot, so an id kept by an inline
/// cache after its class was collected never matches a newer class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId {
    index: u32,
    generation: u32,
}

impl ClassId {
    /// Pool slot of this class.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// One named property in a class: its key and attributes.
///
/// The slot of the property is its position in the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEntry {
    /// Interned property name
    pub key: HeapRef,
    /// Property attributes
    pub attributes: PropertyAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Transition {
    Add(HeapRef, PropertyAttributes),
    Change(HeapRef, PropertyAttributes),
    Remove(HeapRef),
    Prototype(Option<HeapRef>),
    NonExtensible,
    Sealed,
    Frozen,
}

/// Immutable descriptor of an object's named-property layout.
#[derive(Debug)]
pub struct HiddenClass {
    prototype: Value,
    entries: Vec<ClassEntry>,
    index: HashMap<HeapRef, u32>,
    extensible: bool,
    parent: Option<ClassId>,
    transitions: HashMap<Transition, ClassId>,
}

impl HiddenClass {
    fn empty(prototype: Value) -> Self {
        HiddenClass {
            prototype,
            entries: Vec::new(),
            index: HashMap::new(),
            extensible: true,
            parent: None,
            transitions: HashMap::new(),
        }
    }

    /// Prototype shared by all objects of this class (`Null` or an object).
    pub fn prototype(&self) -> Value {
        self.prototype
    }

    /// Number of named properties, which is also the object's slot count.
    pub fn property_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether objects of this class may gain properties.
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Looks up a property by name, returning its slot and attributes.
    pub fn find(&self, key: HeapRef) -> Option<(u32, PropertyAttributes)> {
        let slot = *self.index.get(&key)?;
        Some((slot, self.entries[slot as usize].attributes))
    }

    /// Looks up a property's slot by name.
    pub fn lookup_property(&self, key: HeapRef) -> Option<u32> {
        self.index.get(&key).copied()
    }

    /// Properties in insertion order.
    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    /// The class this one was derived from.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Number of interned outgoing transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub(crate) fn trace(&self, tracer: &mut crate::gc::Tracer<'_>) {
        tracer.mark_value(self.prototype);
        for entry in &self.entries {
            tracer.mark_ref(entry.key);
        }
        if let Some(parent) = self.parent {
            tracer.mark_class(parent);
        }
    }
}

#[derive(Debug)]
struct ClassSlot {
    generation: u32,
    class: Option<HiddenClass>,
}

fn prototype_key(prototype: Value) -> Option<HeapRef> {
    prototype.as_object()
}

/// Engine-owned pool of interned hidden classes.
#[derive(Debug, Default)]
pub struct ClassPool {
    slots: Vec<ClassSlot>,
    free: Vec<u32>,
    roots: HashMap<Option<HeapRef>, ClassId>,
    live: usize,
}

impl ClassPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live classes.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Number of pool slots, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns true when the pool holds no classes.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns true while `id` names a class that has not been collected.
    pub fn is_live(&self, id: ClassId) -> bool {
        self.try_get(id).is_some()
    }

    /// Returns the class, or `None` if it was collected.
    pub fn try_get(&self, id: ClassId) -> Option<&HiddenClass> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.class.as_ref()
    }

    /// Returns the class.
    ///
    /// # Panics
    ///
    /// Panics if the class was collected; live objects always keep their
    /// class alive, so this indicates a rooting bug.
    pub fn get(&self, id: ClassId) -> &HiddenClass {
        match self.try_get(id) {
            Some(class) => class,
            None => panic!("hidden class {id:?} used after it was collected"),
        }
    }

    fn insert(&mut self, class: HiddenClass) -> ClassId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.class = Some(class);
            return ClassId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(ClassSlot {
            generation: 0,
            class: Some(class),
        });
        ClassId {
            index,
            generation: 0,
        }
    }

    fn cached(&self, from: ClassId, transition: &Transition) -> Option<ClassId> {
        let target = *self.get(from).transitions.get(transition)?;
        self.is_live(target).then_some(target)
    }

    fn link(&mut self, from: ClassId, transition: Transition, to: ClassId) {
        if let Some(Some(class)) = self.slots.get_mut(from.index()).map(|s| s.class.as_mut()) {
            class.transitions.insert(transition, to);
        }
    }

    /// The empty, extensible root class for objects with `prototype`.
    pub fn empty_class(&mut self, prototype: Value) -> ClassId {
        let key = prototype_key(prototype);
        if let Some(&id) = self.roots.get(&key) {
            if self.is_live(id) {
                return id;
            }
        }
        let id = self.insert(HiddenClass::empty(prototype));
        self.roots.insert(key, id);
        id
    }

    /// Adds a named property, returning the new class and the slot.
    ///
    /// Calling this with the same `(key, attributes)` from the same class
    /// always yields the same class.
    pub fn add_member(
        &mut self,
        from: ClassId,
        key: HeapRef,
        attributes: PropertyAttributes,
    ) -> (ClassId, u32) {
        let transition = Transition::Add(key, attributes);
        let base = self.get(from);
        debug_assert!(base.find(key).is_none(), "add_member on an existing key");
        let slot = base.entries.len() as u32;
        if let Some(to) = self.cached(from, &transition) {
            return (to, slot);
        }

        let mut entries = base.entries.clone();
        let mut index = base.index.clone();
        entries.push(ClassEntry { key, attributes });
        index.insert(key, slot);
        let class = HiddenClass {
            prototype: base.prototype,
            entries,
            index,
            extensible: base.extensible,
            parent: Some(from),
            transitions: HashMap::new(),
        };
        let to = self.insert(class);
        self.link(from, transition, to);
        trace!(?from, ?to, slot, "hidden class transition: add member");
        (to, slot)
    }

    /// Builds a class by replaying `entries` on the prototype's root class.
    fn rebuild(
        &mut self,
        prototype: Value,
        entries: impl IntoIterator<Item = ClassEntry>,
        extensible: bool,
    ) -> ClassId {
        let mut id = self.empty_class(prototype);
        for entry in entries {
            id = self.add_member(id, entry.key, entry.attributes).0;
        }
        if !extensible {
            id = self.non_extensible(id);
        }
        id
    }

    fn derive_with(
        &mut self,
        from: ClassId,
        transition: Transition,
        build: impl FnOnce(&mut Self, &HiddenClassSnapshot) -> ClassId,
    ) -> ClassId {
        if let Some(to) = self.cached(from, &transition) {
            return to;
        }
        let snapshot = HiddenClassSnapshot::of(self.get(from));
        let to = build(self, &snapshot);
        if to != from {
            self.link(from, transition, to);
        }
        to
    }

    /// Changes the attributes of an existing property. Slots do not move.
    pub fn change_member(
        &mut self,
        from: ClassId,
        key: HeapRef,
        attributes: PropertyAttributes,
    ) -> ClassId {
        match self.get(from).find(key) {
            Some((_, current)) if current == attributes => return from,
            None => return from,
            Some(_) => {}
        }
        self.derive_with(from, Transition::Change(key, attributes), |pool, s| {
            let entries = s.entries.iter().map(|e| {
                if e.key == key {
                    ClassEntry { key, attributes }
                } else {
                    *e
                }
            });
            pool.rebuild(s.prototype, entries.collect::<Vec<_>>(), s.extensible)
        })
    }

    /// Removes a property. Slots after the removed one shift down by one.
    pub fn remove_member(&mut self, from: ClassId, key: HeapRef) -> ClassId {
        if self.get(from).find(key).is_none() {
            return from;
        }
        self.derive_with(from, Transition::Remove(key), |pool, s| {
            let entries: Vec<_> = s.entries.iter().filter(|e| e.key != key).copied().collect();
            pool.rebuild(s.prototype, entries, s.extensible)
        })
    }

    /// Same layout on a different prototype.
    pub fn with_prototype(&mut self, from: ClassId, prototype: Value) -> ClassId {
        if self.get(from).prototype.strict_equals(&prototype) {
            return from;
        }
        self.derive_with(from, Transition::Prototype(prototype_key(prototype)), |pool, s| {
            pool.rebuild(prototype, s.entries.clone(), s.extensible)
        })
    }

    /// Same layout, but objects may no longer gain properties.
    pub fn non_extensible(&mut self, from: ClassId) -> ClassId {
        if !self.get(from).extensible {
            return from;
        }
        self.derive_with(from, Transition::NonExtensible, |pool, _| {
            let base = pool.get(from);
            let class = HiddenClass {
                prototype: base.prototype,
                entries: base.entries.clone(),
                index: base.index.clone(),
                extensible: false,
                parent: Some(from),
                transitions: HashMap::new(),
            };
            pool.insert(class)
        })
    }

    /// Sealed form: non-extensible, every property non-configurable.
    pub fn sealed(&mut self, from: ClassId) -> ClassId {
        self.derive_with(from, Transition::Sealed, |pool, s| {
            let entries: Vec<_> = s
                .entries
                .iter()
                .map(|e| ClassEntry {
                    key: e.key,
                    attributes: e.attributes.sealed(),
                })
                .collect();
            pool.rebuild(s.prototype, entries, false)
        })
    }

    /// Frozen form: sealed, and every data property read-only.
    pub fn frozen(&mut self, from: ClassId) -> ClassId {
        self.derive_with(from, Transition::Frozen, |pool, s| {
            let entries: Vec<_> = s
                .entries
                .iter()
                .map(|e| ClassEntry {
                    key: e.key,
                    attributes: e.attributes.frozen(),
                })
                .collect();
            pool.rebuild(s.prototype, entries, false)
        })
    }

    /// Drops every class not marked in `marks` and prunes edges to them.
    ///
    /// Returns the number of classes reclaimed.
    pub(crate) fn sweep(&mut self, marks: &MarkBits) -> usize {
        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.class.is_some() && !marks.is_set(index) {
                slot.class = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                reclaimed += 1;
            }
        }
        self.live -= reclaimed;

        let generations: Vec<(u32, bool)> = self
            .slots
            .iter()
            .map(|s| (s.generation, s.class.is_some()))
            .collect();
        let alive = |id: &ClassId| {
            generations
                .get(id.index())
                .is_some_and(|&(g, present)| present && g == id.generation)
        };
        for slot in &mut self.slots {
            if let Some(class) = slot.class.as_mut() {
                class.transitions.retain(|_, to| alive(to));
            }
        }
        self.roots.retain(|_, id| alive(id));
        reclaimed
    }
}

/// Owned copy of the parts of a class needed to rebuild a derivative while
/// the pool is being mutated.
struct HiddenClassSnapshot {
    prototype: Value,
    entries: Vec<ClassEntry>,
    extensible: bool,
}

impl HiddenClassSnapshot {
    fn of(class: &HiddenClass) -> Self {
        HiddenClassSnapshot {
            prototype: class.prototype,
            entries: class.entries.clone(),
            extensible: class.extensible,
        }
    }
}
