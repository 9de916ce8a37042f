//! Inline caching for named and indexed property access.
//!
//! A [`Lookup`] belongs to one access site. It remembers, per receiver
//! hidden class, where the property was found: an own slot or a slot on
//! the receiver's direct prototype. Class identity includes the class
//! generation, so an entry can never match a class that was collected and
//! whose index was reused. Every cached result equals what the uncached
//! property protocol would return.

use arrayvec::ArrayVec;
use core_types::{ErrorKind, HeapRef, JsResult, PropertyKey, Value};
use memory_manager::{ClassId, ObjectKind, Slot};
use tracing::trace;

use crate::engine::Engine;

/// Receiver classes a polymorphic site tracks before going generic.
pub const POLYMORPHIC_CAPACITY: usize = 4;

/// How a cache entry is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Read a data slot
    Load,
    /// Call the getter in an accessor slot
    Getter,
    /// Overwrite an own writable data slot
    Store,
    /// Call the setter in an accessor slot
    Setter,
}

/// One cached resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    /// Class of the receiver
    pub receiver: ClassId,
    /// Prototype holding the property and its class, when not own
    pub holder: Option<(HeapRef, ClassId)>,
    /// Slot in the holder (or receiver)
    pub slot: u32,
    /// Use of the slot
    pub kind: CacheKind,
}

/// Inline cache state.
///
/// Transitions only move forward: uninitialized, monomorphic,
/// polymorphic, generic.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    /// Nothing cached yet
    #[default]
    Uninitialized,
    /// One receiver class
    Monomorphic(CacheEntry),
    /// Up to [`POLYMORPHIC_CAPACITY`] receiver classes
    Polymorphic(ArrayVec<CacheEntry, POLYMORPHIC_CAPACITY>),
    /// Always takes the full lookup
    Generic,
}

impl LookupState {
    /// Entry cached for `receiver`.
    pub fn find(&self, receiver: ClassId) -> Option<CacheEntry> {
        match self {
            LookupState::Monomorphic(entry) if entry.receiver == receiver => Some(*entry),
            LookupState::Polymorphic(entries) => {
                entries.iter().find(|e| e.receiver == receiver).copied()
            }
            _ => None,
        }
    }

    /// Records `entry`, widening the state as needed.
    pub fn update(&mut self, entry: CacheEntry) {
        match self {
            LookupState::Uninitialized => {
                *self = LookupState::Monomorphic(entry);
            }
            LookupState::Monomorphic(cached) => {
                if cached.receiver == entry.receiver {
                    *cached = entry;
                } else {
                    let mut entries = ArrayVec::new();
                    entries.push(*cached);
                    entries.push(entry);
                    *self = LookupState::Polymorphic(entries);
                }
            }
            LookupState::Polymorphic(entries) => {
                if let Some(cached) = entries.iter_mut().find(|e| e.receiver == entry.receiver) {
                    *cached = entry;
                } else if entries.len() < POLYMORPHIC_CAPACITY {
                    entries.push(entry);
                } else {
                    *self = LookupState::Generic;
                }
            }
            LookupState::Generic => {}
        }
    }

    /// Gives up on caching for good.
    pub fn generalize(&mut self) {
        *self = LookupState::Generic;
    }

    /// Returns true once the site has gone generic.
    pub fn is_generic(&self) -> bool {
        matches!(self, LookupState::Generic)
    }

    /// State name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            LookupState::Uninitialized => "uninitialized",
            LookupState::Monomorphic(_) => "monomorphic",
            LookupState::Polymorphic(_) => "polymorphic",
            LookupState::Generic => "generic",
        }
    }
}

/// Inline cache of one named property access site.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    key: PropertyKey,
    state: LookupState,
    hits: u64,
    misses: u64,
}

impl Lookup {
    /// Property name of the site.
    pub fn key(&self) -> PropertyKey {
        self.key
    }

    /// Current cache state.
    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// Accesses served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Accesses that needed a full lookup.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    fn record(&mut self, resolution: Option<CacheEntry>) {
        let before = self.state.name();
        match resolution {
            Some(entry) => self.state.update(entry),
            None => self.state.generalize(),
        }
        let after = self.state.name();
        if before != after {
            trace!(key = ?self.key, from = before, to = after, "inline cache transition");
        }
    }
}

/// Inline cache state of one indexed access site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexedLookup {
    /// Nothing seen yet
    #[default]
    Uninitialized,
    /// Receivers so far had dense element storage
    Dense,
    /// Always takes the full lookup
    Generic,
}

impl IndexedLookup {
    fn transition(&mut self, to: IndexedLookup) {
        if *self != to && *self != IndexedLookup::Generic {
            trace!(from = ?*self, ?to, "indexed cache transition");
            *self = to;
        }
    }
}

impl Engine {
    /// Creates a cache for accesses to `name`, pinning the name.
    pub fn create_lookup(&mut self, name: &str) -> Lookup {
        let key = self.key(name);
        if let PropertyKey::String(s) = key {
            self.pin_identifier(s);
        }
        Lookup {
            key,
            state: LookupState::Uninitialized,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns true if `name` on `object` is computed by the object's kind
    /// rather than stored in a slot.
    fn has_virtual_named(&self, object: HeapRef, name: HeapRef) -> bool {
        name == self.names.length
            && matches!(
                self.heap.object(object).kind,
                ObjectKind::Array { .. } | ObjectKind::String(_)
            )
    }

    /// Where `name` resolves for a read, if the answer is cacheable.
    fn resolve_load(&self, object: HeapRef, name: HeapRef) -> Option<CacheEntry> {
        if self.has_virtual_named(object, name) {
            return None;
        }
        let receiver = self.heap.object(object).class;
        let class = self.heap.classes().get(receiver);
        let kind = |accessor: bool| if accessor { CacheKind::Getter } else { CacheKind::Load };
        if let Some((slot, attributes)) = class.find(name) {
            return Some(CacheEntry {
                receiver,
                holder: None,
                slot,
                kind: kind(attributes.is_accessor()),
            });
        }
        let Value::Object(prototype) = class.prototype() else {
            return None;
        };
        if self.has_virtual_named(prototype, name) {
            return None;
        }
        let holder_class = self.heap.object(prototype).class;
        let (slot, attributes) = self.heap.classes().get(holder_class).find(name)?;
        Some(CacheEntry {
            receiver,
            holder: Some((prototype, holder_class)),
            slot,
            kind: kind(attributes.is_accessor()),
        })
    }

    /// Where a write to `name` goes, if the answer is cacheable.
    fn resolve_store(&self, object: HeapRef, name: HeapRef) -> Option<CacheEntry> {
        if self.has_virtual_named(object, name) {
            return None;
        }
        let receiver = self.heap.object(object).class;
        let class = self.heap.classes().get(receiver);
        let setter_of = |holder: HeapRef, slot: u32| {
            matches!(
                self.heap.object(holder).slots.get(slot as usize),
                Some(Slot::Accessor { setter, .. }) if !setter.is_undefined()
            )
        };
        if let Some((slot, attributes)) = class.find(name) {
            let kind = if attributes.is_accessor() && setter_of(object, slot) {
                CacheKind::Setter
            } else if attributes.is_data() && attributes.is_writable() {
                CacheKind::Store
            } else {
                return None;
            };
            return Some(CacheEntry {
                receiver,
                holder: None,
                slot,
                kind,
            });
        }
        let Value::Object(prototype) = class.prototype() else {
            return None;
        };
        if self.has_virtual_named(prototype, name) {
            return None;
        }
        let holder_class = self.heap.object(prototype).class;
        let (slot, attributes) = self.heap.classes().get(holder_class).find(name)?;
        if !attributes.is_accessor() || !setter_of(prototype, slot) {
            return None;
        }
        Some(CacheEntry {
            receiver,
            holder: Some((prototype, holder_class)),
            slot,
            kind: CacheKind::Setter,
        })
    }

    /// Slot an entry points at, if the entry still applies.
    fn cached_slot(&self, object: HeapRef, entry: &CacheEntry) -> Option<Slot> {
        let holder = match entry.holder {
            None => self.heap.object(object),
            Some((holder, class)) => {
                let holder = self.heap.try_object(holder)?;
                if holder.class != class {
                    return None;
                }
                holder
            }
        };
        holder.slots.get(entry.slot as usize).copied()
    }

    fn cached_load(
        &mut self,
        lookup: &mut Lookup,
        object: HeapRef,
        receiver: Value,
    ) -> Option<JsResult<Value>> {
        let PropertyKey::String(name) = lookup.key else {
            return None;
        };
        if lookup.state.is_generic() {
            return None;
        }
        let class = self.heap.object(object).class;
        let hit = lookup
            .state
            .find(class)
            .filter(|e| matches!(e.kind, CacheKind::Load | CacheKind::Getter))
            .and_then(|e| self.cached_slot(object, &e));
        match hit {
            Some(Slot::Data(value)) => {
                lookup.hits += 1;
                Some(Ok(value))
            }
            Some(Slot::Accessor { getter, .. }) => {
                lookup.hits += 1;
                if getter.is_undefined() {
                    return Some(Ok(Value::Undefined));
                }
                Some(self.call(getter, receiver, &[]))
            }
            None => {
                lookup.misses += 1;
                let resolution = self.resolve_load(object, name);
                lookup.record(resolution);
                None
            }
        }
    }

    /// `base.name` through the site's cache.
    pub fn lookup_get(&mut self, lookup: &mut Lookup, base: Value) -> JsResult<Value> {
        if let Value::Object(object) = base {
            if let Some(result) = self.cached_load(lookup, object, base) {
                return result;
            }
        } else if !lookup.state.is_generic() {
            lookup.misses += 1;
            lookup.record(None);
        }
        self.get_value(base, lookup.key)
    }

    /// `base.name = value` through the site's cache.
    pub fn lookup_set(&mut self, lookup: &mut Lookup, base: Value, value: Value) -> JsResult<()> {
        let (Value::Object(object), PropertyKey::String(name)) = (base, lookup.key) else {
            if !lookup.state.is_generic() {
                lookup.misses += 1;
                lookup.record(None);
            }
            return self.put(base, lookup.key, value);
        };
        if !lookup.state.is_generic() {
            let class = self.heap.object(object).class;
            let entry = lookup
                .state
                .find(class)
                .filter(|e| matches!(e.kind, CacheKind::Store | CacheKind::Setter));
            if let Some(entry) = entry {
                match (entry.kind, self.cached_slot(object, &entry)) {
                    (CacheKind::Store, Some(Slot::Data(_))) => {
                        lookup.hits += 1;
                        let slot = entry.slot as usize;
                        self.heap.object_mut(object).slots[slot] = Slot::Data(value);
                        return Ok(());
                    }
                    (CacheKind::Setter, Some(Slot::Accessor { setter, .. }))
                        if !setter.is_undefined() =>
                    {
                        lookup.hits += 1;
                        self.call(setter, base, &[value])?;
                        return Ok(());
                    }
                    _ => {}
                }
            }
            lookup.misses += 1;
            let resolution = self.resolve_store(object, name);
            lookup.record(resolution);
        }
        self.put(base, lookup.key, value)
    }

    /// Reads a global variable through the site's cache; unresolvable
    /// names throw a `ReferenceError`.
    pub fn lookup_global_get(&mut self, lookup: &mut Lookup) -> JsResult<Value> {
        let global = self.intrinsics.global;
        if let Some(result) = self.cached_load(lookup, global, Value::Object(global)) {
            return result;
        }
        if !self.has_property(global, lookup.key) {
            let message = format!("{} is not defined", self.key_to_string(lookup.key));
            return Err(self.throw_error(ErrorKind::ReferenceError, &message));
        }
        self.get(global, lookup.key)
    }

    /// `base[index]` through an indexed cache.
    pub fn indexed_get(
        &mut self,
        lookup: &mut IndexedLookup,
        base: Value,
        index: u32,
    ) -> JsResult<Value> {
        match base {
            Value::Object(object) if *lookup != IndexedLookup::Generic => {
                let elements = &self.heap.object(object).elements;
                if let Some(value) = elements.dense_get(index) {
                    lookup.transition(IndexedLookup::Dense);
                    return Ok(value);
                }
                if !elements.is_dense() {
                    lookup.transition(IndexedLookup::Generic);
                }
            }
            Value::Object(_) => {}
            _ => lookup.transition(IndexedLookup::Generic),
        }
        self.get_value(base, PropertyKey::Index(index))
    }

    /// `base[index] = value` through an indexed cache.
    pub fn indexed_set(
        &mut self,
        lookup: &mut IndexedLookup,
        base: Value,
        index: u32,
        value: Value,
    ) -> JsResult<()> {
        match base {
            Value::Object(object) if *lookup != IndexedLookup::Generic => {
                let elements = &mut self.heap.object_mut(object).elements;
                if elements.dense_set(index, value) {
                    lookup.transition(IndexedLookup::Dense);
                    return Ok(());
                }
                if !elements.is_dense() {
                    lookup.transition(IndexedLookup::Generic);
                }
            }
            Value::Object(_) => {}
            _ => lookup.transition(IndexedLookup::Generic),
        }
        self.put(base, PropertyKey::Index(index), value)
    }
}
