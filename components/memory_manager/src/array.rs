//! Indexed property storage.
//!
//! Elements live outside the hidden class. Most arrays stay dense: a vector
//! of values in which [`Value::Empty`] marks a hole. Arrays that grow with a
//! large gap, become mostly holes, or carry non-default attributes on some
//! index switch to a sparse ordered map. The switch is one-way.

use std::collections::BTreeMap;

use core_types::Value;

use crate::hidden_class::PropertyAttributes;
use crate::object::Slot;

/// Largest gap a dense write may fill with holes before going sparse.
pub const SPARSE_GAP_LIMIT: u32 = 1024;

/// Dense arrays shorter than this never go sparse because of holes.
const MIN_HOLE_CHECK_LEN: usize = 64;

/// One indexed property: its value (or accessor pair) and attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedProperty {
    /// Stored value
    pub slot: Slot,
    /// Property attributes
    pub attributes: PropertyAttributes,
}

impl IndexedProperty {
    /// A plain writable, enumerable, configurable data element.
    pub fn data(value: Value) -> Self {
        IndexedProperty {
            slot: Slot::Data(value),
            attributes: PropertyAttributes::default(),
        }
    }
}

/// Element storage of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayStorage {
    /// Contiguous values; `Value::Empty` is a hole.
    Dense {
        /// Element values, never longer than `length`
        values: Vec<Value>,
        /// Number of holes inside `values`
        holes: u32,
        /// Array length (one past the highest index that may exist)
        length: u32,
    },
    /// Ordered map from index to property.
    Sparse {
        /// Present elements
        map: BTreeMap<u32, IndexedProperty>,
        /// Array length
        length: u32,
    },
}

impl Default for ArrayStorage {
    fn default() -> Self {
        ArrayStorage::Dense {
            values: Vec::new(),
            holes: 0,
            length: 0,
        }
    }
}

impl ArrayStorage {
    /// Dense storage holding `values` with no holes.
    pub fn from_values(values: Vec<Value>) -> Self {
        let length = values.len() as u32;
        ArrayStorage::Dense {
            values,
            holes: 0,
            length,
        }
    }

    /// Returns true while the storage is dense.
    pub fn is_dense(&self) -> bool {
        matches!(self, ArrayStorage::Dense { .. })
    }

    /// The length: one past the highest index ever stored or set explicitly.
    pub fn length(&self) -> u32 {
        match self {
            ArrayStorage::Dense { length, .. } | ArrayStorage::Sparse { length, .. } => *length,
        }
    }

    /// Number of present elements.
    pub fn count(&self) -> usize {
        match self {
            ArrayStorage::Dense { values, holes, .. } => values.len() - *holes as usize,
            ArrayStorage::Sparse { map, .. } => map.len(),
        }
    }

    /// Fast path: value of a present dense element.
    pub fn dense_get(&self, index: u32) -> Option<Value> {
        match self {
            ArrayStorage::Dense { values, .. } => {
                values.get(index as usize).copied().filter(|v| !v.is_empty())
            }
            ArrayStorage::Sparse { .. } => None,
        }
    }

    /// Fast path: overwrite a present dense element. Returns false when the
    /// element is absent or the storage is sparse.
    pub fn dense_set(&mut self, index: u32, value: Value) -> bool {
        match self {
            ArrayStorage::Dense { values, .. } => match values.get_mut(index as usize) {
                Some(slot) if !slot.is_empty() => {
                    *slot = value;
                    true
                }
                _ => false,
            },
            ArrayStorage::Sparse { .. } => false,
        }
    }

    /// The element at `index`, if present.
    pub fn get(&self, index: u32) -> Option<IndexedProperty> {
        match self {
            ArrayStorage::Dense { .. } => self.dense_get(index).map(IndexedProperty::data),
            ArrayStorage::Sparse { map, .. } => map.get(&index).copied(),
        }
    }

    /// Stores a data value at `index`, keeping the attributes of an existing
    /// element or creating a default one. Writability is the caller's check.
    pub fn set_value(&mut self, index: u32, value: Value) {
        if let ArrayStorage::Sparse { map, length } = self {
            match map.get_mut(&index) {
                Some(existing) => existing.slot = Slot::Data(value),
                None => {
                    map.insert(index, IndexedProperty::data(value));
                }
            }
            *length = (*length).max(index.saturating_add(1));
            return;
        }
        if !self.dense_write(index, value) {
            self.make_sparse();
            self.set_value(index, value);
        }
    }

    /// Dense write; returns false if the gap is too large.
    fn dense_write(&mut self, index: u32, value: Value) -> bool {
        let ArrayStorage::Dense {
            values,
            holes,
            length,
        } = self
        else {
            return false;
        };
        let at = index as usize;
        if at < values.len() {
            if values[at].is_empty() {
                *holes -= 1;
            }
            values[at] = value;
        } else {
            let gap = (at - values.len()) as u32;
            if gap > SPARSE_GAP_LIMIT {
                return false;
            }
            values.resize(at, Value::Empty);
            values.push(value);
            *holes += gap;
        }
        *length = (*length).max(index.saturating_add(1));
        true
    }

    /// Stores a full property (value or accessor, with attributes).
    pub fn define(&mut self, index: u32, property: IndexedProperty) {
        let plain = property.attributes == PropertyAttributes::default()
            && matches!(property.slot, Slot::Data(_));
        if plain {
            if let Slot::Data(value) = property.slot {
                if self.is_dense() || self.get(index).is_none() {
                    self.set_value(index, value);
                    return;
                }
            }
        }
        self.make_sparse();
        if let ArrayStorage::Sparse { map, length } = self {
            map.insert(index, property);
            *length = (*length).max(index.saturating_add(1));
        }
    }

    /// Removes the element at `index`. Returns true if it existed.
    pub fn remove(&mut self, index: u32) -> bool {
        let removed = match self {
            ArrayStorage::Dense { values, holes, .. } => match values.get_mut(index as usize) {
                Some(slot) if !slot.is_empty() => {
                    *slot = Value::Empty;
                    *holes += 1;
                    if values.len() == index as usize + 1 {
                        while values.last().is_some_and(Value::is_empty) {
                            values.pop();
                            *holes -= 1;
                        }
                    }
                    true
                }
                _ => false,
            },
            ArrayStorage::Sparse { map, .. } => map.remove(&index).is_some(),
        };
        if let ArrayStorage::Dense { values, holes, .. } = self {
            if values.len() >= MIN_HOLE_CHECK_LEN && (*holes as usize) * 2 > values.len() {
                self.make_sparse();
            }
        }
        removed
    }

    /// Sets the length, deleting elements at or above it.
    ///
    /// Truncation stops above the highest non-configurable element; the
    /// resulting length is returned, so a caller can tell whether the full
    /// request succeeded.
    pub fn set_length(&mut self, new_length: u32) -> u32 {
        match self {
            ArrayStorage::Dense {
                values,
                holes,
                length,
            } => {
                if (new_length as usize) < values.len() {
                    let dropped = values.drain(new_length as usize..);
                    let dropped_holes = dropped.filter(Value::is_empty).count() as u32;
                    *holes -= dropped_holes;
                    while values.last().is_some_and(Value::is_empty) {
                        values.pop();
                        *holes -= 1;
                    }
                }
                *length = new_length;
                new_length
            }
            ArrayStorage::Sparse { map, length } => {
                let mut floor = new_length;
                let doomed: Vec<u32> = map.range(new_length..).map(|(&i, _)| i).collect();
                for index in doomed.into_iter().rev() {
                    if map[&index].attributes.is_configurable() {
                        map.remove(&index);
                    } else {
                        floor = index + 1;
                        break;
                    }
                }
                *length = floor;
                floor
            }
        }
    }

    /// Present indices in ascending order.
    pub fn indices(&self) -> Vec<u32> {
        match self {
            ArrayStorage::Dense { values, .. } => values
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(|(i, _)| i as u32)
                .collect(),
            ArrayStorage::Sparse { map, .. } => map.keys().copied().collect(),
        }
    }

    /// Converts to sparse storage (no-op if already sparse).
    pub fn make_sparse(&mut self) {
        if let ArrayStorage::Dense { values, length, .. } = self {
            let map = values
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(|(i, v)| (i as u32, IndexedProperty::data(*v)))
                .collect();
            *self = ArrayStorage::Sparse {
                map,
                length: *length,
            };
        }
    }

    /// Applies `Object.seal` (`freeze == false`) or `Object.freeze`.
    pub fn restrict(&mut self, freeze: bool) {
        if self.count() == 0 {
            return;
        }
        self.make_sparse();
        if let ArrayStorage::Sparse { map, .. } = self {
            for property in map.values_mut() {
                property.attributes = if freeze {
                    property.attributes.frozen()
                } else {
                    property.attributes.sealed()
                };
            }
        }
    }

    /// Calls `f` for every stored value, including accessor functions.
    pub fn for_each_value(&self, mut f: impl FnMut(Value)) {
        match self {
            ArrayStorage::Dense { values, .. } => values.iter().copied().for_each(f),
            ArrayStorage::Sparse { map, .. } => {
                for property in map.values() {
                    property.slot.for_each_value(&mut f);
                }
            }
        }
    }
}
