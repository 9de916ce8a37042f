//! References into the managed heap and property keys.

use std::fmt;

/// Index of a managed cell plus the generation of the slot it lives in.
///
/// The memory manager bumps a slot's generation every time the cell in it
/// is reclaimed, so a reference that outlived its target can be detected
/// instead of silently aliasing a newer allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapRef {
    index: u32,
    generation: u16,
}

impl HeapRef {
    /// Creates a reference from its raw parts.
    pub const fn new(index: u32, generation: u16) -> Self {
        HeapRef { index, generation }
    }

    /// Slot index in the heap arena.
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when the reference was created.
    pub const fn generation(self) -> u16 {
        self.generation
    }

    pub(crate) const fn raw_index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Largest valid array index (2^32 - 2).
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// A canonical property key.
///
/// Strings that are canonical array indices (`"0"` .. `"4294967294"`) are
/// always represented as `Index`, so indexed storage and named storage never
/// disagree about where a key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Array index
    Index(u32),
    /// Interned string name
    String(HeapRef),
}

impl PropertyKey {
    /// Returns the array index, if this is one.
    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::String(_) => None,
        }
    }

    /// Returns the interned string, if this is a named key.
    pub fn as_string(&self) -> Option<HeapRef> {
        match self {
            PropertyKey::String(r) => Some(*r),
            PropertyKey::Index(_) => None,
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        PropertyKey::Index(index)
    }
}

/// Parses a canonical array index.
///
/// Leading zeros, signs and values above [`MAX_ARRAY_INDEX`] are rejected,
/// so `parse_array_index(s).map(|i| i.to_string()) == Some(s)` always holds.
///
/// ```
/// use core_types::parse_array_index;
///
/// assert_eq!(parse_array_index("0"), Some(0));
/// assert_eq!(parse_array_index("42"), Some(42));
/// assert_eq!(parse_array_index("042"), None);
/// assert_eq!(parse_array_index("4294967295"), None);
/// ```
pub fn parse_array_index(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    if !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value: u64 = s.parse().ok()?;
    if value > u64::from(MAX_ARRAY_INDEX) {
        return None;
    }
    u32::try_from(value).ok()
}
