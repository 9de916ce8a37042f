//! Managed heap cells.

use std::rc::Rc;

use crate::context::ContextRecord;
use crate::gc::{Trace, Tracer};
use crate::object::JsObject;

/// An interned string.
///
/// The text is shared with the heap's intern table; `utf16_len` is the
/// JavaScript `length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsString {
    text: Rc<str>,
    utf16_len: u32,
}

impl JsString {
    pub(crate) fn new(text: Rc<str>) -> Self {
        let utf16_len = text.encode_utf16().count() as u32;
        JsString { text, utf16_len }
    }

    /// The string contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared(&self) -> &Rc<str> {
        &self.text
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> u32 {
        self.utf16_len
    }

    /// Returns true for the empty string.
    pub fn is_empty(&self) -> bool {
        self.utf16_len == 0
    }

    /// The UTF-16 code unit at `index`, as a string of its own.
    ///
    /// Lone surrogates come back as U+FFFD.
    pub fn code_unit_at(&self, index: u32) -> Option<String> {
        let unit = self.text.encode_utf16().nth(index as usize)?;
        Some(String::from_utf16_lossy(&[unit]))
    }
}

/// Contents of one heap slot.
#[derive(Debug, Clone, PartialEq)]
pub enum HeapCell {
    /// Interned string
    String(JsString),
    /// Object
    Object(JsObject),
    /// Execution context
    Context(ContextRecord),
}

impl HeapCell {
    /// Short name of the cell kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            HeapCell::String(_) => "string",
            HeapCell::Object(_) => "object",
            HeapCell::Context(_) => "context",
        }
    }
}

impl Trace for HeapCell {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        match self {
            HeapCell::String(_) => {}
            HeapCell::Object(object) => object.trace(tracer),
            HeapCell::Context(context) => context.trace(tracer),
        }
    }
}
