//! JavaScript error types and error handling.
//!
//! This module provides the error taxonomy that corresponds to JavaScript's
//! built-in error constructors, the host-facing [`JsError`] report, and the
//! [`PendingException`] marker used by the engine's `Result`-based
//! exception propagation.

use std::fmt;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Plain `Error`
    Error,
    /// Syntax error in JavaScript code
    SyntaxError,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Error in eval() function
    EvalError,
    /// Error in URI handling functions
    URIError,
    /// Internal engine error
    InternalError,
}

impl ErrorKind {
    /// All script-visible kinds, in the order the engine creates their
    /// prototypes.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Error,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::ReferenceError,
        ErrorKind::RangeError,
        ErrorKind::EvalError,
        ErrorKind::URIError,
        ErrorKind::InternalError,
    ];

    /// The constructor name, which is also the prototype's `name` property.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::URIError => "URIError",
            ErrorKind::InternalError => "InternalError",
        }
    }

    /// Position of this kind in [`ErrorKind::ALL`].
    pub fn ordinal(self) -> usize {
        match self {
            ErrorKind::Error => 0,
            ErrorKind::SyntaxError => 1,
            ErrorKind::TypeError => 2,
            ErrorKind::ReferenceError => 3,
            ErrorKind::RangeError => 4,
            ErrorKind::EvalError => 5,
            ErrorKind::URIError => 6,
            ErrorKind::InternalError => 7,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JavaScript exception surfaced to the embedding.
///
/// This is what an uncaught script exception looks like once it escapes
/// the engine: the error kind and its message, detached from the heap.
///
/// # Examples
///
/// ```
/// use core_types::{JsError, ErrorKind};
///
/// let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
/// assert_eq!(error.to_string(), "TypeError: undefined is not a function");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl JsError {
    /// Creates a new error report.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError {
            kind,
            message: message.into(),
        }
    }
}

/// Marker returned by every engine operation that raised a script
/// exception.
///
/// The thrown value itself stays in the engine's current-exception slot,
/// where the collector can see it; callers propagate this marker with `?`
/// until someone catches the exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a JavaScript exception is pending")]
pub struct PendingException;

/// Result of an operation that may throw a script exception.
pub type JsResult<T> = Result<T, PendingException>;
