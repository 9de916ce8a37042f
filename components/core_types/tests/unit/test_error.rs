//! Unit tests for error types

use core_types::{ErrorKind, JsError, JsResult, PendingException};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_all_kinds_have_distinct_names() {
        let mut names: Vec<_> = ErrorKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_display_is_constructor_name() {
        assert_eq!(format!("{}", ErrorKind::ReferenceError), "ReferenceError");
        assert_eq!(format!("{}", ErrorKind::Error), "Error");
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_js_error_formatting() {
        let error = JsError::new(ErrorKind::TypeError, "x is not a function");
        assert_eq!(error.to_string(), "TypeError: x is not a function");
        assert_eq!(error.kind, ErrorKind::TypeError);
    }

    #[test]
    fn test_js_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&JsError::new(ErrorKind::Error, "boom"));
        assert_error(&PendingException);
    }

    #[test]
    fn test_pending_exception_propagates_with_question_mark() {
        fn inner() -> JsResult<i32> {
            Err(PendingException)
        }
        fn outer() -> JsResult<i32> {
            let v = inner()?;
            Ok(v + 1)
        }
        assert_eq!(outer(), Err(PendingException));
    }
}
