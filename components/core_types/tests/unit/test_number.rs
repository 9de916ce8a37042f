//! Unit tests for numeric conversions

use core_types::{
    number_to_string, parse_array_index, string_to_number, to_int32, to_uint16, to_uint32,
};

#[cfg(test)]
mod number_conversion_tests {
    use super::*;

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(to_int32(2147483648.0), i32::MIN);
        assert_eq!(to_int32(-1.5), -1);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(f64::INFINITY), 0);
    }

    #[test]
    fn test_to_uint32_wraps() {
        assert_eq!(to_uint32(-1.0), u32::MAX);
        assert_eq!(to_uint32(4294967296.0), 0);
        assert_eq!(to_uint16(65537.0), 1);
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(100.0), "100");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("\n 12.5 \t"), 12.5);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("0o17"), 15.0);
        assert_eq!(string_to_number("Infinity"), f64::INFINITY);
        assert_eq!(string_to_number(".5"), 0.5);
        assert!(string_to_number("1e").is_nan());
        assert!(string_to_number("0x").is_nan());
    }

    #[test]
    fn test_parse_array_index() {
        assert_eq!(parse_array_index("0"), Some(0));
        assert_eq!(parse_array_index("4294967294"), Some(4294967294));
        assert_eq!(parse_array_index("4294967295"), None);
        assert_eq!(parse_array_index("01"), None);
        assert_eq!(parse_array_index("-1"), None);
        assert_eq!(parse_array_index("1.0"), None);
        assert_eq!(parse_array_index(""), None);
    }
}
