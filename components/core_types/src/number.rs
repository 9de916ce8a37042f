//! Numeric conversions and the integer arithmetic fast paths.
//!
//! Everything here is pure: no heap access and no user code. Conversions
//! that may re-enter script (`ToPrimitive` on objects) live in the engine.

use crate::value::Value;

const TWO_32: f64 = 4_294_967_296.0;

/// ECMAScript ToInt32 applied to a number.
///
/// ```
/// use core_types::to_int32;
///
/// assert_eq!(to_int32(4294967297.0), 1);
/// assert_eq!(to_int32(2147483648.0), -2147483648);
/// assert_eq!(to_int32(f64::NAN), 0);
/// assert_eq!(to_int32(-1.9), -1);
/// ```
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ECMAScript ToUint32 applied to a number.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let truncated = n.trunc();
    if truncated >= 0.0 && truncated < TWO_32 {
        return truncated as u32;
    }
    let modulo = truncated.rem_euclid(TWO_32);
    modulo as u32
}

/// ECMAScript ToUint16 applied to a number.
pub fn to_uint16(n: f64) -> u16 {
    to_uint32(n) as u16
}

/// ECMAScript ToIntegerOrInfinity applied to a number.
pub fn to_integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() {
        return 0.0;
    }
    let t = n.trunc();
    if t == 0.0 {
        0.0
    } else {
        t
    }
}

/// Number::toString(10).
///
/// Uses the shortest round-tripping digit string (via `ryu`) and lays it
/// out with the ECMAScript rules for fixed vs exponential notation.
///
/// ```
/// use core_types::number_to_string;
///
/// assert_eq!(number_to_string(1.0), "1");
/// assert_eq!(number_to_string(-0.0), "0");
/// assert_eq!(number_to_string(0.1), "0.1");
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(123456789012345680000.0), "123456789012345680000");
/// assert_eq!(number_to_string(0.000001), "0.000001");
/// assert_eq!(number_to_string(1.5e-7), "1.5e-7");
/// ```
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }

    let mut buffer = ryu::Buffer::new();
    let shortest = buffer.format_finite(n.abs());
    let (digits, exponent) = decimal_digits(shortest);
    let k = digits.len() as i32;
    let e = exponent;

    let mut out = String::with_capacity(k as usize + 8);
    if n < 0.0 {
        out.push('-');
    }
    if k <= e && e <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((e - k) as usize));
    } else if 0 < e && e <= 21 {
        out.push_str(&digits[..e as usize]);
        out.push('.');
        out.push_str(&digits[e as usize..]);
    } else if -6 < e && e <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-e) as usize));
        out.push_str(&digits);
    } else {
        let exp = e - 1;
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&exp.abs().to_string());
    }
    out
}

/// Splits a `ryu` rendering into significant digits and the decimal
/// exponent `n` such that the value is `0.d1d2...dk * 10^n`.
fn decimal_digits(shortest: &str) -> (String, i32) {
    let (mantissa, exp) = match shortest.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (shortest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let mut point = int_part.len() as i32 + exp;

    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits.drain(..leading);
    point -= leading as i32;
    let trimmed_len = digits.trim_end_matches('0').len();
    digits.truncate(trimmed_len);
    if digits.is_empty() {
        digits.push('0');
        point = 1;
    }
    (digits, point)
}

/// WhiteSpace and LineTerminator code points, including the Zs category.
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\u{B}'
            | '\u{C}'
            | ' '
            | '\u{A0}'
            | '\u{FEFF}'
            | '\n'
            | '\r'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// ECMAScript StringToNumber.
///
/// ```
/// use core_types::string_to_number;
///
/// assert_eq!(string_to_number("  42  "), 42.0);
/// assert_eq!(string_to_number(""), 0.0);
/// assert_eq!(string_to_number("0x1F"), 31.0);
/// assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
/// assert!(string_to_number("12px").is_nan());
/// assert!(string_to_number("inf").is_nan());
/// ```
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    let bytes = trimmed.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(&trimmed[2..], radix);
        }
    }
    let (sign, unsigned) = match bytes[0] {
        b'+' => (1.0, &trimmed[1..]),
        b'-' => (-1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    match unsigned.parse::<f64>() {
        Ok(n) => sign * n,
        Err(_) => f64::NAN,
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    // Radix is a power of two: keep the leading bits exactly, remember
    // whether anything non-zero fell off the end, and round once.
    let digit_bits = radix.trailing_zeros();
    let mut mantissa = 0u64;
    let mut exponent = 0i32;
    let mut sticky = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            return f64::NAN;
        };
        if mantissa.leading_zeros() >= digit_bits {
            mantissa = (mantissa << digit_bits) | u64::from(d);
        } else {
            sticky |= d != 0;
            exponent = exponent.saturating_add(digit_bits as i32);
        }
    }
    if sticky {
        // At least 60 significant bits are held, so bit 0 sits below the
        // rounding bit and only breaks ties.
        mantissa |= 1;
    }
    mantissa as f64 * 2f64.powi(exponent)
}

/// StrUnsignedDecimalLiteral without the `Infinity` alternative.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut int_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        int_digits += 1;
    }
    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            frac_digits += 1;
        }
    }
    if int_digits + frac_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}

/// Numeric addition with the integer fast path.
pub fn add(a: &Value, b: &Value) -> Option<Value> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        return Some(match x.checked_add(*y) {
            Some(sum) => Value::Integer(sum),
            None => Value::Double(f64::from(*x) + f64::from(*y)),
        });
    }
    Some(Value::from_number(a.as_number()? + b.as_number()?))
}

/// Numeric subtraction with the integer fast path.
pub fn sub(a: &Value, b: &Value) -> Option<Value> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        return Some(match x.checked_sub(*y) {
            Some(diff) => Value::Integer(diff),
            None => Value::Double(f64::from(*x) - f64::from(*y)),
        });
    }
    Some(Value::from_number(a.as_number()? - b.as_number()?))
}

/// Numeric multiplication with the integer fast path.
///
/// `0 * -5` is `-0` in ECMAScript, which the integer representation cannot
/// hold, so a zero product with a negative operand goes to the double path.
pub fn mul(a: &Value, b: &Value) -> Option<Value> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        if let Some(product) = x.checked_mul(*y) {
            if product != 0 || (*x >= 0 && *y >= 0) {
                return Some(Value::Integer(product));
            }
        }
        return Some(Value::from_number(f64::from(*x) * f64::from(*y)));
    }
    Some(Value::from_number(a.as_number()? * b.as_number()?))
}

/// Numeric negation; `-0` and `-i32::MIN` leave the integer path.
pub fn neg(a: &Value) -> Option<Value> {
    match a {
        Value::Integer(0) => Some(Value::Double(-0.0)),
        Value::Integer(x) => Some(match x.checked_neg() {
            Some(n) => Value::Integer(n),
            None => Value::Double(-f64::from(*x)),
        }),
        _ => Some(Value::from_number(-a.as_number()?)),
    }
}
