//! Operand formatting for IFJcode24
//!
//! - Integers: `int@-5`
//! - Floats: `float@0x1.8p+0`, the C `%a` hexadecimal form
//! - Strings: `string@a\032b`, one char per byte; whitespace, control characters, `#`,
//!   `\` and bytes from 127 up are escaped as a three-digit decimal code
//! - Null: `nil@nil`

use crate::parser::ast::Literal;

/// Format an `f64` the way C's `printf("%a")` does
pub fn hex_float(value: f64) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value == 0.0 {
        return format!("{}0x0p+0", sign);
    }

    let bits = value.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let mantissa = bits & ((1u64 << 52) - 1);

    let (leading, exponent) = if biased_exponent == 0 {
        (0, -1022) // subnormal
    } else {
        (1, biased_exponent - 1023)
    };

    let digits = format!("{:013x}", mantissa);
    let digits = digits.trim_end_matches('0');

    if digits.is_empty() {
        format!("{}0x{}p{:+}", sign, leading, exponent)
    } else {
        format!("{}0x{}.{}p{:+}", sign, leading, digits, exponent)
    }
}

/// Escape string contents for a `string@` operand
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        let code = u32::from(ch);
        if code > 255 {
            let mut buffer = [0; 4];
            for byte in ch.encode_utf8(&mut buffer).bytes() {
                escaped.push_str(&format!("\\{:03}", byte));
            }
        } else if code <= 32 || code == 35 || code == 92 || code >= 127 {
            escaped.push_str(&format!("\\{:03}", code));
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

/// Constant operand for a literal
pub fn literal_operand(literal: &Literal) -> String {
    match literal {
        Literal::Int(value) => format!("int@{}", value),
        Literal::Float(value) => format!("float@{}", hex_float(*value)),
        Literal::Str(text) => format!("string@{}", escape_string(text)),
        Literal::Null => "nil@nil".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_hex_float() {
        assert_eq!(hex_float(1.5), "0x1.8p+0");
        assert_eq!(hex_float(0.0), "0x0p+0");
        assert_eq!(hex_float(-2.0), "-0x1p+1");
        assert_eq!(hex_float(0.1), "0x1.999999999999ap-4");
        assert_eq!(hex_float(1024.0), "0x1p+10");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a b"), "a\\032b");
        assert_eq!(escape_string("#\\\n"), "\\035\\092\\010");
        assert_eq!(escape_string("plain"), "plain");
        assert_eq!(escape_string("\u{e9}\u{7f}"), "\\233\\127");
        assert_eq!(escape_string("\u{20ac}"), "\\226\\130\\172");
    }

    #[test]
    fn test_literal_operands() {
        assert_eq!(literal_operand(&Literal::Int(-7)), "int@-7");
        assert_eq!(literal_operand(&Literal::Null), "nil@nil");
        assert_eq!(
            literal_operand(&Literal::Str(Rc::from("hi there"))),
            "string@hi\\032there"
        );
    }
}
