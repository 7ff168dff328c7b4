use crate::domain::entities::dataset::CellValue;

/// Longest prefix matching `[+-](Infinity | digits[.digits] | .digits)([eE][+-]digits)?`
/// after leading whitespace, so `"12kg"` reads as `12`.
pub fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let bytes = trimmed.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    if trimmed[pos..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let int_digits = &trimmed[int_start..pos];

    let mut frac_digits = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        frac_digits = &trimmed[frac_start..frac_end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent = String::new();
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_pos = pos + 1;
        let mut exp_sign = "";
        match bytes.get(exp_pos) {
            Some(b'-') => {
                exp_sign = "-";
                exp_pos += 1;
            }
            Some(b'+') => exp_pos += 1,
            _ => {}
        }
        let exp_start = exp_pos;
        while bytes.get(exp_pos).is_some_and(u8::is_ascii_digit) {
            exp_pos += 1;
        }
        if exp_pos > exp_start {
            exponent = format!("e{exp_sign}{}", &trimmed[exp_start..exp_pos]);
        }
    }

    let normalized = format!(
        "{}{}.{}{}",
        if negative { "-" } else { "" },
        if int_digits.is_empty() { "0" } else { int_digits },
        if frac_digits.is_empty() { "0" } else { frac_digits },
        exponent
    );
    normalized.parse::<f64>().ok()
}

pub fn cell_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Null => None,
        CellValue::Number(number) if number.is_nan() => None,
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => parse_float(text),
    }
}

/// Shortest round-trip digits; exponent form outside `[1e-6, 1e21)`.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{value}");
    }

    let text = format!("{value:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

/// Fixed-point rendering of the exact binary value, ties rounded away from
/// zero. A result of zero prints unsigned.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return number_to_string(value);
    }

    // Enough places that rounding at the last one cannot carry into digit `digits + 1`.
    let precision = 2 * digits + 40;
    let expanded = format!("{:.precision$}", value.abs());
    let (int_part, frac_part) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));

    let mut kept = int_part.to_string();
    if digits > 0 {
        kept.push('.');
        kept.push_str(frac_part.get(..digits).unwrap_or_default());
    }
    if frac_part.as_bytes().get(digits).is_some_and(|&next| next >= b'5') {
        kept = increment_decimal(&kept);
    }

    let is_zero = kept.bytes().all(|b| b == b'0' || b == b'.');
    if value.is_sign_negative() && !is_zero {
        format!("-{kept}")
    } else {
        kept
    }
}

fn increment_decimal(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for idx in (0..chars.len()).rev() {
        match chars[idx] {
            '.' => continue,
            '9' => chars[idx] = '0',
            digit => {
                chars[idx] = char::from(digit as u8 + 1);
                return chars.into_iter().collect();
            }
        }
    }
    chars.insert(0, '1');
    chars.into_iter().collect()
}

pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_takes_longest_numeric_prefix() {
        assert_eq!(parse_float("42"), Some(42.0));
        assert_eq!(parse_float("  3.5"), Some(3.5));
        assert_eq!(parse_float("12kg"), Some(12.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("-7e2x"), Some(-700.0));
        assert_eq!(parse_float("1e"), Some(1.0));
        assert_eq!(parse_float("+2"), Some(2.0));
        assert_eq!(parse_float("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn parse_float_rejects_non_numeric_text() {
        for text in ["", "x", "-", ".", "abc1", " ", "NaN", "e5", "+.e1"] {
            assert_eq!(parse_float(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn cell_number_handles_each_variant() {
        assert_eq!(cell_number(&CellValue::Number(1.5)), Some(1.5));
        assert_eq!(cell_number(&CellValue::Number(f64::NAN)), None);
        assert_eq!(cell_number(&CellValue::Text("9 items".into())), Some(9.0));
        assert_eq!(cell_number(&CellValue::Null), None);
    }

    #[test]
    fn number_to_string_matches_browser_rendering() {
        assert_eq!(number_to_string(100.0), "100");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
    }

    #[test]
    fn to_fixed_rounds_exact_ties_away_from_zero() {
        assert_eq!(to_fixed(20.0, 2), "20.00");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(30.0, 1), "30.0");
        assert_eq!(to_fixed(33.333_333, 1), "33.3");
    }

    #[test]
    fn to_fixed_uses_the_stored_binary_value() {
        // Each literal is stored just below the written halfway point.
        assert_eq!(to_fixed(0.015, 2), "0.01");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(0.145, 2), "0.14");
        assert_eq!(to_fixed(0.045, 2), "0.04");
        assert_eq!(to_fixed((0.01 + 0.02) / 2.0, 2), "0.01");
        assert_eq!(to_fixed(-1.005, 2), "-1.00");
    }

    #[test]
    fn to_fixed_carries_and_drops_negative_zero() {
        assert_eq!(to_fixed(9.96, 1), "10.0");
        assert_eq!(to_fixed(99.999, 2), "100.00");
        assert_eq!(to_fixed(-0.001, 2), "0.00");
        assert_eq!(to_fixed(-0.0, 2), "0.00");
        assert_eq!(to_fixed(1e21, 2), "1e+21");
    }

    #[test]
    fn safe_div_guards_zero_denominator() {
        assert_eq!(safe_div(3.0, 0.0), 0.0);
        assert_eq!(safe_div(3.0, 4.0), 0.75);
    }
}
