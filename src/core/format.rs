/// Formats a number with two decimals, `,` as the decimal separator and `.`
/// between thousands: `1234.5` becomes `1.234,50`.
///
/// Rounding is half away from zero on the number as written, so `1.005`
/// gives `1,01` even though the nearest `f64` is slightly below it.
pub fn format_tr(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let (int_part, frac_part) = round_to_cents(value.abs());
    let negative = value < 0.0 && (int_part != "0" || frac_part != "00");

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped},{frac_part}")
    } else {
        format!("{grouped},{frac_part}")
    }
}

/// Rounds a non-negative finite value to two decimals using its shortest
/// decimal form. Returns the integer and fractional digits.
fn round_to_cents(value: f64) -> (String, String) {
    // `Display` for f64 never uses exponent notation.
    let text = value.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - 2;
    let render = |d: &[u8]| d.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    (render(&digits[..split]), render(&digits[split..]))
}
