//! Display formatting for money amounts.

/// Format `value` with two decimals and comma separated thousands, e.g. `1,234,567.50`.
///
/// Cent ties round away from zero, so `13.125` shows as `13.13`.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", round_cents(value));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) if rest.bytes().any(|b| b.is_ascii_digit() && b != b'0') => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}

fn round_cents(value: f64) -> f64 {
    let cents = (value * 100.0).round();
    if cents.is_finite() {
        cents / 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_reference_values() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(1000.0), "1,000.00");
        assert_eq!(format_currency(1234567.891), "1,234,567.89");
        assert_eq!(format_currency(1234567.5), "1,234,567.50");
    }

    #[test]
    fn no_separator_below_a_thousand() {
        assert_eq!(format_currency(999.999), "1,000.00");
        assert_eq!(format_currency(999.0), "999.00");
        assert_eq!(format_currency(55.0), "55.00");
    }

    #[test]
    fn cent_ties_round_up() {
        // 12.50 with 5% tax
        assert_eq!(format_currency(12.5 + 12.5 * 5.0 / 100.0), "13.13");
        assert_eq!(format_currency(0.125), "0.13");
        assert_eq!(format_currency(2.625), "2.63");
        assert_eq!(format_currency(-2.625), "-2.63");
    }

    #[test]
    fn negative_zero_drops_sign() {
        assert_eq!(format_currency(-0.001), "0.00");
        assert_eq!(format_currency(-1500.0), "-1,500.00");
    }
}
