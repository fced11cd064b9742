//! Lenient parsing of newline separated bill amounts.

/// A line that could not be read as a number and was counted as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number within the raw text.
    pub line_no: usize,
    pub text: String,
}

/// Outcome of parsing a block of bill lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedBill {
    pub total: f64,
    /// Parsed amounts in input order. Blank and rejected lines are omitted.
    pub amounts: Vec<f64>,
    pub rejected: Vec<RejectedLine>,
}

impl ParsedBill {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Parse a single amount, ignoring surrounding whitespace.
///
/// Blank input is zero. Returns `None` for anything that is not a finite decimal number.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Split raw text on any line ending (`\r\n`, `\r`, `\n`) and sum the amounts.
///
/// Lines that fail to parse contribute zero and are reported in [`ParsedBill::rejected`].
pub fn parse_bill_lines(text: &str) -> ParsedBill {
    let mut parsed = ParsedBill::default();

    for (idx, line) in split_lines(text).enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_amount(trimmed) {
            Some(amount) => {
                parsed.total += amount;
                parsed.amounts.push(amount);
            }
            None => {
                tracing::debug!(line_no = idx + 1, text = %trimmed, "bill line counted as zero");
                parsed.rejected.push(RejectedLine {
                    line_no: idx + 1,
                    text: trimmed.to_owned(),
                });
            }
        }
    }

    parsed
}

/// Convenience wrapper returning only the sum.
pub fn sum_bill_lines(text: &str) -> f64 {
    parse_bill_lines(text).total
}

fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\r', '\n']) {
            Some(pos) => {
                let skip = if current[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[pos + skip..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_lines_and_skips_garbage() {
        let parsed = parse_bill_lines("10\nabc\n5.5");
        assert_eq!(parsed.total, 15.5);
        assert_eq!(parsed.amounts, vec![10.0, 5.5]);
        assert_eq!(
            parsed.rejected,
            vec![RejectedLine {
                line_no: 2,
                text: "abc".into()
            }]
        );
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(sum_bill_lines(""), 0.0);
        assert!(!parse_bill_lines("").has_rejections());
    }

    #[test]
    fn handles_every_line_ending() {
        assert_eq!(sum_bill_lines("1\r\n2\r3\n4"), 10.0);
        let parsed = parse_bill_lines("1\r\nx\r3");
        assert_eq!(parsed.rejected[0].line_no, 2);
    }

    #[test]
    fn trims_whitespace_and_ignores_blank_lines() {
        assert_eq!(sum_bill_lines("  12.5 \n\n\t7.5\n"), 20.0);
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(sum_bill_lines("inf\n3"), 3.0);
    }

    #[test]
    fn parse_amount_accepts_plain_decimals() {
        assert_eq!(parse_amount(" 10 "), Some(10.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount(""), Some(0.0));
        assert_eq!(parse_amount("1,000"), None);
    }
}
