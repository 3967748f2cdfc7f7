//! Reading numbers out of display strings and stored form values.

use winnow::combinator::opt;
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

fn leading_decimal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(0.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(0.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)
}

/// Extract a numeric fact from a display string such as `"$1,250.00"`.
///
/// Every character other than ASCII digits and `.` is dropped, then the longest
/// leading decimal number is read (`"12.5.3"` reads as `12.5`). Anything
/// unreadable is `0`.
#[must_use]
pub fn extract(raw: &str) -> f64 {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut input = stripped.as_str();
    leading_decimal
        .parse_next(&mut input)
        .ok()
        .and_then(|number| number.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse a configured threshold. Blank or non-numeric values are `None`.
#[must_use]
pub fn parse_threshold(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
