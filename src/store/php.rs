use winnow::ascii::{dec_int, dec_uint};
use winnow::combinator::{alt, cut_err, delimited, dispatch, fail, preceded, repeat};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_till};

use super::error::DecodeError;
use super::value::{OptionKey, OptionValue};

/// Arrays nested deeper than this are rejected. Stored options use three
/// levels at most.
const MAX_DEPTH: usize = 32;

pub(crate) fn decode(input: &str) -> Result<OptionValue, DecodeError> {
    (|i: &mut &str| value(i, 0))
        .parse(input.trim_end())
        .map_err(|e| DecodeError::new(e.offset(), e.inner().to_string()))
}

/// Cheap check for a serialized payload, in the spirit of WordPress'
/// `is_serialized`.
pub(crate) fn looks_serialized(raw: &str) -> bool {
    let raw = raw.trim();
    if raw == "N;" {
        return true;
    }
    let mut chars = raw.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('a' | 'O' | 's' | 'i' | 'd' | 'b'), Some(':'))
    ) && matches!(raw.chars().last(), Some(';' | '}'))
}

fn value(input: &mut &str, depth: usize) -> ModalResult<OptionValue> {
    dispatch! {any;
        'N' => cut_err(';').value(OptionValue::Null),
        'b' => cut_err(delimited(':', boolean, ';')).map(OptionValue::Bool),
        'i' => cut_err(delimited(':', dec_int, ';')).map(OptionValue::Int),
        'd' => cut_err(delimited(':', double, ';')).map(OptionValue::Float),
        's' => cut_err(delimited(':', string, ';')).map(OptionValue::String),
        'a' => cut_err(preceded(':', |i: &mut &str| array(i, depth))).map(OptionValue::Array),
        'O' => cut_err(preceded(':', |i: &mut &str| object(i, depth))).map(OptionValue::Array),
        _ => fail.context(StrContext::Expected(StrContextValue::Description("a type tag"))),
    }
    .parse_next(input)
}

fn boolean(input: &mut &str) -> ModalResult<bool> {
    alt(('0'.value(false), '1'.value(true))).parse_next(input)
}

fn double(input: &mut &str) -> ModalResult<f64> {
    let raw = take_till(1.., ';').parse_next(input)?;
    raw.parse().map_err(|_| ErrMode::from_input(input).cut())
}

fn length(input: &mut &str) -> ModalResult<usize> {
    let n: u64 = dec_uint.parse_next(input)?;
    usize::try_from(n).map_err(|_| ErrMode::from_input(input).cut())
}

/// `<len>:"<bytes>"`. The length counts bytes, not characters.
fn string(input: &mut &str) -> ModalResult<String> {
    let len = length(input)?;
    ":\"".parse_next(input)?;
    if len > input.len() || !input.is_char_boundary(len) {
        return Err(ErrMode::from_input(input).cut());
    }
    let (text, rest) = input.split_at(len);
    *input = rest;
    '"'.parse_next(input)?;
    Ok(text.to_owned())
}

fn key(input: &mut &str) -> ModalResult<OptionKey> {
    dispatch! {any;
        'i' => delimited(':', dec_int, ';').map(OptionKey::Int),
        's' => delimited(':', string, ';').map(OptionKey::Str),
        _ => fail.context(StrContext::Expected(StrContextValue::Description("an array key"))),
    }
    .parse_next(input)
}

/// `<n>:{<key><value>...}`
fn array(input: &mut &str, depth: usize) -> ModalResult<Vec<(OptionKey, OptionValue)>> {
    if depth >= MAX_DEPTH {
        return cut_err(fail.context(StrContext::Expected(StrContextValue::Description(
            "shallower array nesting",
        ))))
        .parse_next(input);
    }
    let count = length(input)?;
    ":{".parse_next(input)?;
    let entries: Vec<(OptionKey, OptionValue)> =
        repeat(count, (key, |i: &mut &str| value(i, depth + 1))).parse_next(input)?;
    '}'.parse_next(input)?;
    Ok(entries)
}

/// `<len>:"<class>":<n>:{...}`. The class name is dropped.
fn object(input: &mut &str, depth: usize) -> ModalResult<Vec<(OptionKey, OptionValue)>> {
    let _class = string(input)?;
    ':'.parse_next(input)?;
    array(input, depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(input: &str) -> OptionValue {
        decode(input).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(ok("N;"), OptionValue::Null);
        assert_eq!(ok("b:1;"), OptionValue::Bool(true));
        assert_eq!(ok("b:0;"), OptionValue::Bool(false));
        assert_eq!(ok("i:-42;"), OptionValue::Int(-42));
        assert_eq!(ok("d:12.5;"), OptionValue::Float(12.5));
        assert_eq!(ok("d:1.0E+25;"), OptionValue::Float(1.0e25));
        assert_eq!(ok(r#"s:3:"yes";"#), OptionValue::from("yes"));
    }

    #[test]
    fn string_length_is_bytes() {
        assert_eq!(ok(r#"s:5:"café";"#), OptionValue::from("café"));
        assert_eq!(ok(r#"s:6:"a";b:c";"#), OptionValue::from("a\";b:c"));
        assert!(decode(r#"s:4:"café";"#).is_err());
    }

    #[test]
    fn nested_arrays() {
        let value = ok(r#"a:2:{i:0;a:2:{i:0;s:2:"12";i:1;s:2:"13";}i:3;s:0:"";}"#);
        assert_eq!(value.indices(), vec![0, 3]);
        assert_eq!(value.at(0).map(OptionValue::as_ids), Some(vec![12, 13]));
        assert!(value.at(3).is_some_and(OptionValue::is_blank));
    }

    #[test]
    fn objects_decode_as_arrays() {
        let value = ok(r#"O:8:"stdClass":2:{s:9:"activated";b:1;s:8:"instance";s:3:"abc";}"#);
        assert_eq!(value.field("activated"), Some(&OptionValue::Bool(true)));
        assert_eq!(value.field("instance"), Some(&OptionValue::from("abc")));
    }

    #[test]
    fn round_trip_of_written_value() {
        let written = OptionValue::indexed([
            (1, OptionValue::from("contains")),
            (4, OptionValue::ids(&[7, 8])),
        ]);
        assert_eq!(ok(&written.to_php_serialized()), written);
    }

    #[test]
    fn malformed_input_reports_offset() {
        let err = decode("a:2:{i:0;s:1:\"x\";}").unwrap_err();
        assert!(err.offset() > 0);
        assert!(decode("x:1;").is_err());
        assert!(decode("i:1;trailing").is_err());
        assert!(decode("").is_err());
    }

    fn nested(depth: usize) -> String {
        format!("{}N;{}", "a:1:{i:0;".repeat(depth), "}".repeat(depth))
    }

    #[test]
    fn nesting_depth_is_capped() {
        assert!(decode(&nested(MAX_DEPTH)).is_ok());

        let err = decode(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(err.message().contains("shallower array nesting"));
        assert!(decode(&nested(200_000)).is_err());
    }

    #[test]
    fn serialized_detection() {
        assert!(looks_serialized("a:0:{}"));
        assert!(looks_serialized("N;"));
        assert!(looks_serialized("s:3:\"yes\";"));
        assert!(!looks_serialized("yes"));
        assert!(!looks_serialized("12"));
        assert!(!looks_serialized("b:"));
    }
}
