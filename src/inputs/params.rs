//! Query-string style parameter ingestion
//!
//! Callers hand over raw `key -> value` pairs (typically from a URL query
//! string). Every field falls back to its documented default when the key is
//! absent or the value does not parse to a finite number, so the engine only
//! ever sees fully-typed inputs.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::str::FromStr;

use log::warn;

use crate::error::{ModelError, Result};

/// Raw parameter map, first occurrence of a key wins
pub type ParamMap = HashMap<String, String>;

/// Reads typed fields out of a [`ParamMap`], with an optional key suffix
/// (e.g. `"Changed"` to read `repaymentRateChanged`)
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    params: &'a ParamMap,
    suffix: &'a str,
}

impl<'a> ParamReader<'a> {
    pub fn new(params: &'a ParamMap) -> Self {
        Self { params, suffix: "" }
    }

    pub fn with_suffix(params: &'a ParamMap, suffix: &'a str) -> Self {
        Self { params, suffix }
    }

    fn raw(&self, field: &str) -> Option<&'a str> {
        self.params
            .get(&format!("{}{}", field, self.suffix))
            .map(String::as_str)
    }

    /// Finite number, or `default` when absent/unparseable
    pub fn number(&self, field: &str, default: f64) -> f64 {
        match self.raw(field) {
            None => default,
            Some(raw) => match parse_finite(raw) {
                Some(value) => value,
                None => {
                    warn!("Ignoring non-numeric value {:?} for {}", raw, field);
                    default
                }
            },
        }
    }

    /// Whole-number field; fractional input is truncated toward zero
    pub fn integer(&self, field: &str, default: i32) -> i32 {
        match self.raw(field) {
            None => default,
            Some(raw) => match parse_finite(raw) {
                Some(value) if value >= i32::MIN as f64 && value <= i32::MAX as f64 => {
                    value.trunc() as i32
                }
                _ => {
                    warn!("Ignoring non-integer value {:?} for {}", raw, field);
                    default
                }
            },
        }
    }

    /// Whole-number field clamped into `range`
    pub fn integer_in(&self, field: &str, default: i32, range: RangeInclusive<i32>) -> i32 {
        let value = self.integer(field, default);
        let clamped = value.clamp(*range.start(), *range.end());
        if clamped != value {
            warn!("Clamping {} for {} into {}..={}", value, field, range.start(), range.end());
        }
        clamped
    }

    /// Parsed via `FromStr`, or `default` when absent/rejected
    pub fn choice<T: FromStr>(&self, field: &str, default: T) -> T {
        match self.raw(field) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring unsupported value {:?} for {}", raw, field);
                default
            }),
        }
    }
}

/// Empty and whitespace-only strings count as zero, mirroring how browsers
/// coerce query values to numbers
fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strict single-field parse for callers that want to reject bad input
pub fn parse_field<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ModelError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Split `a=1&b=2` (leading `?` allowed) into a [`ParamMap`]
pub fn parse_query_string(query: &str) -> ParamMap {
    let mut params = ParamMap::new();
    let query = query.strip_prefix('?').unwrap_or(query);

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(decode_component(key))
            .or_insert_with(|| decode_component(value));
    }

    params
}

/// Build `a=1&b=2` from ordered pairs
pub fn to_query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Format a number the way it should round-trip through a query string
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("?startingSalary=30000&balanceMode=starting-balance&x=a+b%21");
        assert_eq!(params.get("startingSalary").map(String::as_str), Some("30000"));
        assert_eq!(params.get("balanceMode").map(String::as_str), Some("starting-balance"));
        assert_eq!(params.get("x").map(String::as_str), Some("a b!"));
    }

    #[test]
    fn test_first_key_wins() {
        let params = parse_query_string("a=1&a=2");
        assert_eq!(params.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_reader_falls_back_on_bad_numbers() {
        let params = parse_query_string("a=abc&b=Infinity&c=0.5&d=2019.9");
        let reader = ParamReader::new(&params);
        assert_eq!(reader.number("a", 7.0), 7.0);
        assert_eq!(reader.number("b", 7.0), 7.0);
        assert_eq!(reader.number("c", 7.0), 0.5);
        assert_eq!(reader.number("missing", 7.0), 7.0);
        assert_eq!(reader.integer("d", 1), 2019);
    }

    #[test]
    fn test_integer_in_clamps() {
        let params = parse_query_string("big=2147483647&small=-3&ok=4&bad=x");
        let reader = ParamReader::new(&params);
        assert_eq!(reader.integer_in("big", 3, 0..=10), 10);
        assert_eq!(reader.integer_in("small", 3, 0..=10), 0);
        assert_eq!(reader.integer_in("ok", 3, 0..=10), 4);
        assert_eq!(reader.integer_in("bad", 3, 0..=10), 3);
    }

    #[test]
    fn test_suffix_lookup() {
        let params = parse_query_string("rateChanged=0.1&rate=0.2");
        let reader = ParamReader::with_suffix(&params, "Changed");
        assert_eq!(reader.number("rate", 0.0), 0.1);
    }

    #[test]
    fn test_strict_parse() {
        let ok: i32 = parse_field("graduationYear", "2018").unwrap();
        assert_eq!(ok, 2018);
        let err = parse_field::<i32>("graduationYear", "soon").unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { .. }));
    }

    #[test]
    fn test_query_string_round_trip_of_special_characters() {
        let pairs = vec![("note".to_string(), "a b&c".to_string())];
        let query = to_query_string(&pairs);
        assert_eq!(query, "note=a+b%26c");
        let parsed = parse_query_string(&query);
        assert_eq!(parsed.get("note").map(String::as_str), Some("a b&c"));
    }
}
