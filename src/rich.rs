//! Printable, comparable, unit-aware values.
//!
//! A [`Rich`] wraps one scalar of a table cell together with how it should be
//! shown (alignment, color, precision). Converting input never fails: data that
//! cannot be read as a number is kept as text and reported by
//! [`Rich::is_numeric`], so placeholders like `N/A` survive into the output.

use std::{cmp::Ordering, fmt};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{duration, memory};

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<usize> for Scalar {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Scalar::Float(value as f64), Scalar::Int)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Text(value.clone())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// The kind of a value together with its (normalized) data.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    String(String),
    Integer(Scalar),
    Float { raw: Scalar, precision: usize },
    /// Whole seconds once parsed.
    Duration { raw: Scalar, precision: Option<usize> },
    /// Whole bytes once parsed.
    Memory { raw: Scalar, precision: Option<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rich {
    value: Value,
    pub width: Option<usize>,
    pub align: Align,
    /// ANSI SGR code such as `1;32`; empty means uncolored.
    pub color: String,
    /// Stand-in when a non-numeric value has to act as a number.
    pub dummy: f64,
}

impl Rich {
    fn new(value: Value) -> Self {
        Rich {
            value,
            width: None,
            align: Align::Left,
            color: String::new(),
            dummy: 0.0,
        }
    }

    pub fn string(data: impl fmt::Display) -> Self {
        Rich::new(Value::String(data.to_string()))
    }

    pub fn integer(data: impl Into<Scalar>) -> Self {
        let raw = match data.into() {
            Scalar::Float(value) => Scalar::Int(value as i64),
            Scalar::Text(text) => match text.trim().parse::<i64>() {
                Ok(value) => Scalar::Int(value),
                Err(_) => Scalar::Text(text),
            },
            raw => raw,
        };
        Rich::new(Value::Integer(raw))
    }

    pub fn float(data: impl Into<Scalar>) -> Self {
        let raw = match data.into() {
            Scalar::Int(value) => Scalar::Float(value as f64),
            Scalar::Text(text) => match text.trim().parse::<f64>() {
                Ok(value) => Scalar::Float(value),
                Err(_) => Scalar::Text(text),
            },
            raw => raw,
        };
        Rich::new(Value::Float { raw, precision: 2 })
    }

    pub fn duration(data: impl Into<Scalar>) -> Self {
        let raw = match data.into() {
            Scalar::Float(value) => Scalar::Int(value as i64),
            Scalar::Text(text) => match duration::as_seconds(&text) {
                Some(seconds) => Scalar::Int(seconds),
                None => Scalar::Text(text),
            },
            raw => raw,
        };
        Rich::new(Value::Duration {
            raw,
            precision: None,
        })
    }

    pub fn memory(data: impl Into<Scalar>) -> Self {
        Rich::memory_in(data, 1)
    }

    /// Memory where plain numbers count in multiples of `unit` bytes.
    pub fn memory_in(data: impl Into<Scalar>, unit: i64) -> Self {
        let raw = match data.into() {
            Scalar::Int(value) => Scalar::Int(value.saturating_mul(unit)),
            Scalar::Float(value) => Scalar::Int((value * unit as f64) as i64),
            Scalar::Text(text) => match memory::as_bytes(&text, unit) {
                Some(bytes) => Scalar::Int(bytes),
                None => Scalar::Text(text),
            },
        };
        Rich::new(Value::Memory {
            raw,
            precision: None,
        })
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_dummy(mut self, dummy: f64) -> Self {
        self.dummy = dummy;
        self
    }

    /// Fixed number of decimals; ignored by strings and integers.
    pub fn with_precision(mut self, digits: usize) -> Self {
        match &mut self.value {
            Value::Float { precision, .. } => *precision = digits,
            Value::Duration { precision, .. } | Value::Memory { precision, .. } => {
                *precision = Some(digits)
            }
            Value::String(_) | Value::Integer(_) => {}
        }
        self
    }

    fn raw(&self) -> Option<&Scalar> {
        match &self.value {
            Value::String(_) => None,
            Value::Integer(raw)
            | Value::Float { raw, .. }
            | Value::Duration { raw, .. }
            | Value::Memory { raw, .. } => Some(raw),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.raw(), Some(Scalar::Int(_) | Scalar::Float(_)))
    }

    pub fn to_int(&self) -> i64 {
        match self.raw() {
            Some(Scalar::Int(value)) => *value,
            Some(Scalar::Float(value)) => *value as i64,
            _ => self.dummy as i64,
        }
    }

    pub fn to_float(&self) -> f64 {
        match self.raw() {
            Some(Scalar::Int(value)) => *value as f64,
            Some(Scalar::Float(value)) => *value,
            _ => self.dummy,
        }
    }

    /// Terminal cells taken by the unformatted text.
    pub fn display_width(&self) -> usize {
        self.to_string().width()
    }

    /// Text padded (and clipped) to the value's own width and alignment, colored.
    pub fn format(&self) -> String {
        self.format_with(self.width, self.align)
    }

    /// Like [`Rich::format`] with the width and alignment supplied by a layout.
    pub fn format_with(&self, width: Option<usize>, align: Align) -> String {
        let text = self.to_string();
        let body = match width {
            Some(width) => {
                let (clipped, used) = clip(&text, width);
                let padding = " ".repeat(width - used);
                match align {
                    Align::Left => clipped + &padding,
                    Align::Right => padding + &clipped,
                }
            }
            None => text,
        };
        if self.color.is_empty() {
            body
        } else {
            format!("\x1b[{}m{body}\x1b[0m", self.color)
        }
    }

    /// Sort order of two values.
    ///
    /// Numbers compare numerically. Data that is not numeric (text placeholders,
    /// plain strings) sorts before any number. Two non-numeric values compare by
    /// their text.
    pub fn compare(&self, other: &Rich) -> Ordering {
        match (self.raw(), other.raw()) {
            (Some(Scalar::Int(a)), Some(Scalar::Int(b))) => a.cmp(b),
            _ => match (self.is_numeric(), other.is_numeric()) {
                (true, true) => self.to_float().total_cmp(&other.to_float()),
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

// longest prefix of `text` that fits in `width` cells, and the cells it takes
fn clip(text: &str, width: usize) -> (String, usize) {
    let mut clipped = String::new();
    let mut used = 0;
    for c in text.chars() {
        let cells = c.width().unwrap_or(0);
        if used + cells > width {
            break;
        }
        clipped.push(c);
        used += cells;
    }
    (clipped, used)
}

impl fmt::Display for Rich {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(text) => f.write_str(text),
            Value::Integer(raw) => write!(f, "{raw}"),
            Value::Float {
                raw: Scalar::Float(value),
                precision,
            } => write!(f, "{value:.digits$}", digits = *precision),
            Value::Duration {
                raw: Scalar::Int(seconds),
                precision,
            } => f.write_str(&duration::as_human(*seconds, *precision)),
            Value::Memory {
                raw: Scalar::Int(bytes),
                precision,
            } => f.write_str(&memory::as_human(*bytes, *precision)),
            Value::Float { raw, .. } | Value::Duration { raw, .. } | Value::Memory { raw, .. } => {
                write!(f, "{raw}")
            }
        }
    }
}

impl From<&str> for Rich {
    fn from(value: &str) -> Self {
        Rich::string(value)
    }
}

impl From<String> for Rich {
    fn from(value: String) -> Self {
        Rich::new(Value::String(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_keeps_unparsable_text() {
        let pending = Rich::integer("N/A");
        assert!(!pending.is_numeric());
        assert_eq!(pending.to_string(), "N/A");
        assert_eq!(pending.to_int(), 0);
        assert_eq!(Rich::integer("N/A").with_dummy(7.0).to_float(), 7.0);

        assert!(Rich::integer(" 12 ").is_numeric());
        assert_eq!(Rich::integer(3.9).to_int(), 3);
        assert!(!Rich::string("12").is_numeric());
    }

    #[test]
    fn placeholders_stay_text() {
        let dash = Rich::duration("-");
        assert!(!dash.is_numeric());
        assert_eq!(dash.to_string(), "-");
        assert_eq!(Rich::duration("-5").to_int(), -5);
        assert_eq!(dash.compare(&Rich::duration("0")), Ordering::Less);
    }

    #[test]
    fn extreme_values_still_format() {
        assert!(Rich::duration("-1e30").to_string().ends_with('d'));
        assert!(Rich::memory("-1e30").to_string().ends_with('T'));
    }

    #[test]
    fn display_strings() {
        assert_eq!(Rich::float("3.14159").to_string(), "3.14");
        assert_eq!(Rich::float(2).with_precision(1).to_string(), "2.0");
        assert_eq!(Rich::duration("1-00:00:00").to_string(), "1.0d");
        assert_eq!(Rich::duration("01:30").to_string(), "1.5m");
        assert_eq!(Rich::duration("UNLIMITED").to_string(), "UNLIMITED");
        assert_eq!(Rich::duration(7200).with_precision(2).to_string(), "2.00h");
        assert_eq!(Rich::memory("4G").to_string(), "4.0G");
        assert_eq!(Rich::memory_in("64000", memory::MEGA).to_string(), "64G");
        assert_eq!(Rich::memory("0").to_int(), 0);
    }

    #[test]
    fn normalized_raw_data() {
        assert_eq!(Rich::duration("1d").to_int(), 86400);
        assert_eq!(Rich::duration(12.9).to_int(), 12);
        assert_eq!(Rich::memory("1K").to_int(), 1000);
        assert_eq!(Rich::memory_in(3, memory::MEGA).to_int(), 3_000_000);
    }

    #[test]
    fn format_pads_clips_and_colors() {
        assert_eq!(Rich::string("abc").format(), "abc");
        assert_eq!(Rich::string("abc").with_width(5).format(), "abc  ");
        assert_eq!(
            Rich::string("abc").with_width(5).with_align(Align::Right).format(),
            "  abc"
        );
        assert_eq!(Rich::string("abcdef").with_width(4).format(), "abcd");
        assert_eq!(Rich::string("abc").with_width(0).format(), "");
        assert_eq!(
            Rich::string("ok").with_color("1;32").with_width(3).format(),
            "\x1b[1;32mok \x1b[0m"
        );
        assert_eq!(Rich::integer(42).format_with(Some(4), Align::Right), "  42");
    }

    #[test]
    fn wide_characters_count_as_two_cells() {
        let name = Rich::string("計算job");
        assert_eq!(name.display_width(), 7);
        assert_eq!(name.clone().with_width(9).format(), "計算job  ");
        assert_eq!(
            name.clone().with_width(9).with_align(Align::Right).format(),
            "  計算job"
        );
        // a wide character that would straddle the edge is left out
        assert_eq!(name.clone().with_width(3).format(), "計 ");
        assert_eq!(name.with_width(1).format(), " ");
    }

    #[test]
    fn display_does_not_depend_on_layout() {
        let value = Rich::memory("2G").with_width(1).with_color("1;31");
        assert_eq!(value.to_string(), "2.0G");
        assert_eq!(value.display_width(), 4);
    }

    #[test]
    fn numeric_ordering_within_a_variant() {
        let values = [-5, 0, 3, 10, 250];
        for a in values {
            for b in values {
                assert_eq!(Rich::integer(a).compare(&Rich::integer(b)), a.cmp(&b));
                assert_eq!(
                    Rich::duration(a).compare(&Rich::duration(b)),
                    a.cmp(&b),
                );
            }
        }
        assert_eq!(
            Rich::memory("2G").compare(&Rich::memory("500M")),
            Ordering::Greater
        );
        assert_eq!(Rich::float(1.5).compare(&Rich::float(1.25)), Ordering::Greater);
        // numerically, not by text
        assert_eq!(Rich::integer(9).compare(&Rich::integer(10)), Ordering::Less);
    }

    #[test]
    fn non_numeric_data_sorts_first() {
        let mut values = vec![
            Rich::integer(5),
            Rich::duration("N/A"),
            Rich::memory("1G"),
            Rich::integer("-"),
            Rich::float(0.5),
        ];
        values.sort_by(Rich::compare);
        let text: Vec<String> = values.iter().map(Rich::to_string).collect();
        assert_eq!(text, ["-", "N/A", "0.50", "5", "1.0G"]);
        assert!(!values[0].is_numeric());
        assert!(!values[1].is_numeric());
        assert!(values[2..].iter().all(Rich::is_numeric));
    }

    #[test]
    fn strings_compare_by_text() {
        assert_eq!(Rich::string("b").compare(&Rich::string("a")), Ordering::Greater);
        assert_eq!(Rich::string("10").compare(&Rich::string("9")), Ordering::Less);
    }
}
