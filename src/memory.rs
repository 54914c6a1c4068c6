//! Conversions between bytes and memory strings such as `4G`.
//!
//! Units are decimal (`K` = 1e3, ..., `T` = 1e12).

use std::sync::OnceLock;

use regex::Regex;

use crate::duration::with_unit;

pub const KILO: i64 = 1_000;
pub const MEGA: i64 = 1_000_000;
pub const GIGA: i64 = 1_000_000_000;
pub const TERA: i64 = 1_000_000_000_000;

const LADDER: [(i64, &str); 5] = [(TERA, "T"), (GIGA, "G"), (MEGA, "M"), (KILO, "K"), (1, "B")];

fn unit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d*\.?\d*)([a-zA-Z])$").unwrap())
}

/// Number of bytes in `text`.
///
/// A plain number is multiplied by `default_unit` (sinfo, for example, reports
/// megabytes). Returns `None` when nothing can be made of the input.
pub fn as_bytes(text: &str, default_unit: i64) -> Option<i64> {
    let text = text.trim();

    if let Some(caps) = unit_pattern().captures(text) {
        let size = match &caps[2] {
            "T" => Some(TERA),
            "G" => Some(GIGA),
            "M" => Some(MEGA),
            "K" => Some(KILO),
            "B" => Some(1),
            _ => None,
        };
        if let Some(size) = size {
            let value: f64 = caps[1].parse().ok()?;
            return Some((value * size as f64) as i64);
        }
    }

    text.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(|x| (x * default_unit as f64) as i64)
}

/// Express `bytes` in the largest unit it reaches.
pub fn as_human(bytes: i64, precision: Option<usize>) -> String {
    for (size, unit) in LADDER {
        if bytes.unsigned_abs() >= size.unsigned_abs() {
            return with_unit(bytes as f64 / size as f64, unit, precision);
        }
    }
    with_unit(bytes as f64, "B", precision)
}

/// Scheduler notation: a unit suffix only when the count is a whole number of that unit.
pub fn as_slurm(bytes: i64) -> String {
    if bytes == 0 {
        return "0".to_string();
    }
    for (size, unit) in LADDER.iter().take(4) {
        if bytes % size == 0 {
            return format!("{}{unit}", bytes / size);
        }
    }
    bytes.to_string()
}
