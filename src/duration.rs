//! Conversions between seconds and the textual durations used by the scheduler.
//!
//! Accepted input, tried in order:
//!
//! * `D-HH:MM:SS` (the clock part may be shortened from the left, e.g. `1-05:00`),
//! * `HH:MM:SS` or `MM:SS`,
//! * a number with a unit suffix (`s`, `m`, `h`, `d`, `w`, `M`, `y`),
//! * a bare number of seconds.

use std::sync::OnceLock;

use regex::Regex;

pub const MINUTE: i64 = 60;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;
pub const WEEK: i64 = 7 * DAY;
// month and year are counted in weeks: 31 and 365 of them
pub const MONTH: i64 = 31 * WEEK;
pub const YEAR: i64 = 365 * WEEK;

const LADDER: [(i64, &str); 4] = [(DAY, "d"), (HOUR, "h"), (MINUTE, "m"), (1, "s")];

fn slurm_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)-(\d+(?::\d+){0,2})$").unwrap())
}

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(?::\d+){1,2}$").unwrap())
}

fn unit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d*\.?\d*)([a-zA-Z])$").unwrap())
}

/// Number of seconds in `text`, or `None` if it matches none of the accepted forms.
pub fn as_seconds(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Some(caps) = slurm_pattern().captures(text) {
        let days = field(&caps[1])?;
        return clock(&caps[2])?.checked_add(days.checked_mul(DAY)?);
    }

    if clock_pattern().is_match(text) {
        return clock(text);
    }

    if let Some(caps) = unit_pattern().captures(text) {
        let size = match &caps[2] {
            "s" => 1,
            "m" => MINUTE,
            "h" => HOUR,
            "d" => DAY,
            "w" => WEEK,
            "M" => MONTH,
            "y" => YEAR,
            _ => return None,
        };
        let value: f64 = caps[1].parse().ok()?;
        return Some((value * size as f64) as i64);
    }

    match text.parse::<i64>() {
        Ok(seconds) => Some(seconds),
        Err(_) => text.parse::<f64>().ok().filter(|x| x.is_finite()).map(|x| x as i64),
    }
}

// "HH:MM:SS", "MM:SS" or "SS", filled from the right
fn clock(text: &str) -> Option<i64> {
    let mut hms = [0i64; 3];
    for (slot, part) in hms.iter_mut().rev().zip(text.split(':').rev()) {
        *slot = field(part)?;
    }
    hms[0]
        .checked_mul(HOUR)?
        .checked_add(hms[1].checked_mul(MINUTE)?)?
        .checked_add(hms[2])
}

fn field(text: &str) -> Option<i64> {
    if text.is_empty() {
        return Some(0);
    }
    text.parse().ok()
}

/// Render `value` followed by `unit`.
///
/// Without an explicit precision small magnitudes (below 10) get one decimal and
/// everything else is rounded to a whole number.
pub fn with_unit(value: f64, unit: &str, precision: Option<usize>) -> String {
    match precision {
        Some(precision) => format!("{value:.precision$}{unit}"),
        None if value.round().abs() < 10.0 => format!("{value:.1}{unit}"),
        None => format!("{:.0}{unit}", value.round()),
    }
}

/// Express `seconds` in the largest of days, hours, minutes or seconds that it reaches.
pub fn as_human(seconds: i64, precision: Option<usize>) -> String {
    for (size, unit) in LADDER {
        if seconds.unsigned_abs() >= size.unsigned_abs() {
            return with_unit(seconds as f64 / size as f64, unit, precision);
        }
    }
    with_unit(seconds as f64, "s", precision)
}

/// Fixed `D-HH:MM:SS` format expected by the scheduler.
pub fn as_slurm(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    let day = DAY as u64;
    let hour = HOUR as u64;
    let minute = MINUTE as u64;
    format!(
        "{sign}{}-{:02}:{:02}:{:02}",
        total / day,
        total % day / hour,
        total % hour / minute,
        total % minute
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_forms() {
        assert_eq!(as_seconds("1d"), Some(86400));
        assert_eq!(as_seconds("1-00:00:00"), Some(86400));
        assert_eq!(as_seconds("24:00:00"), Some(86400));
        assert_eq!(as_seconds("90"), Some(90));
    }

    #[test]
    fn slurm_strings() {
        assert_eq!(as_seconds("1-00:00:01"), Some(DAY + 1));
        assert_eq!(as_seconds("1-00:02:01"), Some(DAY + 1 + 2 * MINUTE));
        assert_eq!(as_seconds("1-03:02:01"), Some(DAY + 1 + 2 * MINUTE + 3 * HOUR));
        assert_eq!(as_seconds("3-00:00:00"), Some(3 * DAY));
        assert_eq!(as_seconds("2-05"), Some(2 * DAY + 5));
        assert_eq!(as_seconds("2-05:00"), Some(2 * DAY + 5 * MINUTE));
    }

    #[test]
    fn clock_strings() {
        assert_eq!(as_seconds("00:00:00"), Some(0));
        assert_eq!(as_seconds("03:02:01"), Some(1 + 2 * MINUTE + 3 * HOUR));
        assert_eq!(as_seconds("27:14:11"), Some(11 + 14 * MINUTE + 27 * HOUR));
        assert_eq!(as_seconds("00:01"), Some(1));
        assert_eq!(as_seconds("02:01"), Some(1 + 2 * MINUTE));
        assert_eq!(as_seconds("27:01"), Some(1 + 27 * MINUTE));
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(as_seconds("2s"), Some(2));
        assert_eq!(as_seconds("1.5m"), Some(90));
        assert_eq!(as_seconds("3h"), Some(3 * HOUR));
        assert_eq!(as_seconds("2w"), Some(14 * DAY));
        assert_eq!(as_seconds("1M"), Some(60 * 60 * 24 * 7 * 31));
        assert_eq!(as_seconds("1y"), Some(60 * 60 * 24 * 7 * 365));
        assert_eq!(as_seconds("3x"), None);
    }

    #[test]
    fn bare_numbers_truncate() {
        assert_eq!(as_seconds("1.7"), Some(1));
        assert_eq!(as_seconds(" 12 "), Some(12));
        assert_eq!(as_seconds("-5"), Some(-5));
        assert_eq!(as_seconds("-1e30"), Some(i64::MIN));
    }

    #[test]
    fn dashes_need_digits_around_them() {
        assert_eq!(as_seconds("-"), None);
        assert_eq!(as_seconds("1-"), None);
        assert_eq!(as_seconds("-05:00"), None);
        assert_eq!(as_seconds("1-05:"), None);
        assert_eq!(as_seconds(":"), None);
        assert_eq!(as_seconds("1::2"), None);
    }

    #[test]
    fn unparsable() {
        assert_eq!(as_seconds("N/A"), None);
        assert_eq!(as_seconds("UNLIMITED"), None);
        assert_eq!(as_seconds(""), None);
    }

    #[test]
    fn human() {
        assert_eq!(as_human(0, None), "0.0s");
        assert_eq!(as_human(30, None), "30s");
        assert_eq!(as_human(90, None), "1.5m");
        assert_eq!(as_human(2 * HOUR, None), "2.0h");
        assert_eq!(as_human(36 * HOUR, None), "1.5d");
        assert_eq!(as_human(20 * DAY, None), "20d");
        assert_eq!(as_human(90, Some(2)), "1.50m");
        assert_eq!(as_human(-90, None), "-1.5m");
        assert!(as_human(i64::MIN, None).ends_with('d'));
    }

    #[test]
    fn slurm_round_trip() {
        for seconds in [0, 1, 59, 60, 3599, 3600, 86399, 86400, 90061, 10 * DAY + 7] {
            assert_eq!(as_seconds(&as_slurm(seconds)), Some(seconds));
        }
        assert_eq!(as_slurm(90061), "1-01:01:01");
        assert_eq!(as_slurm(0), "0-00:00:00");
    }
}
