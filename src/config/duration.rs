//! # Duration Parsing
//!
//! Parses loop-period strings in the `10s`, `1m30s`, `500ms` form.

use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static DURATION_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:ms|s|m|h))+$").expect("duration format regex is valid")
});

static DURATION_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<number>\d+)(?P<unit>ms|s|m|h)").expect("duration part regex is valid")
});

/// Parse a duration string made of one or more `<number><unit>` parts
///
/// Units: `ms`, `s`, `m`, `h`. Parts are summed, so `1m30s` is 90 seconds.
/// A zero total is rejected because the controller would spin.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let trimmed = input.trim();
    let invalid = || ConfigError::InvalidDuration(trimmed.to_string());

    if !DURATION_FORMAT.is_match(trimmed) {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    for captures in DURATION_PART.captures_iter(trimmed) {
        let number: u64 = captures["number"].parse().map_err(|_| invalid())?;
        let part = match &captures["unit"] {
            "ms" => Duration::from_millis(number),
            "s" => Duration::from_secs(number),
            "m" => Duration::from_secs(number.checked_mul(60).ok_or_else(invalid)?),
            "h" => Duration::from_secs(number.checked_mul(3600).ok_or_else(invalid)?),
            _ => return Err(invalid()),
        };
        total = total.checked_add(part).ok_or_else(invalid)?;
    }

    if total.is_zero() {
        return Err(invalid());
    }

    Ok(total)
}
