//! Human-readable durations for configuration, like "365d", "52w", "30s".

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, de};
use std::time::Duration;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Parses a duration string.
///
/// Supported units: `s` seconds, `m` minutes, `h` hours, `d` days, `w` weeks
/// and `y` years (365 days). Case-insensitive, surrounding whitespace is
/// ignored.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let Some(unit) = s.chars().last() else {
        bail!("Duration is empty");
    };

    let multiplier = match unit {
        's' => 1,
        'm' => SECS_PER_MINUTE,
        'h' => SECS_PER_HOUR,
        'd' => SECS_PER_DAY,
        'w' => 7 * SECS_PER_DAY,
        'y' => 365 * SECS_PER_DAY,
        _ => bail!("Duration '{}' must end with s, m, h, d, w or y", s),
    };

    let num: u64 = s[..s.len() - 1]
        .parse()
        .with_context(|| format!("Invalid number in duration '{s}'"))?;
    let secs = num
        .checked_mul(multiplier)
        .context("Duration is too large")?;

    Ok(Duration::from_secs(secs))
}

/// Use with `#[serde(deserialize_with = "deserialize_duration")]`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}
