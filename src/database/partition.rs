use chrono::{DateTime, Datelike};
use std::fmt;

/// Physical table holding one year/nation/satellite worth of telemetry,
/// named `{year}_{nation}_{satellite_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionName(String);

impl PartitionName {
    /// Derive the partition for a satellite at a timestamp in milliseconds.
    ///
    /// The year is the UTC calendar year of `timestamp_ms / 1000` seconds.
    /// Returns `None` only when that instant falls outside the representable
    /// calendar range, which callers treat the same as a missing table.
    pub fn resolve(nation: &str, satellite_id: u32, timestamp_ms: i64) -> Option<Self> {
        let year = DateTime::from_timestamp(timestamp_ms / 1000, 0)?.year();
        let name = format!("{}_{}_{}", year, nation, satellite_id);
        is_valid_partition_name(&name).then_some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier, safe to splice into SQL text
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate partition names before they reach SQL. Accepts
/// `<year>_<nation>_<satellite>` where year is an optionally negative
/// integer, nation is `[A-Za-z0-9]+` and satellite is `[0-9]+`.
pub fn is_valid_partition_name(name: &str) -> bool {
    let mut parts = name.splitn(3, '_');
    let (Some(year), Some(nation), Some(satellite)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let year_digits = year.strip_prefix('-').unwrap_or(year);
    !year_digits.is_empty()
        && year_digits.chars().all(|c| c.is_ascii_digit())
        && !nation.is_empty()
        && nation.chars().all(|c| c.is_ascii_alphanumeric())
        && !satellite.is_empty()
        && satellite.chars().all(|c| c.is_ascii_digit())
}
