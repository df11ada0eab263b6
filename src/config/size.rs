//! Human-readable byte sizes

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::sync::LazyLock;

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(?:([kmgt])(i?)(b?)|(b))?\s*$")
        .expect("size pattern is valid")
});

/// Parse a byte size such as `4096`, `512KiB`, `64 MB` or `1.5G`
///
/// Units are case-insensitive. A bare prefix (`K`, `M`, ...) and the `iB`
/// forms are binary (powers of 1024); the `B` forms (`KB`, `MB`, ...) are
/// decimal (powers of 1000). Fractions are truncated to whole bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidSize`] if the text is not a size.
///
/// # Example
///
/// ```rust
/// use rescache::parse_size;
///
/// assert_eq!(parse_size("512KiB").unwrap(), 512 * 1024);
/// assert_eq!(parse_size("64 MB").unwrap(), 64_000_000);
/// assert_eq!(parse_size("1.5G").unwrap(), 3 * 512 * 1024 * 1024);
/// ```
pub fn parse_size(text: &str) -> Result<u64> {
    let invalid = || Error::InvalidSize(text.to_string());
    let lowered = text.to_ascii_lowercase();
    let caps = SIZE_PATTERN.captures(&lowered).ok_or_else(invalid)?;

    let number = &caps[1];
    let multiplier: u64 = match caps.get(2) {
        None => 1,
        Some(prefix) => {
            let binary = !caps[3].is_empty() || caps[4].is_empty();
            let base: u64 = if binary { 1024 } else { 1000 };
            let exponent = match prefix.as_str() {
                "k" => 1,
                "m" => 2,
                "g" => 3,
                _ => 4,
            };
            base.pow(exponent)
        }
    };

    if let Ok(whole) = number.parse::<u64>() {
        return whole.checked_mul(multiplier).ok_or_else(invalid);
    }

    let value = number.parse::<f64>().map_err(|_| invalid())? * multiplier as f64;
    if !value.is_finite() || value >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(value as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Bytes(u64),
    Text(String),
}

/// Deserialize a byte size from a number or a human-readable string
pub(crate) fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeRepr::deserialize(deserializer)? {
        SizeRepr::Bytes(bytes) => Ok(bytes),
        SizeRepr::Text(text) => parse_size(&text).map_err(serde::de::Error::custom),
    }
}
