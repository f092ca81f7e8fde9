//! Destination normalization for the outbound send path.

use serde::{Deserialize, Serialize};

/// Outbound send configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    /// Country code prepended when the destination has no `+` prefix.
    pub default_country_code: String,
    /// Transport-specific address suffix.
    pub address_suffix: String,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            default_country_code: "+1".into(),
            address_suffix: "@c.us".into(),
        }
    }
}

/// Normalize a destination into a transport address.
///
/// Keeps digits and one leading `+`, prepends the default country code when
/// no `+` is present, then appends the address suffix. Idempotent: feeding
/// the output back in yields the same address.
#[must_use]
pub fn normalize_destination(raw: &str, config: &SendConfig) -> String {
    let mut digits = String::new();
    let mut has_plus = false;
    for ch in raw.trim().chars() {
        if ch == '+' && !has_plus && digits.is_empty() {
            has_plus = true;
        } else if ch.is_ascii_digit() {
            digits.push(ch);
        }
    }

    let mut address = String::from("+");
    if !has_plus {
        for ch in config.default_country_code.chars() {
            if ch.is_ascii_digit() {
                address.push(ch);
            }
        }
    }
    address.push_str(&digits);
    address.push_str(&config.address_suffix);
    address
}
