//! Timeout configuration carrier.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A timeout that is either undefined or a literal duration.
///
/// Keeping "no timeout configured" distinct from "zero timeout" lets
/// configuration layers merge values without magic numbers: a component
/// applies its own default only where the setting is
/// [`undefined`](Self::undefined).
///
/// The wire format is `"undefined"` or the literal milliseconds with an
/// `ms` suffix, e.g. `"5000ms"`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagate_types::Timeout;
///
/// let configured = Timeout::from_duration(Duration::from_secs(5));
/// assert_eq!(configured.get_or(Duration::ZERO), Duration::from_secs(5));
/// assert_eq!(configured.to_string(), "5000ms");
///
/// let unset = Timeout::undefined();
/// assert!(!unset.is_defined());
/// assert_eq!(unset.get_or(Duration::from_secs(30)), Duration::from_secs(30));
/// assert_eq!(unset.or_if_undefined(configured), configured);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeout {
    millis: Option<u64>,
}

impl Timeout {
    /// Returns a timeout with no defined value.
    #[must_use]
    pub fn undefined() -> Self {
        Self { millis: None }
    }

    /// Creates a defined timeout from a duration, truncated to
    /// millisecond precision.
    #[must_use]
    pub fn from_duration(value: Duration) -> Self {
        Self {
            millis: Some(value.as_millis().min(u128::from(u64::MAX)) as u64),
        }
    }

    /// Creates a defined timeout from literal milliseconds.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self {
            millis: Some(millis),
        }
    }

    /// Returns `true` if this timeout has a defined value.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.millis.is_some()
    }

    /// Returns the configured duration, or the fallback when undefined.
    #[must_use]
    pub fn get_or(&self, fallback: Duration) -> Duration {
        self.millis.map_or(fallback, Duration::from_millis)
    }

    /// Returns this timeout if defined, the given alternative otherwise.
    #[must_use]
    pub fn or_if_undefined(self, fallback: Self) -> Self {
        if self.is_defined() {
            self
        } else {
            fallback
        }
    }
}

impl std::fmt::Display for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.millis {
            Some(ms) => write!(f, "{ms}ms"),
            None => f.write_str("undefined"),
        }
    }
}

impl std::str::FromStr for Timeout {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text == "undefined" {
            return Ok(Self::undefined());
        }
        let digits = text
            .strip_suffix("ms")
            .ok_or_else(|| format!("'{text}' is not a timeout value"))?;
        digits
            .parse::<u64>()
            .map(Self::from_millis)
            .map_err(|_| format!("'{text}' is not a timeout value"))
    }
}

impl TryFrom<String> for Timeout {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeout> for String {
    fn from(value: Timeout) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_falls_back() {
        let timeout = Timeout::undefined();
        assert!(!timeout.is_defined());
        assert_eq!(timeout.get_or(Duration::from_millis(7)), Duration::from_millis(7));
    }

    #[test]
    fn defined_keeps_value() {
        let timeout = Timeout::from_millis(2500);
        assert!(timeout.is_defined());
        assert_eq!(timeout.get_or(Duration::ZERO), Duration::from_millis(2500));
    }

    #[test]
    fn fallback_combinator() {
        let fallback = Timeout::from_millis(100);
        assert_eq!(Timeout::undefined().or_if_undefined(fallback), fallback);
        let set = Timeout::from_millis(1);
        assert_eq!(set.or_if_undefined(fallback), set);
    }

    #[test]
    fn string_round_trip() {
        for text in ["undefined", "0ms", "5000ms"] {
            let parsed: Timeout = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_text() {
        assert!("5s".parse::<Timeout>().is_err());
        assert!("ms".parse::<Timeout>().is_err());
        assert!("".parse::<Timeout>().is_err());
    }

    #[test]
    fn serde_uses_string_format() {
        let timeout = Timeout::from_millis(42);
        assert_eq!(serde_json::to_string(&timeout).unwrap(), "\"42ms\"");
        let back: Timeout = serde_json::from_str("\"undefined\"").unwrap();
        assert_eq!(back, Timeout::undefined());
    }
}
