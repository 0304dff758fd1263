//! Parsing of environment variable values.

use std::time::Duration;

use crate::validation::validate_threshold;

/// Parse a boolean flag: `true`/`1`/`yes` or `false`/`0`/`no`, any case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a positive whole number of seconds.
pub fn parse_secs(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Parse a deviation threshold in meters, within the range accepted on
/// trip requests.
pub fn parse_threshold(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|meters| validate_threshold(*meters).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("15"), Some(Duration::from_secs(15)));
        assert_eq!(parse_secs("0"), None);
        assert_eq!(parse_secs("-3"), None);
        assert_eq!(parse_secs("soon"), None);
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("45.5"), Some(45.5));
        assert_eq!(parse_threshold("1000"), Some(1000.0));
        assert_eq!(parse_threshold("1000.5"), None);
        assert_eq!(parse_threshold("0"), None);
        assert_eq!(parse_threshold("inf"), None);
        assert_eq!(parse_threshold("NaN"), None);
    }
}
