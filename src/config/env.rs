use std::env;
use std::str::FromStr;

use crate::error::{MusicFinderError, Result};

/// Environment variable configuration constants
pub struct EnvVars;

impl EnvVars {
    pub const LYRICS_BASE_URL: &'static str = "MUSICFINDER_LYRICS_BASE_URL";
    pub const VIDEO_SEARCH_URL: &'static str = "MUSICFINDER_VIDEO_SEARCH_URL";
    pub const HTTP_TIMEOUT_SECONDS: &'static str = "MUSICFINDER_HTTP_TIMEOUT_SECONDS";
    pub const MAX_ATTEMPTS: &'static str = "MUSICFINDER_MAX_ATTEMPTS";
    pub const CACHE_CAPACITY: &'static str = "MUSICFINDER_CACHE_CAPACITY";
    pub const CACHE_TTL_SECONDS: &'static str = "MUSICFINDER_CACHE_TTL_SECONDS";
    pub const FUZZY_THRESHOLD: &'static str = "MUSICFINDER_FUZZY_THRESHOLD";
}

/// Environment variable parsing utilities with validation
pub struct EnvParser;

impl EnvParser {
    /// Parse environment variable as string with validation
    pub fn parse_string(
        var_name: &str,
        validator: Option<fn(&str) -> Result<()>>,
    ) -> Result<Option<String>> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                if let Some(validate_fn) = validator {
                    validate_fn(&trimmed)?;
                }

                Ok(Some(trimmed))
            }
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(MusicFinderError::Validation(format!(
                "Environment variable {} contains invalid UTF-8",
                var_name
            ))),
        }
    }

    pub fn parse_u64(var_name: &str, min: u64, max: u64) -> Result<Option<u64>> {
        Self::parse_in_range(var_name, min, max)
    }

    pub fn parse_usize(var_name: &str, min: usize, max: usize) -> Result<Option<usize>> {
        Self::parse_in_range(var_name, min, max)
    }

    pub fn parse_f64(var_name: &str, min: f64, max: f64) -> Result<Option<f64>> {
        Self::parse_in_range(var_name, min, max)
    }

    /// Parse a number and check it lies within `min..=max`
    fn parse_in_range<T>(var_name: &str, min: T, max: T) -> Result<Option<T>>
    where
        T: FromStr + PartialOrd + std::fmt::Display + Copy,
    {
        let Some(value_str) = Self::parse_string(var_name, None)? else {
            return Ok(None);
        };

        let value = value_str.parse::<T>().map_err(|_| {
            MusicFinderError::Validation(format!(
                "Invalid number in {}: '{}'",
                var_name, value_str
            ))
        })?;

        // Also rejects NaN
        if !(value >= min && value <= max) {
            return Err(MusicFinderError::Validation(format!(
                "Value in {} must be between {} and {}, got {}",
                var_name, min, max, value
            )));
        }

        Ok(Some(value))
    }

    /// Get all MUSICFINDER environment variables for debugging
    pub fn get_all_musicfinder_vars() -> Vec<(String, String)> {
        env::vars()
            .filter(|(key, _)| key.starts_with("MUSICFINDER_"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_parse_u64() {
        env::set_var("TEST_U64_VALID", "42");
        env::set_var("TEST_U64_OUT_OF_RANGE", "150");
        env::set_var("TEST_U64_INVALID", "not_a_number");

        assert_eq!(EnvParser::parse_u64("TEST_U64_VALID", 1, 100).unwrap(), Some(42));
        assert!(EnvParser::parse_u64("TEST_U64_OUT_OF_RANGE", 1, 100).is_err());
        assert!(EnvParser::parse_u64("TEST_U64_INVALID", 1, 100).is_err());
        assert_eq!(EnvParser::parse_u64("TEST_U64_NOT_SET", 1, 100).unwrap(), None);

        env::remove_var("TEST_U64_VALID");
        env::remove_var("TEST_U64_OUT_OF_RANGE");
        env::remove_var("TEST_U64_INVALID");
    }

    #[test]
    fn test_parse_f64() {
        env::set_var("TEST_F64_VALID", "0.75");
        env::set_var("TEST_F64_OUT_OF_RANGE", "1.5");
        env::set_var("TEST_F64_NAN", "NaN");
        env::set_var("TEST_F64_BLANK", "   ");

        assert_eq!(EnvParser::parse_f64("TEST_F64_VALID", 0.0, 1.0).unwrap(), Some(0.75));
        assert!(EnvParser::parse_f64("TEST_F64_OUT_OF_RANGE", 0.0, 1.0).is_err());
        assert!(EnvParser::parse_f64("TEST_F64_NAN", 0.0, 1.0).is_err());
        assert_eq!(EnvParser::parse_f64("TEST_F64_BLANK", 0.0, 1.0).unwrap(), None);

        env::remove_var("TEST_F64_VALID");
        env::remove_var("TEST_F64_OUT_OF_RANGE");
        env::remove_var("TEST_F64_NAN");
        env::remove_var("TEST_F64_BLANK");
    }
}
