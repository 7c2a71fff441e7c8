use url::Url;

use crate::error::{MusicFinderError, Result};

/// Centralized configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate an absolute http(s) URL
    pub fn validate_url(url: &str, field_name: &str) -> Result<()> {
        let parsed = Url::parse(url).map_err(|e| {
            MusicFinderError::Validation(format!("Invalid {} URL '{}': {}", field_name, url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MusicFinderError::Validation(format!(
                "{} URL must use http or https, got: {}",
                field_name, url
            )));
        }

        Ok(())
    }

    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if !(value >= min && value <= max) {
            return Err(MusicFinderError::Validation(format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(ConfigValidator::validate_url("https://api.lyrics.ovh/v1", "lyrics").is_ok());
        assert!(ConfigValidator::validate_url("http://127.0.0.1:8080", "lyrics").is_ok());
        assert!(ConfigValidator::validate_url("api.lyrics.ovh", "lyrics").is_err());
        assert!(ConfigValidator::validate_url("ftp://example.com", "lyrics").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(ConfigValidator::validate_range(5, 1, 10, "attempts").is_ok());
        assert!(ConfigValidator::validate_range(0, 1, 10, "attempts").is_err());
        assert!(ConfigValidator::validate_range(0.8, 0.0, 1.0, "threshold").is_ok());
        assert!(ConfigValidator::validate_range(f64::NAN, 0.0, 1.0, "threshold").is_err());
    }
}
