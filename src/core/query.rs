//! Query sanitization
//!
//! Every artist/song pair is normalized here before it can reach a provider
//! or a cache key. Normalization is NFKC so visually identical input in
//! different Unicode encodings collapses to one canonical string. Case is
//! preserved.

use std::fmt;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::error::ValidationError;

/// Longest accepted field, in characters, after normalization.
pub const MAX_FIELD_LENGTH: usize = 200;

/// Punctuation allowed in addition to letters, digits and space.
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', '\'', '(', ')', '-'];

/// Validate and normalize one raw query field.
pub fn sanitize(value: Option<&str>, field_name: &str) -> Result<String, ValidationError> {
    let raw = value.ok_or_else(|| ValidationError::Missing {
        field: field_name.to_string(),
    })?;

    // Checked on the raw value so leading/trailing control characters are not trimmed away
    if raw.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter {
            field: field_name.to_string(),
        });
    }

    let normalized: String = raw.trim().nfkc().collect();
    let normalized = normalized.trim();

    if normalized.is_empty() {
        return Err(ValidationError::Empty {
            field: field_name.to_string(),
        });
    }

    if normalized.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong {
            field: field_name.to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    if let Some(character) = normalized.chars().find(|c| !is_permitted(*c)) {
        return Err(ValidationError::DisallowedCharacter {
            field: field_name.to_string(),
            character,
        });
    }

    Ok(normalized.to_string())
}

fn is_permitted(c: char) -> bool {
    c.is_alphabetic()
        || is_combining_mark(c)
        || c.is_ascii_digit()
        || c == ' '
        || ALLOWED_PUNCTUATION.contains(&c)
}

// Marks that NFKC cannot fold into a precomposed letter (Devanagari vowel signs etc.)
fn is_combining_mark(c: char) -> bool {
    unicode_normalization::char::is_combining_mark(c)
}

/// A sanitized artist/song pair.
///
/// Fields are private: the only way to build a `Query` is through
/// [`Query::new`], which runs both fields through [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Query {
    artist: String,
    song: String,
}

impl Query {
    pub fn new(artist: &str, song: &str) -> Result<Self, ValidationError> {
        Self::from_parts(Some(artist), Some(song))
    }

    /// Build from possibly absent fields, as received from an outer request.
    pub fn from_parts(artist: Option<&str>, song: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            artist: sanitize(artist, "artist")?,
            song: sanitize(song, "song")?,
        })
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn song(&self) -> &str {
        &self.song
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.song)
    }
}
