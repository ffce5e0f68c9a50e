//! Opaque subtitle identifiers
//!
//! Search results hand out a single string per subtitle which the caller later
//! passes back to download it. The string is `<format>-<language>-<catalog id>`,
//! e.g. `srt-eng-998877`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the three identifier segments
const DELIMITER: char = '-';

/// Errors that can occur while encoding or decoding an identifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The string does not consist of three non-empty segments
    #[error("Malformed subtitle identifier: '{0}'")]
    MalformedIdentifier(String),

    /// A segment is empty or contains the delimiter and could not be decoded again
    #[error("Invalid {segment} for a subtitle identifier: '{value}'")]
    InvalidSegment {
        segment: &'static str,
        value: String,
    },
}

/// The decoded form of a subtitle identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleIdentifier {
    format: String,
    language: String,
    catalog_id: String,
}

impl SubtitleIdentifier {
    /// Builds an identifier from its parts.
    ///
    /// Every segment must be non-empty and free of `-`, otherwise the encoded
    /// string would not split back into the same three parts.
    pub fn new(
        format: impl Into<String>,
        language: impl Into<String>,
        catalog_id: impl Into<String>,
    ) -> Result<Self, IdentifierError> {
        let identifier = Self {
            format: format.into(),
            language: language.into(),
            catalog_id: catalog_id.into(),
        };

        for (segment, value) in [
            ("format", &identifier.format),
            ("language", &identifier.language),
            ("catalog id", &identifier.catalog_id),
        ] {
            if value.is_empty() || value.contains(DELIMITER) {
                return Err(IdentifierError::InvalidSegment {
                    segment,
                    value: value.clone(),
                });
            }
        }

        Ok(identifier)
    }

    /// Decodes an identifier previously produced by [`SubtitleIdentifier::encode`]
    pub fn decode(id: &str) -> Result<Self, IdentifierError> {
        let malformed = || IdentifierError::MalformedIdentifier(id.to_string());

        let segments: Vec<&str> = id.split(DELIMITER).collect();
        let [format, language, catalog_id] = segments.as_slice() else {
            return Err(malformed());
        };

        Self::new(*format, *language, *catalog_id).map_err(|_| malformed())
    }

    /// Encodes the identifier into its string form
    pub fn encode(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.format, self.language, self.catalog_id
        )
    }

    /// The subtitle format tag, e.g. "srt"
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The three-letter language code
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The catalog's own id for the subtitle file
    pub fn catalog_id(&self) -> &str {
        &self.catalog_id
    }
}

impl fmt::Display for SubtitleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SubtitleIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
