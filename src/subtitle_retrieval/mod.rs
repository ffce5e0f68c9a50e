/// Subtitle search and download against the feliratok.eu catalog.
///
/// This module provides the data structures handed to callers, the error type
/// of the retrieval pipeline and the [`SubtitleRetriever`] that drives a
/// search or download from URL construction to the final result.
mod catalog_parser;
mod identifier;
mod query;
mod retriever;
mod title_matcher;

pub use catalog_parser::{SubtitleCandidate, parse_catalog_page};
pub use identifier::{IdentifierError, SubtitleIdentifier};
pub use query::{build_download_url, build_search_url};
pub use retriever::{DEFAULT_BASE_URL, SubtitleRetriever};
pub use title_matcher::title_matches;

use crate::http::TransportError;
use crate::language_map::LanguageError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Name reported as the provider of every search result
pub const PROVIDER_NAME: &str = "FeliratokEu";

/// The only subtitle format the catalog is queried for
pub const SUBTITLE_FORMAT: &str = "srt";

/// Date formats seen in the catalog's date column
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y. %m. %d.", "%Y/%m/%d"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Errors that can occur while searching or downloading subtitles.
#[derive(Debug, Error)]
pub enum SubtitleRetrievalError {
    /// The requested language has no catalog facet
    #[error("Language error: {0}")]
    Language(#[from] LanguageError),

    /// A subtitle identifier could not be decoded
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// The catalog could not be reached or answered with an error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The operation was cancelled while waiting for the catalog
    #[error("Operation cancelled")]
    Cancelled,
}

/// A single search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The title to search for
    pub title: String,
    /// ISO 639-1 code used to pick the catalog's language facet
    pub two_letter_language: String,
    /// ISO 639-2 code stamped on results and their identifiers
    pub three_letter_language: String,
    /// Whether results must match the title exactly
    pub exact_match: bool,
}

impl SearchQuery {
    pub fn new(
        title: impl Into<String>,
        two_letter_language: impl Into<String>,
        three_letter_language: impl Into<String>,
        exact_match: bool,
    ) -> Self {
        Self {
            title: title.into(),
            two_letter_language: two_letter_language.into(),
            three_letter_language: three_letter_language.into(),
            exact_match,
        }
    }
}

/// Publication date of a subtitle, when the catalog's date could be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PublishedDate {
    Known(NaiveDate),
    Unknown,
}

impl PublishedDate {
    /// Best-effort parse of the date column; anything unreadable is `Unknown`
    pub fn from_catalog(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return PublishedDate::Unknown;
        };

        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
            .or_else(|| {
                DATE_TIME_FORMATS.iter().find_map(|format| {
                    NaiveDateTime::parse_from_str(raw, format)
                        .ok()
                        .map(|date_time| date_time.date())
                })
            })
            .map_or(PublishedDate::Unknown, PublishedDate::Known)
    }
}

impl fmt::Display for PublishedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishedDate::Known(date) => f.pad(&date.to_string()),
            PublishedDate::Unknown => f.pad("unknown"),
        }
    }
}

/// A subtitle offered by the catalog for a search.
///
/// Only `id` is meant to be passed back in; the other fields are for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleInfo {
    /// Opaque identifier accepted by the download path
    pub id: String,
    /// Title as shown by the catalog
    pub display_name: Option<String>,
    pub provider_name: &'static str,
    /// ISO 639-2 language code
    pub language_code: String,
    pub published_date: PublishedDate,
    pub format: &'static str,
    /// Secondary title line, usually the original title and release name
    pub comment: Option<String>,
}

/// A downloaded subtitle file, converted to UTF-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedSubtitle {
    /// UTF-8 encoded subtitle content
    pub content: Vec<u8>,
    pub format: &'static str,
    /// ISO 639-2 language code taken from the identifier
    pub language_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_date_formats() {
        let expected = PublishedDate::Known(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        for raw in [
            "2024-05-01",
            " 2024-05-01 ",
            "2024.05.01",
            "2024. 05. 01.",
            "2024/05/01",
            "2024-05-01 13:45:00",
            "2024-05-01 13:45",
        ] {
            assert_eq!(PublishedDate::from_catalog(Some(raw)), expected, "{raw}");
        }
    }

    #[test]
    fn test_unreadable_date_is_unknown() {
        assert_eq!(PublishedDate::from_catalog(None), PublishedDate::Unknown);
        assert_eq!(PublishedDate::from_catalog(Some("")), PublishedDate::Unknown);
        assert_eq!(PublishedDate::from_catalog(Some("tegnap")), PublishedDate::Unknown);
        assert_eq!(PublishedDate::from_catalog(Some("2024-13-40")), PublishedDate::Unknown);
    }

    #[test]
    fn test_published_date_display_and_json() {
        let known = PublishedDate::Known(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(known.to_string(), "2024-05-01");
        assert_eq!(PublishedDate::Unknown.to_string(), "unknown");
        assert_eq!(serde_json::to_string(&known).unwrap(), "\"2024-05-01\"");
        assert_eq!(serde_json::to_string(&PublishedDate::Unknown).unwrap(), "null");
    }
}
