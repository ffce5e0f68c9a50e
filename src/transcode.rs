//! Text encoding normalization for downloaded subtitles
//!
//! The catalog serves subtitle files in whatever encoding the uploader used,
//! which for Hungarian releases is usually ISO-8859-2. Downloads are
//! converted to UTF-8 before they are handed to the caller.

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Error returned when parsing an unknown source encoding name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown source encoding '{0}', expected one of: latin1, latin2, utf8")]
pub struct UnknownEncodingError(pub String);

/// The encoding downloaded subtitle files are assumed to be in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    /// ISO-8859-1 (Western European)
    Latin1,
    /// ISO-8859-2 (Central European), the catalog's native encoding
    #[default]
    Latin2,
    /// UTF-8
    Utf8,
}

impl SourceEncoding {
    /// Returns the code page name of this encoding
    pub fn code_page_name(self) -> &'static str {
        match self {
            SourceEncoding::Latin1 => "iso-8859-1",
            SourceEncoding::Latin2 => "iso-8859-2",
            SourceEncoding::Utf8 => "utf-8",
        }
    }

    /// The table-driven decoder for this encoding.
    ///
    /// `None` for ISO-8859-1: encoding_rs resolves that label to windows-1252,
    /// which remaps 0x80-0x9F, so Latin-1 is decoded byte for byte instead.
    fn decoder(self) -> Option<&'static Encoding> {
        match self {
            SourceEncoding::Latin1 => None,
            SourceEncoding::Latin2 => Some(encoding_rs::ISO_8859_2),
            SourceEncoding::Utf8 => Some(encoding_rs::UTF_8),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_page_name())
    }
}

impl FromStr for SourceEncoding {
    type Err = UnknownEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latin1" | "iso-8859-1" => Ok(SourceEncoding::Latin1),
            "latin2" | "iso-8859-2" => Ok(SourceEncoding::Latin2),
            "utf8" | "utf-8" => Ok(SourceEncoding::Utf8),
            _ => Err(UnknownEncodingError(s.to_string())),
        }
    }
}

/// Converts raw subtitle bytes from `source` into UTF-8
///
/// Byte sequences that are invalid in the source encoding are replaced with
/// U+FFFD rather than failing the download. A byte order mark is kept as
/// content, not interpreted.
pub fn transcode_to_utf8(bytes: &[u8], source: SourceEncoding) -> Vec<u8> {
    let text = match source.decoder() {
        Some(encoding) => {
            let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors {
                warn!(
                    encoding = source.code_page_name(),
                    "Subtitle contained bytes that are invalid in the source encoding"
                );
            }
            text
        }
        // Every byte is the code point of the same value
        None => encoding_rs::mem::decode_latin1(bytes),
    };

    text.into_owned().into_bytes()
}
