//! Character encoding of decoder logs and subtitle output
//!
//! The decoder writes grid rows in the code page it was told to use; the
//! same code page is used for the emitted subtitle file. Decoding is always
//! lossy: bytes that do not belong to the code page become U+FFFD.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Code page of the decoder log and of the subtitle output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterEncoding {
    /// No conversion: bytes are taken as UTF-8 and written back as such
    #[default]
    #[serde(alias = "0", alias = "unicode")]
    None,
    #[serde(alias = "3")]
    Ascii,
    #[serde(alias = "1", alias = "latin-1", alias = "iso-8859-1")]
    Latin1,
    #[serde(alias = "2", alias = "utf-8")]
    Utf8,
}

impl CharacterEncoding {
    /// Decoder option code (`0` none, `1` latin1, `2` utf-8, `3` ascii)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CharacterEncoding::None),
            1 => Some(CharacterEncoding::Latin1),
            2 => Some(CharacterEncoding::Utf8),
            3 => Some(CharacterEncoding::Ascii),
            _ => None,
        }
    }

    /// Decode one log line, substituting invalid bytes
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, had_errors) = match self {
            CharacterEncoding::None | CharacterEncoding::Utf8 => {
                encoding_rs::UTF_8.decode_without_bom_handling(bytes)
            }
            CharacterEncoding::Latin1 => {
                encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes)
            }
            CharacterEncoding::Ascii => {
                if bytes.is_ascii() {
                    // ASCII is a subset of UTF-8, so this cannot fail
                    encoding_rs::UTF_8.decode_without_bom_handling(bytes)
                } else {
                    let text: String = bytes
                        .iter()
                        .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                        .collect();
                    (Cow::Owned(text), true)
                }
            }
        };

        if had_errors {
            debug!(encoding = %self, "Invalid bytes replaced while decoding line");
        }

        text
    }

    /// Encode output text into this code page
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match self {
            CharacterEncoding::None | CharacterEncoding::Utf8 => Cow::Borrowed(text.as_bytes()),
            CharacterEncoding::Latin1 => {
                let (bytes, _, had_unmappable) = encoding_rs::WINDOWS_1252.encode(text);
                if had_unmappable {
                    debug!("Unmappable characters written as numeric references");
                }
                bytes
            }
            CharacterEncoding::Ascii => {
                if text.is_ascii() {
                    Cow::Borrowed(text.as_bytes())
                } else {
                    Cow::Owned(
                        text.chars()
                            .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                            .collect(),
                    )
                }
            }
        }
    }
}

impl fmt::Display for CharacterEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterEncoding::None => write!(f, "none"),
            CharacterEncoding::Ascii => write!(f, "ascii"),
            CharacterEncoding::Latin1 => write!(f, "latin1"),
            CharacterEncoding::Utf8 => write!(f, "utf-8"),
        }
    }
}

impl FromStr for CharacterEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown encoding code: {code}"));
        }
        match s.to_lowercase().as_str() {
            "none" | "unicode" => Ok(CharacterEncoding::None),
            "ascii" => Ok(CharacterEncoding::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(CharacterEncoding::Latin1),
            "utf8" | "utf-8" => Ok(CharacterEncoding::Utf8),
            other => Err(format!("unknown encoding: {other}")),
        }
    }
}
