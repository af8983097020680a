use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// Character set used for query values and for decoding the gateway reply.
///
/// The gateway expects single-byte ISO-8859-1; US-ASCII and UTF-8 are available for compatible
/// endpoints.
pub enum Charset {
    #[default]
    Iso8859_1,
    UsAscii,
    Utf8,
}

impl Charset {
    /// Canonical label, as accepted by [`Charset::from_label`].
    pub fn label(self) -> &'static str {
        match self {
            Self::Iso8859_1 => "ISO-8859-1",
            Self::UsAscii => "US-ASCII",
            Self::Utf8 => "UTF-8",
        }
    }

    /// Resolve a charset label (case-insensitive, common aliases accepted).
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "iso-8859-1" | "iso8859-1" | "iso_8859_1" | "iso-latin-1" | "latin1"
            | "latin-1" | "l1" => Ok(Self::Iso8859_1),
            "us-ascii" | "ascii" | "iso646-us" | "ansi_x3.4-1968" => Ok(Self::UsAscii),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            _ => Err(ValidationError::UnsupportedCharset {
                input: label.to_owned(),
            }),
        }
    }

    /// Encode `text` to bytes. Characters the charset cannot represent become `?`.
    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        match self {
            Self::Utf8 => Cow::Borrowed(text.as_bytes()),
            _ if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Self::Iso8859_1 => Cow::Owned(
                text.chars()
                    .map(|ch| u8::try_from(ch).unwrap_or(b'?'))
                    .collect(),
            ),
            Self::UsAscii => Cow::Owned(
                text.chars()
                    .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
                    .collect(),
            ),
        }
    }

    /// Decode bytes received from the gateway.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Iso8859_1 => bytes.iter().copied().map(char::from).collect(),
            Self::UsAscii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        }
    }
}

impl FromStr for Charset {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value)
    }
}

impl TryFrom<String> for Charset {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value)
    }
}

impl From<Charset> for String {
    fn from(value: Charset) -> Self {
        value.label().to_owned()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
