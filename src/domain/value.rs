use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Goyya account user id (`id`).
///
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// Query parameter name used by Goyya (`id`).
    pub const FIELD: &'static str = "id";

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated user id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Goyya account password (`pw`).
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Query parameter name used by Goyya (`pw`).
    pub const FIELD: &'static str = "pw";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Unique token identifying one send request.
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh random (UUID v4) request id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing id, e.g. one assigned by the caller's own system.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "request_id",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// Goyya message type (`msgtype`).
pub enum MessageType {
    /// Plain text SMS (`t`).
    #[default]
    Text,
    /// Concatenated long text SMS (`c`).
    LongText,
    /// Blinking SMS (`b`).
    Blink,
    /// Flash SMS, shown directly on the display (`f`).
    Flash,
}

impl MessageType {
    /// Query parameter name used by Goyya (`msgtype`).
    pub const FIELD: &'static str = "msgtype";

    /// Single-letter code sent on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Self::Text => "t",
            Self::LongText => "c",
            Self::Blink => "b",
            Self::Flash => "f",
        }
    }

    /// Pick the type actually sent for `message`.
    ///
    /// An unset, text or long-text default is resolved by length: messages longer than
    /// `max_length_of_one_sms` characters go out as [`MessageType::LongText`], all others as
    /// [`MessageType::Text`]. Blink and flash are kept as configured.
    pub fn select(
        configured: Option<MessageType>,
        message: &str,
        max_length_of_one_sms: usize,
    ) -> Self {
        match configured {
            None | Some(Self::Text) | Some(Self::LongText) => {
                if message.chars().count() > max_length_of_one_sms {
                    Self::LongText
                } else {
                    Self::Text
                }
            }
            Some(other) => other,
        }
    }
}

impl FromStr for MessageType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "t" => Ok(Self::Text),
            "c" => Ok(Self::LongText),
            "b" => Ok(Self::Blink),
            "f" => Ok(Self::Flash),
            _ => Err(ValidationError::InvalidMessageType {
                input: value.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for MessageType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.code().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// `strftime` pattern used to render a scheduled send time (`time`).
///
/// Invariant: parses without error items. A blank input falls back to
/// [`SendTimePattern::DEFAULT`].
pub struct SendTimePattern(String);

impl SendTimePattern {
    /// Query parameter name used by Goyya (`time`).
    pub const FIELD: &'static str = "time";

    /// Hour, minute, day, month, four-digit year (`HHmmddMMyyyy`).
    pub const DEFAULT: &'static str = "%H%M%d%m%Y";

    /// Create a validated pattern.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Ok(Self::default());
        }
        if StrftimeItems::new(&value).any(|item| matches!(item, Item::Error)) {
            return Err(ValidationError::InvalidSendTimePattern { pattern: value });
        }
        Ok(Self(value))
    }

    /// Borrow the pattern.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SendTimePattern {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}
