use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    Missing { field: &'static str },
    InvalidMessageType { input: String },
    UnsupportedCharset { input: String },
    InvalidSendTimePattern { pattern: String },
    InvalidUrl { input: String },
    InvalidValue { field: &'static str, input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::Missing { field } => {
                write!(f, "{field} is not set and no default {field} is configured")
            }
            Self::InvalidMessageType { input } => {
                write!(f, "invalid message type: {input} (expected one of t, c, b, f)")
            }
            Self::UnsupportedCharset { input } => write!(f, "unsupported charset: {input}"),
            Self::InvalidSendTimePattern { pattern } => {
                write!(f, "invalid send time pattern: {pattern}")
            }
            Self::InvalidUrl { input } => write!(f, "invalid gateway url: {input}"),
            Self::InvalidValue { field, input } => write!(f, "invalid value for {field}: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}
