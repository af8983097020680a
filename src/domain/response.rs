use serde::{Deserialize, Serialize};

use crate::domain::request::SendRequest;

/// Prefix that marks an accepted message in the gateway reply.
pub const SUCCESS_PREFIX: &str = "OK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
/// Backend-specific payload attached to a request or result.
pub enum Extension {
    GoyyaResponse(GoyyaResponse),
}

impl Extension {
    /// The Goyya reply, if this extension carries one.
    pub fn as_goyya_response(&self) -> Option<&GoyyaResponse> {
        match self {
            Self::GoyyaResponse(response) => Some(response),
        }
    }
}

impl From<GoyyaResponse> for Extension {
    fn from(value: GoyyaResponse) -> Self {
        Self::GoyyaResponse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of one send operation.
pub struct SendResult {
    #[serde(default)]
    pub request: Option<SendRequest>,
    pub successfully_sent: bool,
    #[serde(default)]
    pub extension: Option<Extension>,
}

impl SendResult {
    /// Wrap a gateway reply. `successfully_sent` mirrors [`GoyyaResponse::is_ok`].
    pub fn from_goyya(request: SendRequest, response: GoyyaResponse) -> Self {
        Self {
            request: Some(request),
            successfully_sent: response.is_ok(),
            extension: Some(Extension::GoyyaResponse(response)),
        }
    }

    /// Successful result without any backend payload.
    pub fn accepted(request: SendRequest) -> Self {
        Self {
            request: Some(request),
            successfully_sent: true,
            extension: None,
        }
    }

    pub fn goyya_response(&self) -> Option<&GoyyaResponse> {
        self.extension.as_ref().and_then(Extension::as_goyya_response)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
/// Parsed reply of the Goyya gateway.
///
/// `id` and `count` are best effort; `is_ok` depends only on the raw text.
pub struct GoyyaResponse {
    pub response: String,
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub count: Option<i32>,
    #[serde(rename = "responseParsingException")]
    pub parse_error: Option<ParseFailure>,
}

impl GoyyaResponse {
    pub fn is_ok(&self) -> bool {
        self.response.starts_with(SUCCESS_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
/// Diagnostic kept when the payload of a reply could not be read.
pub struct ParseFailure {
    pub message: String,
    #[serde(rename = "stackTrace")]
    pub trace: String,
}

impl ParseFailure {
    pub fn new(error: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            message: error.to_string(),
            trace: format!("{error:?}"),
        }
    }
}
