use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::response::Extension;
use crate::domain::validation::ValidationError;
use crate::domain::value::RequestId;

/// Default maximum number of characters of one text SMS.
pub const DEFAULT_MAX_LENGTH_OF_ONE_SMS: usize = 153;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// One SMS to send.
///
/// Every field except the request id is optional: the backend fills in missing
/// sender, receiver and message from its configured [`MessageDefaults`].
pub struct SendRequest {
    request_id: RequestId,
    sender: Option<String>,
    receiver: Option<String>,
    message: Option<String>,
    send_time: Option<DateTime<Utc>>,
    extension: Option<Extension>,
}

impl SendRequest {
    /// Empty request with a freshly generated id.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Schedule the message. Times less than a minute ahead are sent immediately.
    pub fn with_send_time(mut self, send_time: DateTime<Utc>) -> Self {
        self.send_time = Some(send_time);
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension = Some(extension);
        self
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn send_time(&self) -> Option<DateTime<Utc>> {
        self.send_time
    }

    pub fn extension(&self) -> Option<&Extension> {
        self.extension.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Fallback values for requests that leave sender, receiver or message unset.
pub struct MessageDefaults {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Sender, receiver and message after defaults were applied.
pub struct ResolvedMessage<'a> {
    pub sender: &'a str,
    pub receiver: &'a str,
    pub message: &'a str,
}

impl MessageDefaults {
    pub const SENDER_FIELD: &'static str = "sender";
    pub const RECEIVER_FIELD: &'static str = "receiver";
    pub const MESSAGE_FIELD: &'static str = "msg";

    /// Apply the defaults to `request`.
    ///
    /// A blank request value counts as unset. Fails with [`ValidationError::Missing`] when
    /// neither the request nor the defaults carry a non-blank value.
    pub fn resolve<'a>(
        &'a self,
        request: &'a SendRequest,
    ) -> Result<ResolvedMessage<'a>, ValidationError> {
        Ok(ResolvedMessage {
            sender: pick(Self::SENDER_FIELD, request.sender(), self.sender.as_deref())?,
            receiver: pick(
                Self::RECEIVER_FIELD,
                request.receiver(),
                self.receiver.as_deref(),
            )?,
            message: pick(Self::MESSAGE_FIELD, request.message(), self.message.as_deref())?,
        })
    }
}

fn pick<'a>(
    field: &'static str,
    requested: Option<&'a str>,
    fallback: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    requested
        .filter(|value| !value.trim().is_empty())
        .or_else(|| fallback.filter(|value| !value.trim().is_empty()))
        .ok_or(ValidationError::Missing { field })
}
