//! Service layer: the pluggable backend seam and the send facade.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::client::SmsError;
use crate::domain::{SendRequest, SendResult};

/// Boxed, sendable future returned by [`SmsBackend`] implementations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can deliver one [`SendRequest`].
///
/// Implemented by [`GoyyaClient`](crate::GoyyaClient) and [`NoopBackend`].
pub trait SmsBackend: Send + Sync {
    fn send_request(&self, request: SendRequest) -> BoxFuture<'_, Result<SendResult, SmsError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Backend for environments without a gateway: sends nothing and always reports success.
pub struct NoopBackend;

impl SmsBackend for NoopBackend {
    fn send_request(&self, request: SendRequest) -> BoxFuture<'_, Result<SendResult, SmsError>> {
        Box::pin(async move {
            tracing::warn!(
                request_id = %request.request_id(),
                "no SMS gateway configured, message was NOT sent"
            );
            Ok(SendResult::accepted(request))
        })
    }
}

#[derive(Clone)]
/// Facade over an [`SmsBackend`].
///
/// All `send_*` variants build a [`SendRequest`] and hand it to [`SmsService::send`]; fields
/// they leave out are filled from the backend's configured defaults.
pub struct SmsService {
    backend: Arc<dyn SmsBackend>,
}

impl SmsService {
    pub fn new(backend: impl SmsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Service backed by [`NoopBackend`].
    pub fn noop() -> Self {
        Self::new(NoopBackend)
    }

    /// Send the default message from the default sender to the default receiver.
    pub async fn send_defaults(&self) -> Result<SendResult, SmsError> {
        self.send(SendRequest::new()).await
    }

    pub async fn send_message(&self, message: impl Into<String>) -> Result<SendResult, SmsError> {
        self.send(SendRequest::new().with_message(message)).await
    }

    pub async fn send_to(
        &self,
        receiver: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<SendResult, SmsError> {
        self.send(
            SendRequest::new()
                .with_receiver(receiver)
                .with_message(message),
        )
        .await
    }

    pub async fn send_to_at(
        &self,
        receiver: impl Into<String>,
        message: impl Into<String>,
        send_time: DateTime<Utc>,
    ) -> Result<SendResult, SmsError> {
        self.send(
            SendRequest::new()
                .with_receiver(receiver)
                .with_message(message)
                .with_send_time(send_time),
        )
        .await
    }

    pub async fn send_from(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<SendResult, SmsError> {
        self.send(
            SendRequest::new()
                .with_sender(sender)
                .with_receiver(receiver)
                .with_message(message),
        )
        .await
    }

    pub async fn send_from_at(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        message: impl Into<String>,
        send_time: DateTime<Utc>,
    ) -> Result<SendResult, SmsError> {
        self.send(
            SendRequest::new()
                .with_sender(sender)
                .with_receiver(receiver)
                .with_message(message)
                .with_send_time(send_time),
        )
        .await
    }

    /// Send `request` through the backend and log the outcome.
    ///
    /// Errors:
    /// - [`SmsError::Validation`] when sender, receiver or message is missing and has no default,
    /// - [`SmsError::Transport`] when the gateway could not be reached or read.
    ///
    /// A gateway that answers but refuses the message is not an error: check
    /// [`SendResult::successfully_sent`].
    pub async fn send(&self, request: SendRequest) -> Result<SendResult, SmsError> {
        let request_id = request.request_id().clone();
        tracing::info!(
            request_id = %request_id,
            receiver = request.receiver().unwrap_or("<default>"),
            send_time = ?request.send_time(),
            "sending SMS"
        );

        let result = self.backend.send_request(request).await?;

        if result.successfully_sent {
            tracing::info!(request_id = %request_id, "SMS was successfully sent");
        } else {
            tracing::warn!(
                request_id = %request_id,
                response = result.goyya_response().map(|it| it.response.as_str()),
                "SMS was NOT successfully sent"
            );
        }
        Ok(result)
    }
}
