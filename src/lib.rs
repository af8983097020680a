//! Send SMS through a pluggable backend, with a typed client for the Goyya HTTP gateway.
//!
//! The crate is split into a domain layer of envelopes and validated values, a transport layer
//! for the gateway's wire-format quirks, a client performing the single HTTP call, and a small
//! service facade that fills in defaults and logs outcomes.
//!
//! ```rust,no_run
//! use goyya_sms::{Credentials, GoyyaClient, SmsService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), goyya_sms::SmsError> {
//!     let client = GoyyaClient::builder(Credentials::new("user", "secret")?)
//!         .default_sender("bremersee")
//!         .build()?;
//!     let service = SmsService::new(client);
//!     let result = service.send_to("0123456789", "hello").await?;
//!     println!("sent: {}", result.successfully_sent);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod service;
mod transport;

pub use client::{Credentials, GoyyaClient, GoyyaClientBuilder, ProxySettings, SmsError};
pub use config::GoyyaConfig;
pub use domain::{
    Charset, Extension, GoyyaResponse, MessageDefaults, MessageType, ParseFailure, RequestId,
    SendRequest, SendResult, SendTimePattern, ValidationError,
};
pub use service::{NoopBackend, SmsBackend, SmsService};
