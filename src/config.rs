//! Plain configuration object for the Goyya backend.
//!
//! [`GoyyaConfig`] can be deserialized from any `serde` format or read from `GOYYA_*`
//! environment variables, then turned into a client with [`GoyyaClient::from_config`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::client::{Credentials, GoyyaClient, GoyyaClientBuilder, ProxySettings, SmsError};
use crate::domain::{
    Charset, DEFAULT_MAX_LENGTH_OF_ONE_SMS, MessageDefaults, MessageType, SendTimePattern,
    ValidationError,
};

/// Prefix of the environment variables read by [`GoyyaConfig::from_env`].
pub const ENV_PREFIX: &str = "GOYYA_";

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Every option recognized by the Goyya backend.
///
/// Blank strings are treated like unset values.
pub struct GoyyaConfig {
    /// Gateway URL; the public endpoint when unset.
    pub url: Option<String>,
    pub username: String,
    pub password: String,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
    pub charset: Charset,
    pub default_sender: Option<String>,
    pub default_receiver: Option<String>,
    pub default_message: Option<String>,
    pub max_length_of_one_sms: usize,
    /// `strftime` pattern for scheduled sends, default `%H%M%d%m%Y`.
    pub send_time_pattern: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub default_message_type: Option<MessageType>,
    /// Accept any TLS certificate. Off unless explicitly enabled.
    pub insecure_tls: bool,
}

impl Default for GoyyaConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: String::new(),
            password: String::new(),
            proxy_host: None,
            proxy_port: None,
            proxy_username: None,
            proxy_password: None,
            charset: Charset::default(),
            default_sender: None,
            default_receiver: None,
            default_message: None,
            max_length_of_one_sms: DEFAULT_MAX_LENGTH_OF_ONE_SMS,
            send_time_pattern: None,
            default_message_type: None,
            insecure_tls: false,
        }
    }
}

impl fmt::Debug for GoyyaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoyyaConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("proxy_host", &self.proxy_host)
            .field("proxy_port", &self.proxy_port)
            .field("proxy_username", &self.proxy_username)
            .field("proxy_password", &self.proxy_password.as_ref().map(|_| "***"))
            .field("charset", &self.charset)
            .field("default_sender", &self.default_sender)
            .field("default_receiver", &self.default_receiver)
            .field("default_message", &self.default_message)
            .field("max_length_of_one_sms", &self.max_length_of_one_sms)
            .field("send_time_pattern", &self.send_time_pattern)
            .field("default_message_type", &self.default_message_type)
            .field("insecure_tls", &self.insecure_tls)
            .finish()
    }
}

impl GoyyaConfig {
    /// Read the configuration from `GOYYA_URL`, `GOYYA_USERNAME`, `GOYYA_PASSWORD`, ...
    /// (upper-case field names with the [`ENV_PREFIX`]).
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`GoyyaConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let get = |field: &str| {
            lookup(&format!("{ENV_PREFIX}{}", field.to_ascii_uppercase()))
                .filter(|value| !value.trim().is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            url: get("url"),
            username: get("username").unwrap_or_default(),
            password: get("password").unwrap_or_default(),
            proxy_host: get("proxy_host"),
            proxy_port: parse_opt("proxy_port", get("proxy_port"))?,
            proxy_username: get("proxy_username"),
            proxy_password: get("proxy_password"),
            charset: match get("charset") {
                Some(label) => Charset::from_label(&label)?,
                None => defaults.charset,
            },
            default_sender: get("default_sender"),
            default_receiver: get("default_receiver"),
            default_message: get("default_message"),
            max_length_of_one_sms: parse_opt(
                "max_length_of_one_sms",
                get("max_length_of_one_sms"),
            )?
            .unwrap_or(defaults.max_length_of_one_sms),
            send_time_pattern: get("send_time_pattern"),
            default_message_type: get("default_message_type")
                .map(|value| value.parse::<MessageType>())
                .transpose()?,
            insecure_tls: parse_flag("insecure_tls", get("insecure_tls"))?,
        })
    }

    /// Validate the configuration and turn it into a client builder.
    pub fn client_builder(&self) -> Result<GoyyaClientBuilder, ValidationError> {
        let credentials = Credentials::new(self.username.as_str(), self.password.as_str())?;
        let pattern = SendTimePattern::new(self.send_time_pattern.clone().unwrap_or_default())?;

        let mut builder = GoyyaClientBuilder::new(credentials)
            .charset(self.charset)
            .defaults(MessageDefaults {
                sender: self.default_sender.clone(),
                receiver: self.default_receiver.clone(),
                message: self.default_message.clone(),
            })
            .max_length_of_one_sms(self.max_length_of_one_sms)
            .send_time_pattern(pattern)
            .insecure_tls(self.insecure_tls);

        if let Some(url) = non_blank(self.url.as_deref()) {
            builder = builder.endpoint(url);
        }
        if let Some(message_type) = self.default_message_type {
            builder = builder.default_message_type(message_type);
        }
        if let (Some(host), Some(port)) = (non_blank(self.proxy_host.as_deref()), self.proxy_port)
        {
            let mut proxy = ProxySettings::new(host, port);
            if let Some(username) = non_blank(self.proxy_username.as_deref()) {
                proxy = proxy.with_credentials(username, self.proxy_password.clone());
            }
            builder = builder.proxy(proxy);
        }
        Ok(builder)
    }
}

impl GoyyaClient {
    /// Build a client from a [`GoyyaConfig`].
    pub fn from_config(config: &GoyyaConfig) -> Result<Self, SmsError> {
        config.client_builder()?.build()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|it| !it.is_empty())
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ValidationError>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    non_blank(raw.as_deref())
        .map(str::parse::<T>)
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn parse_opt<T: FromStr>(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ValidationError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ValidationError::InvalidValue { field, input: raw })
        })
        .transpose()
}

fn parse_flag(field: &'static str, value: Option<String>) -> Result<bool, ValidationError> {
    match value.as_deref().map(|it| it.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(flag) => match flag.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ValidationError::InvalidValue {
                field,
                input: flag.clone(),
            }),
        },
    }
}
