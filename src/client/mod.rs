//! Client layer: builds the gateway call and maps the raw reply into a [`SendResult`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{
    Charset, DEFAULT_MAX_LENGTH_OF_ONE_SMS, MessageDefaults, MessageType, Password, SendRequest,
    SendResult, SendTimePattern, Username, ValidationError,
};
use crate::service::{BoxFuture, SmsBackend};

/// Public Goyya gateway endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://gate1.goyyamobile.com/sms/sendsms.asp";

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

trait HttpTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            // The query carries the password; keep it out of error messages.
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(reqwest::Error::without_url)?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(reqwest::Error::without_url)?
                .to_vec();
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Goyya account credentials, sent as `id` and `pw`.
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Validate that the user id is non-blank and the password non-empty.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    fn push_query_params(&self, params: &mut Vec<(String, String)>) {
        params.push((Username::FIELD.to_owned(), self.username.as_str().to_owned()));
        params.push((Password::FIELD.to_owned(), self.password.as_str().to_owned()));
    }
}

#[derive(Clone, PartialEq, Eq)]
/// HTTP proxy used to reach the gateway.
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    /// Sent as Basic `Proxy-Authorization` when non-blank.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    fn to_reqwest(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        let proxy = reqwest::Proxy::all(format!("http://{}:{}", self.host.trim(), self.port))?;
        Ok(match self.username.as_deref().map(str::trim) {
            Some(username) if !username.is_empty() => {
                proxy.basic_auth(username, self.password.as_deref().unwrap_or(""))
            }
            _ => proxy,
        })
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`GoyyaClient`] and [`SmsService`](crate::SmsService).
///
/// A gateway reply that refuses the message is not an error; it comes back as a
/// [`SendResult`] with `successfully_sent == false`.
pub enum SmsError {
    /// HTTP client / transport failure (DNS, proxy, TLS, read errors).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Missing or invalid configuration or request values.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
struct GatewaySettings {
    charset: Charset,
    defaults: MessageDefaults,
    max_length_of_one_sms: usize,
    send_time_pattern: SendTimePattern,
    default_message_type: Option<MessageType>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            charset: Charset::default(),
            defaults: MessageDefaults::default(),
            max_length_of_one_sms: DEFAULT_MAX_LENGTH_OF_ONE_SMS,
            send_time_pattern: SendTimePattern::default(),
            default_message_type: None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`GoyyaClient`].
///
/// Everything set here is fixed once [`GoyyaClientBuilder::build`] returns.
pub struct GoyyaClientBuilder {
    credentials: Credentials,
    endpoint: String,
    settings: GatewaySettings,
    proxy: Option<ProxySettings>,
    insecure_tls: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl GoyyaClientBuilder {
    /// Create a builder with the public endpoint and default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            settings: GatewaySettings::default(),
            proxy: None,
            insecure_tls: false,
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the gateway URL. An existing query string is kept and extended.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Charset for query values and for the reply body (default ISO-8859-1).
    pub fn charset(mut self, charset: Charset) -> Self {
        self.settings.charset = charset;
        self
    }

    pub fn default_sender(mut self, sender: impl Into<String>) -> Self {
        self.settings.defaults.sender = Some(sender.into());
        self
    }

    pub fn default_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.settings.defaults.receiver = Some(receiver.into());
        self
    }

    pub fn default_message(mut self, message: impl Into<String>) -> Self {
        self.settings.defaults.message = Some(message.into());
        self
    }

    /// Replace all three message defaults at once.
    pub fn defaults(mut self, defaults: MessageDefaults) -> Self {
        self.settings.defaults = defaults;
        self
    }

    /// Messages longer than this are sent as long text when the type is chosen automatically.
    pub fn max_length_of_one_sms(mut self, max: usize) -> Self {
        self.settings.max_length_of_one_sms = max;
        self
    }

    pub fn send_time_pattern(mut self, pattern: SendTimePattern) -> Self {
        self.settings.send_time_pattern = pattern;
        self
    }

    /// Fix the message type. Text and long text still switch by message length.
    pub fn default_message_type(mut self, message_type: MessageType) -> Self {
        self.settings.default_message_type = Some(message_type);
        self
    }

    /// Route requests through an HTTP proxy.
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Accept any server certificate and host name.
    ///
    /// Only for legacy gateway deployments with broken certificates; leaves the connection
    /// open to interception.
    pub fn insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`GoyyaClient`].
    pub fn build(self) -> Result<GoyyaClient, SmsError> {
        url::Url::parse(&self.endpoint).map_err(|_| ValidationError::InvalidUrl {
            input: self.endpoint.clone(),
        })?;
        if self.settings.max_length_of_one_sms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "max_length_of_one_sms",
                input: "0".to_owned(),
            }
            .into());
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(proxy) = self.proxy.as_ref() {
            let proxy = proxy
                .to_reqwest()
                .map_err(|err| SmsError::Transport(Box::new(err)))?;
            builder = builder.proxy(proxy);
        }
        if self.insecure_tls {
            tracing::warn!("TLS certificate verification is disabled for the Goyya gateway");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|err| SmsError::Transport(Box::new(err)))?;

        Ok(GoyyaClient {
            credentials: self.credentials,
            endpoint: self.endpoint,
            settings: self.settings,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Client for the Goyya SMS gateway.
///
/// Each send resolves defaults, encodes the query in the configured charset, performs one
/// `GET` and parses the text reply. By default it uses
/// `https://gate1.goyyamobile.com/sms/sendsms.asp`.
pub struct GoyyaClient {
    credentials: Credentials,
    endpoint: String,
    settings: GatewaySettings,
    http: Arc<dyn HttpTransport>,
}

impl GoyyaClient {
    /// Create a client using the default endpoint and settings.
    ///
    /// For more customization, use [`GoyyaClient::builder`].
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            settings: GatewaySettings::default(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> GoyyaClientBuilder {
        GoyyaClientBuilder::new(credentials)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one SMS through the gateway.
    ///
    /// Errors:
    /// - Returns [`SmsError::Validation`] when sender, receiver or message is missing and has
    ///   no default; no request is made in that case,
    /// - [`SmsError::Transport`] when the gateway cannot be reached or the reply cannot be read.
    ///
    /// Error statuses (`>= 400`) are not errors: their body is parsed like any other reply.
    pub async fn send_sms(&self, request: SendRequest) -> Result<SendResult, SmsError> {
        let url = self.request_url(&request, Utc::now())?;

        let response = match self.http.get(&url).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    request_id = %request.request_id(),
                    error = %err,
                    "sending SMS through Goyya failed"
                );
                return Err(SmsError::Transport(err));
            }
        };

        if response.status >= 400 {
            tracing::debug!(
                request_id = %request.request_id(),
                status = response.status,
                "Goyya answered with an error status"
            );
        }

        let body = self.settings.charset.decode(&response.body);
        let parsed = crate::transport::decode_send_sms_response(&body);
        Ok(SendResult::from_goyya(request, parsed))
    }

    fn request_url(
        &self,
        request: &SendRequest,
        now: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        let settings = &self.settings;
        let message = settings.defaults.resolve(request)?;
        let message_type = MessageType::select(
            settings.default_message_type,
            message.message,
            settings.max_length_of_one_sms,
        );
        let time = crate::transport::encode_send_time(
            request.send_time(),
            now,
            &settings.send_time_pattern,
        )?;

        let mut params = Vec::<(String, String)>::new();
        self.credentials.push_query_params(&mut params);
        params.extend(crate::transport::encode_send_sms_params(
            &message,
            message_type,
            time,
        ));
        Ok(crate::transport::encode_query_url(
            &self.endpoint,
            &params,
            settings.charset,
        ))
    }
}

impl SmsBackend for GoyyaClient {
    fn send_request(&self, request: SendRequest) -> BoxFuture<'_, Result<SendResult, SmsError>> {
        Box::pin(self.send_sms(request))
    }
}
