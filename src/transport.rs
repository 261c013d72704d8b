use reqwest::blocking::Client;
use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("repo-dispatch/", env!("CARGO_PKG_VERSION"));

/// A fully built HTTP request, exactly as it should go on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

// Authorization carries the token, keep it out of logs.
impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The exchange never produced a response (DNS, refused connection, TLS, timeout).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{cause}")]
pub struct TransportError {
    cause: String,
}

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("{:#}", anyhow::Error::from(err)))
    }
}

pub trait Transport {
    /// Sends one request and blocks until a response or a failure arrives.
    fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request)
    }
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Without an explicit timeout the blocking client's own default deadline applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::new(format!("invalid method {}: {}", request.method, e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body.clone()).send()?;
        let status = response.status();
        // Only a rejection needs its body. A failed read leaves it empty.
        let body = if status == StatusCode::NO_CONTENT {
            String::new()
        } else {
            response.text().unwrap_or_default()
        };
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}
