//! HTTP transport to the daemon with a shared connection pool.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::DEFAULT_HOST;

/// Address of one listening daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Creates an endpoint on the loopback interface.
    pub fn local(port: u16) -> Self {
        Self::new(DEFAULT_HOST, port)
    }

    /// URL the format requests are posted to.
    pub fn url(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}/", self.host, self.port)
        } else {
            format!("http://{}:{}/", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One format request, ready to be sent.
#[derive(Debug, Clone, Default)]
pub struct FormatRequest {
    /// Raw bytes of the source file.
    pub body: Vec<u8>,
    /// Extra request headers.
    pub headers: Vec<(&'static str, String)>,
}

/// Status and fully-read body of a daemon answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// Network-level failure: refused, reset, timed out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Sends format requests to a daemon endpoint.
///
/// Implementations must read the whole response body before resolving so
/// the underlying connection goes back to the pool.
pub trait Transport: Send + Sync {
    /// Posts `request` to `endpoint`.
    fn send<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: FormatRequest,
    ) -> BoxFuture<'a, Result<RawResponse, TransportFailure>>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a client with a per-request `timeout` and room for
    /// `idle_per_host` idle connections to each endpoint.
    pub fn new(timeout: Duration, idle_per_host: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(idle_per_host.max(1))
            .no_proxy()
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Describes a failed request by its root cause, so a timeout and a
    /// refused connection read differently.
    fn describe(&self, err: &reqwest::Error) -> TransportFailure {
        if err.is_timeout() {
            return TransportFailure(format!(
                "request timed out after {}",
                humantime::format_duration(self.timeout)
            ));
        }
        let mut message = err.to_string();
        let mut cause = std::error::Error::source(err);
        while let Some(source) = cause {
            let text = source.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            cause = source.source();
        }
        TransportFailure(message)
    }
}

impl Transport for HttpTransport {
    fn send<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: FormatRequest,
    ) -> BoxFuture<'a, Result<RawResponse, TransportFailure>> {
        Box::pin(async move {
            let mut builder = self.client.post(endpoint.url()).body(request.body);
            for (name, value) in request.headers {
                builder = builder.header(name, value);
            }
            let response = builder.send().await.map_err(|e| self.describe(&e))?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|e| self.describe(&e))?;
            tracing::debug!("{} answered {} ({} bytes)", endpoint, status, body.len());
            Ok(RawResponse {
                status,
                body: body.to_vec(),
            })
        })
    }
}
