// ABOUTME: EC2 instance metadata client over a plain HTTP/1 connection.
// ABOUTME: Fetches the instance's local or public IPv4 address, preferring IMDSv2 tokens.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use snafu::{OptionExt, ResultExt, Snafu};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::TcpStream;

const TOKEN_PATH: &str = "/latest/api/token";
const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const TOKEN_TTL_SECS: &str = "21600";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const TOKEN_TIMEOUT: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the instance metadata endpoint.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MetadataError {
    #[snafu(display("invalid metadata endpoint: {endpoint}"))]
    InvalidEndpoint { endpoint: String },

    #[snafu(display("failed to connect to {endpoint}: {source}"))]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },

    #[snafu(display("timed out connecting to {endpoint}"))]
    ConnectTimeout { endpoint: String },

    #[snafu(display("timed out waiting for {path}"))]
    Timeout { path: String },

    #[snafu(display("failed to build request for {path}: {source}"))]
    BuildRequest {
        path: String,
        source: hyper::http::Error,
    },

    #[snafu(display("request for {path} failed: {source}"))]
    Http { path: String, source: hyper::Error },

    #[snafu(display("{path} returned HTTP {status}"))]
    Status { path: String, status: u16 },

    #[snafu(display("{path} returned {body:?}, not an IPv4 address"))]
    InvalidAddress {
        path: String,
        body: String,
        source: std::net::AddrParseError,
    },
}

/// Which of the instance's addresses to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScope {
    /// The private VPC address.
    Local,
    /// The public internet address.
    Public,
}

impl AddressScope {
    pub fn from_local_flag(local: bool) -> Self {
        if local {
            AddressScope::Local
        } else {
            AddressScope::Public
        }
    }

    /// Metadata path holding this address.
    pub fn path(self) -> &'static str {
        match self {
            AddressScope::Local => "/latest/meta-data/local-ipv4",
            AddressScope::Public => "/latest/meta-data/public-ipv4",
        }
    }
}

impl fmt::Display for AddressScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressScope::Local => write!(f, "local"),
            AddressScope::Public => write!(f, "public"),
        }
    }
}

/// Source of the running instance's own addresses.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn instance_address(&self, scope: AddressScope) -> Result<Ipv4Addr, MetadataError>;
}

/// Client for the link-local instance metadata service.
#[derive(Debug, Clone)]
pub struct InstanceMetadata {
    authority: String,
    connect_timeout: Duration,
    token_timeout: Duration,
    request_timeout: Duration,
}

impl InstanceMetadata {
    /// Create a client for an endpoint like `http://169.254.169.254`.
    pub fn new(endpoint: &str) -> Result<Self, MetadataError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let host = trimmed.strip_prefix("http://").unwrap_or(trimmed);

        if host.is_empty() || host.contains('/') || host.contains("://") {
            return InvalidEndpointSnafu { endpoint }.fail();
        }

        let authority = if host.contains(':') {
            host.to_string()
        } else {
            format!("{host}:80")
        };

        Ok(Self {
            authority,
            connect_timeout: CONNECT_TIMEOUT,
            token_timeout: TOKEN_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override how long the token request and the metadata GET may take.
    ///
    /// Each deadline covers the whole exchange: connect, headers and body.
    pub fn with_timeouts(mut self, token: Duration, request: Duration) -> Self {
        self.token_timeout = token;
        self.request_timeout = request;
        self
    }

    /// Fetch a metadata path as trimmed text.
    pub async fn get_text(&self, path: &str) -> Result<String, MetadataError> {
        let token = self.session_token().await;
        let headers: Vec<(&str, &str)> = token
            .as_deref()
            .map(|t| vec![(TOKEN_HEADER, t)])
            .unwrap_or_default();

        let (status, body) =
            tokio::time::timeout(self.request_timeout, self.send(Method::GET, path, &headers))
                .await
                .ok()
                .context(TimeoutSnafu { path })??;
        if !status.is_success() {
            return StatusSnafu {
                path,
                status: status.as_u16(),
            }
            .fail();
        }
        Ok(body)
    }

    /// Request an IMDSv2 session token, or `None` to fall back to IMDSv1.
    ///
    /// An endpoint that never answers the PUT (a container behind a hop
    /// limit of 1) counts as no token once `token_timeout` elapses.
    async fn session_token(&self) -> Option<String> {
        let request = self.send(Method::PUT, TOKEN_PATH, &[(TOKEN_TTL_HEADER, TOKEN_TTL_SECS)]);
        let Ok(result) = tokio::time::timeout(self.token_timeout, request).await else {
            tracing::debug!(timeout = ?self.token_timeout, "IMDSv2 token request timed out, using IMDSv1");
            return None;
        };

        match result {
            Ok((status, token)) if status.is_success() && !token.is_empty() => Some(token),
            Ok((status, _)) => {
                tracing::debug!(%status, "IMDSv2 token unavailable, using IMDSv1");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "IMDSv2 token request failed, using IMDSv1");
                None
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Result<(StatusCode, String), MetadataError> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.authority))
            .await
            .ok()
            .context(ConnectTimeoutSnafu {
                endpoint: &self.authority,
            })?
            .context(ConnectSnafu {
                endpoint: &self.authority,
            })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .context(HttpSnafu { path })?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("metadata connection error: {}", e);
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(hyper::header::HOST, &self.authority);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder
            .body(Empty::<Bytes>::new())
            .context(BuildRequestSnafu { path })?;

        let resp = sender.send_request(req).await.context(HttpSnafu { path })?;
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .context(HttpSnafu { path })?
            .to_bytes();

        Ok((status, String::from_utf8_lossy(&body).trim().to_string()))
    }
}

#[async_trait]
impl MetadataSource for InstanceMetadata {
    async fn instance_address(&self, scope: AddressScope) -> Result<Ipv4Addr, MetadataError> {
        let path = scope.path();
        let body = self.get_text(path).await?;
        body.parse::<Ipv4Addr>()
            .context(InvalidAddressSnafu { path, body: &body })
    }
}
