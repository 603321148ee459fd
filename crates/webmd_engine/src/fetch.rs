use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::decode::decode_text;
use crate::{FailureKind, FetchError, FetchResult, FetchedBytes, PayloadKind};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; url-to-markdown/1.0)";
pub const MAX_TEXT_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_BINARY_BYTES: u64 = 100 * 1024 * 1024;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
const ACCEPT_ANY: &str = "*/*";

/// Statuses worth another attempt; everything else non-2xx fails at once.
const RETRY_STATUSES: &[u16] = &[408, 413, 429, 500, 502, 503, 504, 521, 522, 524];

/// Proxy endpoints for the library backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub https: Option<String>,
    pub http: Option<String>,
}

impl ProxySettings {
    /// Reads `HTTPS_PROXY`/`https_proxy` and `HTTP_PROXY`/`http_proxy`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ProxySettings::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |names: [&str; 2]| {
            names
                .into_iter()
                .filter_map(&lookup)
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };
        Self {
            https: first(["HTTPS_PROXY", "https_proxy"]),
            http: first(["HTTP_PROXY", "http_proxy"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub retry_limit: u32,
    pub retry_backoff: Duration,
    /// Binds outgoing connections to `0.0.0.0`, so IPv6-only hosts are
    /// unreachable rather than merely deprioritized.
    pub ipv4_only: bool,
    pub max_text_bytes: u64,
    pub max_binary_bytes: u64,
    pub proxy: ProxySettings,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            redirect_limit: 10,
            retry_limit: 3,
            retry_backoff: Duration::from_millis(500),
            ipv4_only: true,
            max_text_bytes: MAX_TEXT_BYTES,
            max_binary_bytes: MAX_BINARY_BYTES,
            proxy: ProxySettings::default(),
        }
    }
}

impl FetchSettings {
    /// Defaults plus proxies taken from the process environment.
    pub fn from_env() -> Self {
        Self {
            proxy: ProxySettings::from_env(),
            ..Self::default()
        }
    }
}

/// One way of retrieving a URL. Implementations must follow redirects and
/// report any non-success status as an error.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<FetchResult, FetchError>;
}

/// Library backend built on `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_client(&settings)?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    async fn fetch_once(
        &self,
        url: &reqwest::Url,
        kind: PayloadKind,
    ) -> Result<FetchResult, FetchError> {
        let accept = match kind {
            PayloadKind::Text => ACCEPT_HTML,
            PayloadKind::Binary => ACCEPT_ANY,
        };
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = match kind {
            PayloadKind::Text => self.settings.max_text_bytes,
            PayloadKind::Binary => self.settings.max_binary_bytes,
        };
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        engine_trace!("received {} bytes from {}", body.len(), url);

        match kind {
            PayloadKind::Text => Ok(FetchResult::Text(decode_text(
                &body,
                content_type.as_deref(),
            ))),
            PayloadKind::Binary => Ok(FetchResult::Bytes(FetchedBytes {
                bytes: body.into(),
                content_type,
            })),
        }
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    fn name(&self) -> &'static str {
        "library"
    }

    async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<FetchResult, FetchError> {
        engine_debug!("library GET ({kind}): {url}");
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(&parsed, kind).await {
                Ok(result) => return Ok(result),
                Err(err) if attempt < self.settings.retry_limit && is_retryable(&err) => {
                    let delay = self.settings.retry_backoff * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    engine_debug!(
                        "retry {attempt}/{} for {url} in {delay:?}: {err}",
                        self.settings.retry_limit
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn build_client(settings: &FetchSettings) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(settings.user_agent.clone())
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .http1_only()
        .no_proxy();

    if settings.ipv4_only {
        builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
    if let Some(proxy) = settings.proxy.https.as_deref() {
        engine_debug!("Using HTTPS proxy: {proxy}");
        builder = builder.proxy(reqwest::Proxy::https(proxy).map_err(map_reqwest_error)?);
    }
    if let Some(proxy) = settings.proxy.http.as_deref() {
        engine_debug!("Using HTTP proxy: {proxy}");
        builder = builder.proxy(reqwest::Proxy::http(proxy).map_err(map_reqwest_error)?);
    }

    builder.build().map_err(map_reqwest_error)
}

fn is_retryable(err: &FetchError) -> bool {
    match err.kind {
        FailureKind::Timeout | FailureKind::Network => true,
        FailureKind::HttpStatus(code) => RETRY_STATUSES.contains(&code),
        _ => false,
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidUrl, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_proxy_variables_win() {
        let proxy = ProxySettings::from_lookup(|name| match name {
            "HTTPS_PROXY" => Some("http://upper:3128".to_string()),
            "https_proxy" => Some("http://lower:3128".to_string()),
            "http_proxy" => Some("http://plain:8080".to_string()),
            _ => None,
        });
        assert_eq!(proxy.https.as_deref(), Some("http://upper:3128"));
        assert_eq!(proxy.http.as_deref(), Some("http://plain:8080"));
    }

    #[test]
    fn blank_proxy_variables_are_ignored() {
        let proxy = ProxySettings::from_lookup(|name| match name {
            "HTTPS_PROXY" => Some("  ".to_string()),
            "https_proxy" => Some("http://lower:3128".to_string()),
            _ => None,
        });
        assert_eq!(proxy.https.as_deref(), Some("http://lower:3128"));
        assert_eq!(proxy.http, None);
    }

    #[test]
    fn only_transient_failures_are_retried() {
        assert!(is_retryable(&FetchError::new(FailureKind::Timeout, "t")));
        assert!(is_retryable(&FetchError::new(FailureKind::HttpStatus(503), "s")));
        assert!(!is_retryable(&FetchError::new(FailureKind::HttpStatus(404), "s")));
        assert!(!is_retryable(&FetchError::new(FailureKind::InvalidUrl, "u")));
    }

    #[test]
    fn clients_are_ipv4_only_by_default() {
        let settings = FetchSettings::default();
        assert!(settings.ipv4_only);
        assert!(build_client(&settings).is_ok());
        assert!(build_client(&FetchSettings {
            ipv4_only: false,
            ..settings
        })
        .is_ok());
    }
}
