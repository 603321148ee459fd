use std::sync::Arc;

use engine_logging::engine_warn;
use webmd_core::TransportMode;

use crate::curl::CurlBackend;
use crate::fetch::{Backend, FetchSettings, ReqwestBackend};
use crate::{FetchError, FetchResult, FetchedBytes, PayloadKind};

/// Where a fallback-capable fetch currently stands.
enum FallbackState {
    TryPrimary,
    /// `cause` is the primary failure that led here, if any.
    TrySecondary { cause: Option<FetchError> },
    Done(FetchResult),
    Failed(FetchError),
}

/// Fetches through the backend(s) selected by a [`TransportMode`].
///
/// The library backend is primary, the external process secondary; only
/// `Auto` moves from one to the other.
#[derive(Clone)]
pub struct Transport {
    mode: TransportMode,
    primary: Arc<dyn Backend>,
    secondary: Arc<dyn Backend>,
}

impl Transport {
    pub fn new(mode: TransportMode, settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self::with_backends(
            mode,
            Arc::new(ReqwestBackend::new(settings)?),
            Arc::new(CurlBackend::default()),
        ))
    }

    pub fn with_backends(
        mode: TransportMode,
        primary: Arc<dyn Backend>,
        secondary: Arc<dyn Backend>,
    ) -> Self {
        Self {
            mode,
            primary,
            secondary,
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.fetch(url, PayloadKind::Text).await?.into_text()
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes, FetchError> {
        self.fetch(url, PayloadKind::Binary).await?.into_bytes()
    }

    pub async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<FetchResult, FetchError> {
        let mut state = match self.mode {
            TransportMode::Auto | TransportMode::Library => FallbackState::TryPrimary,
            TransportMode::ExternalProcess => FallbackState::TrySecondary { cause: None },
        };

        loop {
            state = match state {
                FallbackState::TryPrimary => match self.primary.fetch(url, kind).await {
                    Ok(result) => FallbackState::Done(result),
                    Err(err) if self.mode == TransportMode::Auto => {
                        FallbackState::TrySecondary { cause: Some(err) }
                    }
                    Err(err) => FallbackState::Failed(err),
                },
                FallbackState::TrySecondary { cause } => {
                    if let Some(cause) = cause {
                        engine_warn!(
                            "{} failed for {}, falling back to {}: {}",
                            self.primary.name(),
                            kind.subject(),
                            self.secondary.name(),
                            cause
                        );
                    }
                    match self.secondary.fetch(url, kind).await {
                        Ok(result) => FallbackState::Done(result),
                        Err(err) => FallbackState::Failed(err),
                    }
                }
                FallbackState::Done(result) => return Ok(result),
                FallbackState::Failed(err) => return Err(err),
            };
        }
    }
}
