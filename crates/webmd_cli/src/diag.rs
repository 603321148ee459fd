//! Environment report: can the backends be built, launched and reach the network?

use std::time::Duration;

use tokio::process::Command;
use webmd_engine::{Backend, CurlBackend, FetchSettings, PayloadKind, ReqwestBackend};

pub const DEFAULT_PROBE_URL: &str = "https://example.com";
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub outcome: Result<String, String>,
}

impl Check {
    fn new(name: impl Into<String>, outcome: Result<String, String>) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }

    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(detail) => format!("{} OK: {detail}", self.name),
            Err(reason) => format!("{} failed: {reason}", self.name),
        }
    }
}

pub fn header_lines() -> Vec<String> {
    vec![
        format!("webmd version: {}", env!("CARGO_PKG_VERSION")),
        format!(
            "Platform: {} {}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
    ]
}

/// Runs every check against `probe_url`. Failures are reported, never returned.
pub async fn run_checks(probe_url: &str) -> Vec<Check> {
    let mut checks = Vec::new();

    let settings = FetchSettings {
        request_timeout: PROBE_TIMEOUT,
        retry_limit: 0,
        ..FetchSettings::from_env()
    };
    let library = ReqwestBackend::new(settings).map_err(|err| err.to_string());
    checks.push(Check::new(
        "library backend",
        library.as_ref().map(|_| "client built".to_string()).map_err(Clone::clone),
    ));
    checks.push(Check::new("curl", curl_version().await));

    if let Ok(library) = &library {
        checks.push(probe("library fetch", library, probe_url).await);
    }
    checks.push(probe("external-process fetch", &CurlBackend::default(), probe_url).await);
    checks
}

async fn curl_version() -> Result<String, String> {
    let output = Command::new("curl")
        .arg("--version")
        .output()
        .await
        .map_err(|err| err.to_string())?;
    if !output.status.success() {
        return Err(format!("exited with {}", output.status));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or_default().to_string())
}

async fn probe(name: &str, backend: &dyn Backend, url: &str) -> Check {
    let outcome = match tokio::time::timeout(PROBE_TIMEOUT, backend.fetch(url, PayloadKind::Text)).await
    {
        Ok(Ok(result)) => result
            .into_text()
            .map(|text| format!("{} characters from {url}", text.chars().count()))
            .map_err(|err| err.to_string()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err(format!("no answer from {url} within {PROBE_TIMEOUT:?}")),
    };
    Check::new(name, outcome)
}
