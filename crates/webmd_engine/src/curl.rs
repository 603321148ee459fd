use std::ffi::OsString;
use std::process::Stdio;

use engine_logging::engine_debug;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::decode::decode_text;
use crate::fetch::{Backend, MAX_BINARY_BYTES, MAX_TEXT_BYTES};
use crate::{FailureKind, FetchError, FetchResult, FetchedBytes, PayloadKind};

const CURL_ARGS: &[&str] = &["-L", "--fail", "--silent", "--show-error"];

/// Stderr kept for error messages; the rest is read and dropped.
const STDERR_LIMIT: usize = 16 * 1024;

/// External-process backend: runs a command-line HTTP client and captures
/// its stdout.
///
/// Stdout is read up to the payload limit; a client that writes past it
/// is killed. No timeout is applied here; the client decides how long to
/// wait.
#[derive(Debug, Clone)]
pub struct CurlBackend {
    program: OsString,
    args: Vec<OsString>,
    max_text_bytes: u64,
    max_binary_bytes: u64,
}

impl Default for CurlBackend {
    fn default() -> Self {
        Self::with_command("curl", CURL_ARGS.iter().copied())
    }
}

impl CurlBackend {
    /// Runs `program args... <url>` instead of curl.
    pub fn with_command<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            max_text_bytes: MAX_TEXT_BYTES,
            max_binary_bytes: MAX_BINARY_BYTES,
        }
    }

    pub fn with_limits(mut self, max_text_bytes: u64, max_binary_bytes: u64) -> Self {
        self.max_text_bytes = max_text_bytes;
        self.max_binary_bytes = max_binary_bytes;
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }
}

#[async_trait::async_trait]
impl Backend for CurlBackend {
    fn name(&self) -> &'static str {
        "external-process"
    }

    async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<FetchResult, FetchError> {
        engine_debug!(
            "{} GET ({kind}): {url}",
            self.program.to_string_lossy()
        );
        let max_bytes = match kind {
            PayloadKind::Text => self.max_text_bytes,
            PayloadKind::Binary => self.max_binary_bytes,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                FetchError::new(
                    FailureKind::ProcessLaunch,
                    format!("{}: {err}", self.program.to_string_lossy()),
                )
            })?;
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(FetchError::new(
                FailureKind::ProcessingError,
                "child output pipes were not captured",
            ));
        };

        // One byte past the cap is enough to know the output is too large.
        let read_stdout = async {
            let mut body = Vec::new();
            let read = stdout
                .take(max_bytes.saturating_add(1))
                .read_to_end(&mut body)
                .await;
            if body.len() as u64 > max_bytes {
                let _ = child.start_kill();
            }
            read.map(|_| body)
        };
        let (body, stderr) = tokio::join!(read_stdout, drain_capped(stderr, STDERR_LIMIT));
        let body = body.map_err(|err| {
            FetchError::new(FailureKind::ProcessingError, format!("reading output: {err}"))
        })?;

        if body.len() as u64 > max_bytes {
            let _ = child.wait().await;
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: None,
                },
                "output exceeded buffer limit",
            ));
        }

        let status = child.wait().await.map_err(|err| {
            FetchError::new(FailureKind::ProcessingError, format!("waiting for exit: {err}"))
        })?;
        if !status.success() {
            let stderr = stderr.unwrap_or_default();
            return Err(FetchError::new(
                FailureKind::ProcessExit(status.code()),
                String::from_utf8_lossy(&stderr).trim().to_string(),
            ));
        }

        Ok(match kind {
            PayloadKind::Text => FetchResult::Text(decode_text(&body, None)),
            PayloadKind::Binary => FetchResult::Bytes(FetchedBytes {
                bytes: body.into(),
                content_type: None,
            }),
        })
    }
}

async fn drain_capped(mut reader: impl AsyncRead + Unpin, cap: usize) -> std::io::Result<Vec<u8>> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(kept);
        }
        let room = cap.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..read.min(room)]);
    }
}
