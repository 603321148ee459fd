use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OUT: &str = "install-ubuntu-server.md";
pub const IMAGES_ROOT: &str = "images";

/// Which HTTP backend a run fetches through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Library backend first, external process on any failure.
    #[default]
    Auto,
    Library,
    ExternalProcess,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Auto => "auto",
            TransportMode::Library => "library",
            TransportMode::ExternalProcess => "external-process",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransport(pub String);

impl fmt::Display for InvalidTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid --transport value: {} (use auto|library|external-process)",
            self.0
        )
    }
}

impl std::error::Error for InvalidTransport {}

impl FromStr for TransportMode {
    type Err = InvalidTransport;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.to_lowercase();
        match value.as_str() {
            "auto" => Ok(TransportMode::Auto),
            "library" => Ok(TransportMode::Library),
            "external-process" => Ok(TransportMode::ExternalProcess),
            _ => Err(InvalidTransport(value)),
        }
    }
}

/// Immutable description of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub url: String,
    pub out: PathBuf,
    pub images_dir: PathBuf,
    pub toc: bool,
    pub frontmatter: bool,
    pub debug: bool,
    pub transport: TransportMode,
}

impl RunConfig {
    /// Config with every flag at its default; the image directory follows `out`.
    pub fn with_defaults(url: impl Into<String>) -> Self {
        let out = PathBuf::from(DEFAULT_OUT);
        Self {
            url: url.into(),
            images_dir: default_images_dir(&out),
            out,
            toc: true,
            frontmatter: true,
            debug: false,
            transport: TransportMode::Auto,
        }
    }
}

/// `images/<stem of out>`, e.g. `docs/guide.md` -> `images/guide`.
pub fn default_images_dir(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Path::new(IMAGES_ROOT).join(stem)
}
