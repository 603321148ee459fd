use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use webmd_core::{default_images_dir, InvalidTransport, RunConfig, TransportMode, DEFAULT_OUT};

pub const USAGE: &str = "Usage: webmd <url> [--out PATH] [--images-dir PATH] [--toc|--no-toc] \
[--frontmatter|--no-frontmatter] [--debug] [--transport auto|library|external-process]";

/// Fetch a web page and save its main article as Markdown with local images.
#[derive(Parser, Debug)]
#[command(name = "webmd", version)]
pub struct Cli {
    /// Page to convert; tokens after the first are ignored
    #[arg(value_name = "URL")]
    url: Vec<String>,

    /// Markdown file to write
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUT)]
    out: PathBuf,

    /// Directory for downloaded images [default: images/<out file stem>]
    #[arg(long, value_name = "PATH")]
    images_dir: Option<PathBuf>,

    /// Add a table of contents (default)
    #[arg(long, overrides_with = "no_toc")]
    toc: bool,

    /// Leave out the table of contents
    #[arg(long, overrides_with = "toc")]
    no_toc: bool,

    /// Add a front-matter block (default)
    #[arg(long, overrides_with = "no_frontmatter")]
    frontmatter: bool,

    /// Leave out the front-matter block
    #[arg(long, overrides_with = "frontmatter")]
    no_frontmatter: bool,

    /// Log configuration, fetches and saved files
    #[arg(long)]
    debug: bool,

    /// auto, library or external-process
    #[arg(long, value_name = "MODE", default_value = "auto")]
    transport: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    /// Carries the usage text.
    #[error("{0}")]
    MissingUrl(String),
    #[error(transparent)]
    InvalidTransport(#[from] InvalidTransport),
    #[error("{0}")]
    Usage(String),
    /// `--help` or `--version`; the text goes to stdout and the run ends successfully.
    #[error("{0}")]
    Help(String),
}

impl From<clap::Error> for ArgsError {
    fn from(err: clap::Error) -> Self {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ArgsError::Help(err.to_string()),
            ErrorKind::UnknownArgument => {
                let token = match err.get(ContextKind::InvalidArg) {
                    Some(ContextValue::String(token)) => token.clone(),
                    _ => String::new(),
                };
                ArgsError::UnknownOption(token)
            }
            _ => ArgsError::Usage(err.to_string()),
        }
    }
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig, ArgsError> {
        let url = self
            .url
            .into_iter()
            .next()
            .ok_or_else(|| ArgsError::MissingUrl(USAGE.to_string()))?;
        let transport: TransportMode = self.transport.parse()?;
        let images_dir = self
            .images_dir
            .unwrap_or_else(|| default_images_dir(&self.out));

        Ok(RunConfig {
            url,
            out: self.out,
            images_dir,
            toc: !self.no_toc,
            frontmatter: !self.no_frontmatter,
            debug: self.debug,
            transport,
        })
    }
}

/// Resolves a full argument list, program name first, into a run configuration.
pub fn resolve<I, T>(args: I) -> Result<RunConfig, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)?.into_config()
}
