use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::engine_debug;
use url::Url;
use webmd_core::RunConfig;

use crate::convert::{Converter, MarkdownRenderer, RenderError};
use crate::dom::ArticleDocument;
use crate::extract::{clean_article, ExtractError, Extractor, ReadabilityExtractor};
use crate::fetch::FetchSettings;
use crate::frontmatter::{assemble_document, FrontMatter};
use crate::images::localize_images;
use crate::persist::{absolute_path, OutputDir, PersistError};
use crate::transport::Transport;
use crate::{FailureKind, FetchError};

/// Produces the `retrieved_at` timestamp.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Filesystem(#[from] PersistError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What a successful run produced. Paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub out_file: PathBuf,
    pub images_dir: PathBuf,
    pub title: Option<String>,
    pub images_saved: usize,
    pub images_failed: usize,
}

/// Fetch, extract, localize images, render and write, in that order.
pub struct Pipeline {
    transport: Transport,
    extractor: Box<dyn Extractor>,
    converter: Box<dyn Converter>,
    clock: Clock,
}

impl Pipeline {
    pub fn new(transport: Transport, clock: Clock) -> Self {
        Self {
            transport,
            extractor: Box::new(ReadabilityExtractor),
            converter: Box::new(MarkdownRenderer::default()),
            clock,
        }
    }

    /// Pipeline with the production transport for the configured mode.
    pub fn for_config(
        config: &RunConfig,
        settings: FetchSettings,
        clock: Clock,
    ) -> Result<Self, ConvertError> {
        let transport = Transport::new(config.transport, settings)?;
        Ok(Self::new(transport, clock))
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub async fn run(&self, config: &RunConfig) -> Result<ConversionSummary, ConvertError> {
        engine_debug!("Run config: {config:?}");
        let source = Url::parse(&config.url).map_err(|err| {
            FetchError::new(FailureKind::InvalidUrl, format!("{}: {err}", config.url))
        })?;

        let html = self.transport.fetch_text(source.as_str()).await?;
        let article = self.extractor.extract(&html, &source)?;
        engine_debug!("Extracted title: {:?}", article.best_title());

        let mut doc = ArticleDocument::parse_fragment(&article.content_html, source.clone());
        clean_article(&mut doc);

        let out_file = absolute_path(&config.out)?;
        let markdown_dir = out_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let markdown_out = OutputDir::prepare(&markdown_dir)?;
        let images_dir = absolute_path(&config.images_dir)?;

        let report =
            localize_images(&mut doc, &source, &images_dir, &markdown_dir, &self.transport)
                .await?;

        let body = self.converter.to_markdown(&doc)?;
        let front_matter = config
            .frontmatter
            .then(|| FrontMatter::from_article(&article, &config.url, &(self.clock)()));
        let document = assemble_document(front_matter.as_ref(), config.toc, &body);

        let file_name = out_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PersistError::OutputDir {
                path: out_file.clone(),
                message: "output path has no file name".into(),
            })?;
        let out_file = markdown_out.write(&file_name, document)?;
        engine_debug!("Wrote Markdown: {}", out_file.display());
        engine_debug!(
            "Converted {} ({} images saved, {} failed)",
            config.url,
            report.saved.len(),
            report.failed.len()
        );

        Ok(ConversionSummary {
            out_file,
            images_dir,
            title: article.best_title().map(str::to_string),
            images_saved: report.saved.len(),
            images_failed: report.failed.len(),
        })
    }
}
