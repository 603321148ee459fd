//! webmd engine: transports, article extraction, image localization,
//! Markdown rendering and output assembly.
mod convert;
mod curl;
mod decode;
mod dom;
mod extract;
mod fetch;
mod frontmatter;
mod gfm;
mod images;
mod persist;
mod pipeline;
mod transport;
mod types;

pub use convert::{
    base_rules, Converter, Handler, MarkdownRenderer, RenderError, Rule, SKIPPED_TAGS,
};
pub use curl::CurlBackend;
pub use decode::{decode_html, decode_text, DecodeError, DecodedHtml};
pub use dom::{text_of, ArticleDocument, DomNode, ElementData};
pub use extract::{
    clean_article, page_title, to_absolute_url, Article, ExtractError, Extractor,
    ReadabilityExtractor, STRIPPED_TAGS,
};
pub use fetch::{
    Backend, FetchSettings, ProxySettings, ReqwestBackend, DEFAULT_USER_AGENT, MAX_BINARY_BYTES,
    MAX_TEXT_BYTES,
};
pub use frontmatter::{assemble_document, document_title, FrontMatter, FALLBACK_TITLE};
pub use gfm::gfm_rules;
pub use images::{localize_images, relative_src, FailedImage, LocalizeReport, SavedImage};
pub use persist::{absolute_path, normalize_path, OutputDir, PersistError};
pub use pipeline::{Clock, ConversionSummary, ConvertError, Pipeline};
pub use transport::Transport;
pub use types::{FailureKind, FetchError, FetchResult, FetchedBytes, PayloadKind};
