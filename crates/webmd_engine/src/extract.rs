use dom_smoothie::Readability;
use scraper::{Html, Selector};
use url::Url;

use crate::dom::ArticleDocument;

/// Elements dropped from the extracted article before further processing.
pub const STRIPPED_TAGS: &[&str] = &["script", "noscript", "iframe"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Title chosen by the readability pass.
    pub title: Option<String>,
    /// `<title>` of the original page.
    pub page_title: Option<String>,
    pub content_html: String,
    pub byline: Option<String>,
    pub site_name: Option<String>,
}

impl Article {
    /// Readability title, then page title.
    pub fn best_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.page_title.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("extraction failed: {0}")]
pub struct ExtractError(pub String);

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, url: &Url) -> Result<Article, ExtractError>;
}

/// Mozilla-style readability via `dom_smoothie`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityExtractor;

impl Extractor for ReadabilityExtractor {
    fn extract(&self, html: &str, url: &Url) -> Result<Article, ExtractError> {
        let mut readability = Readability::new(html, Some(url.as_str()), None)
            .map_err(|err| ExtractError(err.to_string()))?;
        let parsed = readability
            .parse()
            .map_err(|err| ExtractError(err.to_string()))?;

        let content: &str = &parsed.content;
        if !has_text(content) {
            return Err(ExtractError("no readable content found".to_string()));
        }

        Ok(Article {
            title: non_empty(Some(parsed.title.to_string())),
            page_title: page_title(html),
            content_html: content.to_string(),
            byline: non_empty(parsed.byline.map(|b| b.to_string())),
            site_name: non_empty(parsed.site_name.map(|s| s.to_string())),
        })
    }
}

/// Text of the page's `<title>`, if any.
pub fn page_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let title_sel = Selector::parse("title").ok()?;
    doc.select(&title_sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Drops scripting elements and makes every non-fragment link absolute
/// against the document's base URL.
pub fn clean_article(doc: &mut ArticleDocument) {
    doc.remove_elements(STRIPPED_TAGS);

    let base = doc.base_url().clone();
    for id in doc.elements_by_tag("a") {
        let Some(href) = doc.element(id).and_then(|el| el.attr("href")) else {
            continue;
        };
        if href.starts_with('#') {
            continue;
        }
        let absolute = to_absolute_url(&base, href);
        doc.set_attr(id, "href", absolute);
    }
}

/// `reference` resolved against `base`; unresolvable references come back unchanged.
pub fn to_absolute_url(base: &Url, reference: &str) -> String {
    base.join(reference)
        .map(String::from)
        .unwrap_or_else(|_| reference.to_string())
}

fn has_text(fragment: &str) -> bool {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .any(|t| !t.trim().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
