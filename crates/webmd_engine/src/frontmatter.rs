use webmd_core::build_toc;

use crate::extract::Article;

/// Title used when neither readability nor the page provides one.
pub const FALLBACK_TITLE: &str = "Document";

/// Metadata block written ahead of the Markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub source_url: String,
    pub retrieved_at: String,
    pub byline: Option<String>,
    pub site_name: Option<String>,
}

impl FrontMatter {
    pub fn from_article(article: &Article, source_url: &str, retrieved_at: &str) -> Self {
        Self {
            title: document_title(article).to_string(),
            source_url: source_url.to_string(),
            retrieved_at: retrieved_at.to_string(),
            byline: article.byline.clone(),
            site_name: article.site_name.clone(),
        }
    }

    /// `---` delimited block ending in a newline.
    pub fn render(&self) -> String {
        let mut fields = vec![
            ("title", self.title.as_str()),
            ("source_url", self.source_url.as_str()),
            ("retrieved_at", self.retrieved_at.as_str()),
        ];
        if let Some(byline) = &self.byline {
            fields.push(("byline", byline.as_str()));
        }
        if let Some(site_name) = &self.site_name {
            fields.push(("site_name", site_name.as_str()));
        }

        let mut out = String::from("---\n");
        for (key, value) in fields {
            out.push_str(&format!("{key}: {}\n", quote(value)));
        }
        out.push_str("---\n");
        out
    }
}

pub fn document_title(article: &Article) -> &str {
    article.best_title().unwrap_or(FALLBACK_TITLE)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Joins front-matter, TOC and body, skipping the empty ones.
pub fn assemble_document(front_matter: Option<&FrontMatter>, toc: bool, body: &str) -> String {
    let front = front_matter.map(FrontMatter::render).unwrap_or_default();
    let toc_block = if toc { build_toc(body).unwrap_or_default() } else { String::new() };
    [front.as_str(), toc_block.as_str(), body]
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
