//! HTML tree to Markdown.
//!
//! The cleaned article is serialized back to HTML and rendered by `htmd`
//! with ATX headings, fenced code and `-` bullets. [`Rule`]s are `htmd`
//! handlers registered per tag; extension rules are installed after the
//! base set, so a plugin can override any base behaviour.

use htmd::element_handler::{HandlerResult, Handlers};
use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use thiserror::Error;

use crate::dom::ArticleDocument;
use crate::gfm::gfm_rules;

pub type Handler = fn(&dyn Handlers, Element) -> Option<HandlerResult>;

/// Elements whose content never reaches the Markdown body.
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "template", "head"];

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub handler: Handler,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

#[derive(Debug, Error)]
#[error("markdown rendering failed: {0}")]
pub struct RenderError(pub String);

pub trait Converter {
    fn to_markdown(&self, doc: &ArticleDocument) -> Result<String, RenderError>;
}

pub struct MarkdownRenderer {
    rules: Vec<Rule>,
    converter: HtmlToMarkdown,
}

impl Default for MarkdownRenderer {
    /// Base rules with the GFM extension rules installed.
    fn default() -> Self {
        Self::new().with_rules(gfm_rules())
    }
}

impl MarkdownRenderer {
    /// Renderer with only the base rules.
    pub fn new() -> Self {
        let rules = base_rules();
        let converter = build_converter(&rules);
        Self { rules, converter }
    }

    /// Installs a rule set after the current one; later sets win over earlier ones.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self.converter = build_converter(&self.rules);
        self
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    pub fn render_html(&self, html: &str) -> Result<String, RenderError> {
        let markdown = self
            .converter
            .convert(html)
            .map_err(|err| RenderError(err.to_string()))?;
        Ok(markdown.trim_matches('\n').to_string())
    }
}

impl Converter for MarkdownRenderer {
    fn to_markdown(&self, doc: &ArticleDocument) -> Result<String, RenderError> {
        self.render_html(&doc.to_html())
    }
}

fn build_converter(rules: &[Rule]) -> HtmlToMarkdown {
    rules
        .iter()
        .fold(
            HtmlToMarkdown::builder()
                .skip_tags(SKIPPED_TAGS.to_vec())
                .options(Options {
                    heading_style: HeadingStyle::Atx,
                    bullet_list_marker: BulletListMarker::Dash,
                    code_block_style: CodeBlockStyle::Fenced,
                    code_block_fence: CodeBlockFence::Backticks,
                    ..Default::default()
                }),
            |builder, rule| builder.add_handler(rule.tags.to_vec(), rule.handler),
        )
        .build()
}

/// Delimiters and breaks that differ from `htmd`'s own defaults.
pub fn base_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "emphasis",
            tags: &["em", "i"],
            handler: |handlers, element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(wrap_inline(&content, "*")))
            },
        },
        Rule {
            name: "strong",
            tags: &["strong", "b"],
            handler: |handlers, element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(wrap_inline(&content, "**")))
            },
        },
        Rule {
            name: "lineBreak",
            tags: &["br"],
            handler: |_, _| Some(translated("  \n".to_string())),
        },
        Rule {
            name: "horizontalRule",
            tags: &["hr"],
            handler: |_, _| Some(translated(block("* * *"))),
        },
    ]
}

pub(crate) fn translated(content: String) -> HandlerResult {
    HandlerResult {
        content,
        markdown_translated: true,
    }
}

pub(crate) fn block(content: &str) -> String {
    format!("\n\n{content}\n\n")
}

/// Looks up an attribute on the element being rendered.
pub(crate) fn attr(element: &Element, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|a| a.name.local.to_string().eq_ignore_ascii_case(name))
        .map(|a| a.value.to_string())
}

/// Wraps inline content in `delimiter`, keeping surrounding whitespace outside.
pub(crate) fn wrap_inline(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return if content.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    let lead = if content.starts_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    let trail = if content.ends_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    format!("{lead}{delimiter}{trimmed}{delimiter}{trail}")
}

#[cfg(test)]
mod tests {
    use super::wrap_inline;

    #[test]
    fn inline_wrapping_moves_whitespace_outside() {
        assert_eq!(wrap_inline(" word ", "*"), " *word* ");
        assert_eq!(wrap_inline("   ", "**"), " ");
        assert_eq!(wrap_inline("", "*"), "");
    }
}
