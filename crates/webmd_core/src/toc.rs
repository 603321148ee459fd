use std::sync::LazyLock;

use regex::Regex;

use crate::slug::slugify;

pub const TOC_HEADER: &str = "## Table of contents";

static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("heading pattern is valid"));
static CLOSING_HASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#+\s*$").expect("closing hashes pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub text: String,
    pub slug: String,
}

/// ATX heading lines of a rendered Markdown body, in order.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    markdown
        .split('\n')
        .filter_map(|line| {
            let caps = HEADING_LINE.captures(line)?;
            let level = caps[1].len();
            let text = CLOSING_HASHES.replace(&caps[2], "").trim().to_string();
            if text.is_empty() {
                return None;
            }
            let slug = slugify(&text);
            Some(Heading { level, text, slug })
        })
        .collect()
}

/// Table-of-contents block for `markdown`, or `None` when no heading below
/// level 1 exists. Level-1 headings are the document title and stay out.
///
/// Duplicate slugs are emitted as-is.
pub fn build_toc(markdown: &str) -> Option<String> {
    let entries: Vec<String> = extract_headings(markdown)
        .into_iter()
        .filter(|h| h.level > 1)
        .map(|h| {
            let indent = "  ".repeat(h.level - 2);
            format!("{indent}- [{}](#{})", h.text, h.slug)
        })
        .collect();
    if entries.is_empty() {
        return None;
    }

    let mut block = String::from(TOC_HEADER);
    block.push_str("\n\n");
    for entry in entries {
        block.push_str(&entry);
        block.push('\n');
    }
    Some(block)
}
