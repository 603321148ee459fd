//! Owned, mutable article tree.
//!
//! `scraper` parses the HTML; the result is copied into an `ego_tree` arena
//! whose element attributes can be rewritten in place and whose nodes can be
//! detached. Node ids stay valid for the life of the document.

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};
use scraper::Html;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>, attrs: Vec<(String, String)>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs,
        }
    }

    /// Lowercase tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attrs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(index).1)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

pub struct ArticleDocument {
    tree: Tree<DomNode>,
    base_url: Url,
}

impl ArticleDocument {
    /// Parses an HTML fragment into a fresh tree scoped to `base_url`.
    pub fn parse_fragment(html: &str, base_url: Url) -> Self {
        let parsed = Html::parse_fragment(html);
        let mut tree = Tree::new(DomNode::Document);
        // Fragment parsing wraps the content in a synthetic <html> element.
        copy_children(parsed.root_element(), &mut tree.root_mut());
        Self { tree, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn root(&self) -> NodeRef<'_, DomNode> {
        self.tree.root()
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, DomNode>> {
        self.tree.get(id)
    }

    /// Ids of attached elements named `tag`, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.tree
            .root()
            .descendants()
            .filter(|node| match node.value() {
                DomNode::Element(el) => el.name().eq_ignore_ascii_case(tag),
                _ => false,
            })
            .map(|node| node.id())
            .collect()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.tree.get(id)?.value() {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(mut node) = self.tree.get_mut(id) {
            if let DomNode::Element(el) = node.value() {
                el.set_attr(name, value);
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let mut node = self.tree.get_mut(id)?;
        match node.value() {
            DomNode::Element(el) => el.remove_attr(name),
            _ => None,
        }
    }

    /// Detaches the node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Removes every element named in `tags`; returns how many were removed.
    pub fn remove_elements(&mut self, tags: &[&str]) -> usize {
        let ids: Vec<NodeId> = tags
            .iter()
            .flat_map(|tag| self.elements_by_tag(tag))
            .collect();
        for id in &ids {
            self.remove(*id);
        }
        ids.len()
    }

    pub fn text_content(&self) -> String {
        text_of(self.tree.root())
    }

    /// Serializes the tree back to HTML markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self.tree.root(), &mut out);
        out
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn write_html(node: NodeRef<'_, DomNode>, out: &mut String) {
    match node.value() {
        DomNode::Document => {
            for child in node.children() {
                write_html(child, out);
            }
        }
        DomNode::Text(text) => escape_into(text, false, out),
        DomNode::Element(el) => {
            out.push('<');
            out.push_str(el.name());
            for (key, value) in el.attrs() {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.name()) {
                return;
            }
            for child in node.children() {
                write_html(child, out);
            }
            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

/// Concatenated text of `node` and its descendants.
pub fn text_of(node: NodeRef<'_, DomNode>) -> String {
    node.descendants()
        .filter_map(|n| match n.value() {
            DomNode::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn copy_children(source: scraper::ElementRef<'_>, target: &mut NodeMut<'_, DomNode>) {
    for child in source.children() {
        copy_node(child, target);
    }
}

fn copy_node(source: NodeRef<'_, scraper::Node>, target: &mut NodeMut<'_, DomNode>) {
    let value = match source.value() {
        scraper::Node::Element(el) => DomNode::Element(ElementData::new(
            el.name(),
            el.attrs()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )),
        scraper::Node::Text(text) => {
            let text: &str = text;
            DomNode::Text(text.to_string())
        }
        // Comments, doctypes and processing instructions carry no content.
        _ => return,
    };
    let mut appended = target.append(value);
    for child in source.children() {
        copy_node(child, &mut appended);
    }
}
