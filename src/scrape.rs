//! Main-content text extraction for documentation pages.
//!
//! The content root is found through an ordered list of candidates, non-content
//! subtrees are detached from the parsed tree, and headings, paragraphs and
//! preformatted blocks are serialized in document order under a character budget.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

pub const NO_CONTENT: &str = "Page found, no extractable content";
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RE: hardcoded regex is valid"));

static NON_CONTENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, nav, footer, header, form, aside, iframe")
        .expect("BUG: hardcoded non-content selector is invalid")
});

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, p, pre").expect("BUG: hardcoded block selector is invalid")
});

/// Candidate content containers, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRoot {
    DocContent,
    ContentId,
    Main,
    Article,
    Body,
}

impl ContentRoot {
    pub const PRIORITY: [ContentRoot; 5] = [
        ContentRoot::DocContent,
        ContentRoot::ContentId,
        ContentRoot::Main,
        ContentRoot::Article,
        ContentRoot::Body,
    ];

    fn css(self) -> &'static str {
        match self {
            ContentRoot::DocContent => "div.doc-content",
            ContentRoot::ContentId => "div#content",
            ContentRoot::Main => "main",
            ContentRoot::Article => "article",
            ContentRoot::Body => "body",
        }
    }

    /// First element matching this candidate
    fn find<'a>(self, document: &'a Html) -> Option<ElementRef<'a>> {
        let selector = Selector::parse(self.css()).ok()?;
        let element = document.select(&selector).next()?;
        match self {
            // The parser always synthesizes <body>; only count it when it holds markup
            ContentRoot::Body => element
                .children()
                .any(|child| child.value().is_element())
                .then_some(element),
            _ => Some(element),
        }
    }

    /// Walk the candidates until one matches
    pub fn locate(document: &Html) -> Option<(ContentRoot, ElementRef<'_>)> {
        Self::PRIORITY
            .iter()
            .find_map(|root| root.find(document).map(|element| (*root, element)))
    }
}

/// Turns documentation HTML into bounded plain text
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the page's main text.
    ///
    /// A block is never appended if it would push the running count past
    /// `max_chars`; the truncation marker is appended instead and extraction stops.
    pub fn extract(&self, html: &str, max_chars: usize) -> String {
        let mut document = Html::parse_document(html);

        let Some((root_kind, root_id)) =
            ContentRoot::locate(&document).map(|(kind, element)| (kind, element.id()))
        else {
            return NO_CONTENT.to_string();
        };
        debug!(root = ?root_kind, "Content root located");

        // Detach scripts, navigation and other chrome below the root
        let doomed: Vec<_> = match document.tree.get(root_id).and_then(ElementRef::wrap) {
            Some(root) => root.select(&NON_CONTENT_SELECTOR).map(|e| e.id()).collect(),
            None => Vec::new(),
        };
        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let Some(root) = document.tree.get(root_id).and_then(ElementRef::wrap) else {
            return NO_CONTENT.to_string();
        };

        let mut sections: Vec<String> = Vec::new();
        let mut char_count = 0usize;
        for block in root.select(&BLOCK_SELECTOR) {
            let text = visible_text(&block);
            let len = text.chars().count();
            if char_count + len > max_chars {
                sections.push(TRUNCATION_MARKER.to_string());
                break;
            }
            char_count += len;
            sections.push(text);
        }

        sections.join("\n\n")
    }
}

/// Text of an element with whitespace runs collapsed to single spaces
fn visible_text(element: &ElementRef) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE_RE.replace_all(&joined, " ").trim().to_string()
}
