//! Pulls HTML and CSS out of free-form completion text.
//!
//! Each artifact has an ordered list of named strategies. The first one that
//! yields non-empty text wins; later ones are never consulted.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::ExtractedArtifacts;

/// `HTML:` label, then everything from the first tag up to a `CSS:` label
/// opening a line. Inline mentions such as `<!-- Layout CSS: ... -->` do not end it.
static LABELED_HTML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)HTML:.*?(<[^>]*>.*?)(?:(?m:^)[ \t*#]*CSS:|\z)").expect("Valid regex pattern")
});

static HTML_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<html.*</html>").expect("Valid regex pattern"));

/// `CSS:` label opening a line, through to the next line-leading `HTML:` label or the end.
static LINE_LABELED_CSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(?m:^)[ \t*#]*CSS:(.*?)(?:(?m:^)[ \t*#]*HTML:|\z)").expect("Valid regex pattern")
});

/// `CSS:` anywhere, e.g. "And here is the CSS:".
static LABELED_CSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)CSS:(.*?)(?:HTML:|\z)").expect("Valid regex pattern")
});

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").expect("Valid regex pattern"));

static STYLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?style[^>]*>").expect("Valid regex pattern"));

static LEADING_DOCTYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\A\s*<!DOCTYPE[^>]*>\s*").expect("Valid regex pattern"));

pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` or an empty string both mean "no match".
    fn extract(&self, text: &str) -> Option<String>;
}

pub struct LabeledHtml;

impl ExtractionStrategy for LabeledHtml {
    fn name(&self) -> &'static str { "labeled-html" }

    fn extract(&self, text: &str) -> Option<String> {
        LABELED_HTML
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

pub struct HtmlDocument;

impl ExtractionStrategy for HtmlDocument {
    fn name(&self) -> &'static str { "html-document" }

    fn extract(&self, text: &str) -> Option<String> {
        HTML_DOCUMENT.find(text).map(|m| m.as_str().to_string())
    }
}

/// Last resort: the model ignored the template entirely.
pub struct WholeResponse;

impl ExtractionStrategy for WholeResponse {
    fn name(&self) -> &'static str { "whole-response" }

    fn extract(&self, text: &str) -> Option<String> {
        Some(text.trim().to_string())
    }
}

pub struct LabeledCss;

impl ExtractionStrategy for LabeledCss {
    fn name(&self) -> &'static str { "labeled-css" }

    fn extract(&self, text: &str) -> Option<String> {
        LINE_LABELED_CSS
            .captures(text)
            .or_else(|| LABELED_CSS.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

pub struct StyleBlock;

impl ExtractionStrategy for StyleBlock {
    fn name(&self) -> &'static str { "style-block" }

    fn extract(&self, text: &str) -> Option<String> {
        if !text.contains("</style>") {
            return None;
        }
        STYLE_BLOCK
            .find(text)
            .map(|m| strip_style_tags(m.as_str()))
    }
}

pub static HTML_STRATEGIES: &[&dyn ExtractionStrategy] = &[&LabeledHtml, &HtmlDocument, &WholeResponse];

pub static CSS_STRATEGIES: &[&dyn ExtractionStrategy] = &[&LabeledCss, &StyleBlock];

/// Runs strategies in order and returns the first non-empty result with its name.
pub fn first_match(strategies: &[&dyn ExtractionStrategy], text: &str) -> Option<(&'static str, String)> {
    strategies.iter().find_map(|strategy| {
        strategy
            .extract(text)
            .filter(|found| !found.trim().is_empty())
            .map(|found| (strategy.name(), found))
    })
}

pub fn strip_style_tags(css: &str) -> String {
    STYLE_TAG.replace_all(css, "").trim().to_string()
}

/// Keeps only the body of a Markdown fence: drops an opening fence line and
/// everything from the closing fence line onward.
pub fn strip_code_fence(text: &str) -> String {
    let mut body = text.trim();
    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => "",
        };
    }
    if let Some(end) = closing_fence_offset(body) {
        body = &body[..end];
    }
    if let Some(stripped) = body.trim_end().strip_suffix("```") {
        body = stripped;
    }
    body.trim().to_string()
}

fn closing_fence_offset(body: &str) -> Option<usize> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim() == "```" {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Removes a leading `<!DOCTYPE ...>` so the writer can emit exactly one.
pub fn strip_leading_doctype(html: &str) -> &str {
    match LEADING_DOCTYPE.find(html) {
        Some(m) => &html[m.end()..],
        None => html,
    }
}

pub fn extract_artifacts(text: &str) -> ExtractedArtifacts {
    let html = first_match(HTML_STRATEGIES, text).map(|(name, html)| {
        debug!("HTML matched by {}", name);
        strip_code_fence(&html)
    });

    let css = first_match(CSS_STRATEGIES, text).map(|(name, css)| {
        debug!("CSS matched by {}", name);
        strip_style_tags(&strip_code_fence(&css))
    });

    ExtractedArtifacts {
        html: html.filter(|h| !h.is_empty()),
        css: css.filter(|c| !c.is_empty()),
    }
}
