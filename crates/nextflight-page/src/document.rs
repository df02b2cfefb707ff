//! Minimal access to the parts of a page this system reads.
//!
//! The decoding layers never see HTML; they see the two projections defined
//! here: ordered script bodies and the set of `href`/`src` attribute values.
//! [`Document::from_parts`] is the real boundary for callers that already
//! hold a parsed HTML tree. [`Document::parse`] is a convenience text
//! scanner for callers holding raw markup: it matches tags with regexes
//! rather than building a tree, which is all the known page shapes need.

use std::sync::LazyLock;

use regex::Regex;

/// One `<script>` element: its `id` attribute, if any, and its body.
#[derive(Debug, Clone)]
pub struct Script {
    pub id: Option<String>,
    pub text: String,
}

/// The projection of one page that decoding works from.
#[derive(Debug, Default)]
pub struct Document {
    scripts: Vec<Script>,
    urls: Vec<String>,
}

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").unwrap());

static RE_ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bid\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap());

static RE_URL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#).unwrap()
});

impl Document {
    /// Builds a document from already-extracted material, e.g. out of a real
    /// HTML tree: script nodes in document order plus every `href`/`src`
    /// attribute value.
    pub fn from_parts(scripts: Vec<Script>, urls: Vec<String>) -> Self {
        Self { scripts, urls }
    }

    /// Scans raw markup for script bodies and url-carrying attributes.
    pub fn parse(html: &str) -> Self {
        let scripts = RE_SCRIPT
            .captures_iter(html)
            .map(|caps| Script {
                id: RE_ID_ATTR
                    .captures(caps.get(1).map_or("", |m| m.as_str()))
                    .and_then(|attr| first_group(&attr))
                    .map(unescape_entities),
                text: caps.get(2).map_or("", |m| m.as_str()).to_owned(),
            })
            .collect();
        let urls = RE_URL_ATTR
            .captures_iter(html)
            .filter_map(|caps| first_group(&caps))
            .map(unescape_entities)
            .collect();
        Self { scripts, urls }
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    /// Script bodies in document order.
    pub fn script_texts(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().map(|script| script.text.as_str())
    }

    /// Bodies of every script whose `id` attribute equals `id`.
    pub fn scripts_by_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> {
        self.scripts
            .iter()
            .filter(move |script| script.id.as_deref() == Some(id))
            .map(|script| script.text.as_str())
    }

    /// Every `href`/`src` attribute value seen on the page.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Attribute values containing the given substring.
    pub fn urls_containing(&self, needle: &str) -> Vec<&str> {
        self.urls
            .iter()
            .map(String::as_str)
            .filter(|url| url.contains(needle))
            .collect()
    }
}

fn first_group<'h>(caps: &regex::Captures<'h>) -> Option<&'h str> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

/// Undoes the handful of entities that show up in attribute values.
fn unescape_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    raw.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="/_next/static/css/app.css?v=1&amp;x=2">
  <script src='/_next/static/chunks/main-abc.js'></script>
</head>
<body>
  <script id="__NEXT_DATA__" type="application/json">{"buildId":"bid"}</script>
  <script>(self.__next_f = self.__next_f || []).push([0])</script>
  <SCRIPT>self.__next_f.push([1,"0:null\n"])</SCRIPT>
</body>
</html>"#;

    #[test]
    fn scripts_are_found_in_document_order() {
        let doc = Document::parse(PAGE);
        let texts: Vec<&str> = doc.script_texts().collect();
        assert_eq!(texts.len(), 4);
        assert!(texts[1].contains("__NEXT_DATA__") || texts[1].starts_with('{'));
        assert!(texts[2].contains("self.__next_f"));
    }

    #[test]
    fn script_ids_are_captured() {
        let doc = Document::parse(PAGE);
        let bodies: Vec<&str> = doc.scripts_by_id("__NEXT_DATA__").collect();
        assert_eq!(bodies, vec![r#"{"buildId":"bid"}"#]);
    }

    #[test]
    fn url_attributes_are_collected_and_unescaped() {
        let doc = Document::parse(PAGE);
        assert_eq!(
            doc.urls(),
            &[
                "/_next/static/css/app.css?v=1&x=2".to_owned(),
                "/_next/static/chunks/main-abc.js".to_owned(),
            ]
        );
        assert_eq!(doc.urls_containing("/_next/static/").len(), 2);
        assert!(doc.urls_containing("cdn.example").is_empty());
    }

    #[test]
    fn from_parts_is_the_plain_boundary() {
        let doc = Document::from_parts(
            vec![Script {
                id: None,
                text: "var x;".to_owned(),
            }],
            vec!["/a".to_owned()],
        );
        assert_eq!(doc.script_texts().count(), 1);
        assert_eq!(doc.urls().len(), 1);
    }
}
