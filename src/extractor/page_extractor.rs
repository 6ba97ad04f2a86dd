use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        SELECTOR.get_or_init(|| Selector::parse($css).expect("static selector"))
    }};
}

/// Elements whose text never reaches the reader.
const HIDDEN_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HreflangLink {
    pub value: String,
    pub href: String,
}

/// Everything the analyzers need from one document, extracted in a single
/// parse. Owned data only, so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct PageSignals {
    pub url: Url,
    pub raw_html: String,
    /// Trimmed `<title>` text; `Some("")` when the tag exists but is empty.
    pub title: Option<String>,
    /// Trimmed description content; an empty `content` still counts as present.
    pub meta_description: Option<String>,
    pub has_viewport: bool,
    pub has_canonical: bool,
    pub og_property_count: usize,
    pub og_locale: Option<String>,
    /// Lowercased robots meta content.
    pub robots: Option<String>,
    pub h1_count: usize,
    pub h2_count: usize,
    pub heading_count: usize,
    pub image_count: usize,
    pub images_without_alt: usize,
    pub link_count: usize,
    pub internal_link_count: usize,
    pub json_ld_blocks: usize,
    pub schema_types: BTreeSet<String>,
    pub has_microdata: bool,
    pub has_lists: bool,
    pub has_tables: bool,
    pub paragraphs: Vec<String>,
    pub iframe_sources: Vec<String>,
    pub hreflang_links: Vec<HreflangLink>,
    pub html_lang: Option<String>,
    /// `lang` attributes in document order, including the root element's.
    pub lang_attributes: Vec<String>,
    /// Visible text with whitespace collapsed to single spaces.
    pub text: String,
    pub word_count: usize,
}

impl PageSignals {
    pub fn from_html(html: &str, url: &Url) -> Self {
        let document = Html::parse_document(html);
        PageExtractor::extract(&document, html, url)
    }

    pub fn has_schema_type(&self, schema_type: &str) -> bool {
        self.schema_types.contains(schema_type)
    }

    pub fn lowercase_text(&self) -> String {
        self.text.to_lowercase()
    }

    /// Host of the page URL, used as the "domain" label in synthesized keywords.
    pub fn domain(&self) -> String {
        self.url.host_str().unwrap_or_default().to_string()
    }
}

pub struct PageExtractor;

impl PageExtractor {
    pub fn extract(document: &Html, raw_html: &str, url: &Url) -> PageSignals {
        let text = Self::extract_visible_text(document);
        let word_count = text.split_ascii_whitespace().count();
        let (json_ld_blocks, schema_types) = Self::extract_json_ld(document);
        let (image_count, images_without_alt) = Self::count_images(document);
        let (link_count, internal_link_count) = Self::count_links(document, url);
        let html_lang = document
            .select(selector!("html"))
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        PageSignals {
            url: url.clone(),
            raw_html: raw_html.to_string(),
            title: Self::extract_title(document),
            meta_description: Self::meta_content(document, "name", "description"),
            has_viewport: Self::meta_content(document, "name", "viewport").is_some(),
            has_canonical: Self::has_link_rel(document, "canonical"),
            og_property_count: Self::count_og_properties(document),
            og_locale: Self::meta_content(document, "property", "og:locale"),
            robots: Self::meta_content(document, "name", "robots").map(|r| r.to_lowercase()),
            h1_count: document.select(selector!("h1")).count(),
            h2_count: document.select(selector!("h2")).count(),
            heading_count: document.select(selector!("h1, h2, h3, h4, h5, h6")).count(),
            image_count,
            images_without_alt,
            link_count,
            internal_link_count,
            json_ld_blocks,
            schema_types,
            has_microdata: document.select(selector!("[itemscope], [itemprop]")).next().is_some(),
            has_lists: document.select(selector!("ol, ul")).next().is_some(),
            has_tables: document.select(selector!("table")).next().is_some(),
            paragraphs: Self::extract_paragraphs(document),
            iframe_sources: Self::extract_iframe_sources(document),
            hreflang_links: Self::extract_hreflang_links(document),
            html_lang,
            lang_attributes: Self::extract_lang_attributes(document),
            text,
            word_count,
        }
    }

    pub fn extract_title(document: &Html) -> Option<String> {
        document
            .select(selector!("title"))
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// Content of the first `<meta {attr}="{value}">`, matching the value
    /// case-insensitively. A tag without `content` yields `Some("")`.
    pub fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
        document
            .select(selector!("meta"))
            .find(|el| {
                el.value()
                    .attr(attr)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
            })
            .map(|el| el.value().attr("content").unwrap_or("").trim().to_string())
    }

    pub fn has_link_rel(document: &Html, rel: &str) -> bool {
        document
            .select(selector!("link[rel]"))
            .any(|el| Self::rel_contains(&el, rel))
    }

    fn rel_contains(element: &ElementRef, rel: &str) -> bool {
        element
            .value()
            .attr("rel")
            .is_some_and(|v| v.split_whitespace().any(|token| token.eq_ignore_ascii_case(rel)))
    }

    fn count_og_properties(document: &Html) -> usize {
        document
            .select(selector!("meta[property]"))
            .filter(|el| {
                el.value()
                    .attr("property")
                    .is_some_and(|p| p.trim().to_ascii_lowercase().starts_with("og:"))
            })
            .count()
    }

    /// Returns (total images, images lacking an `alt` attribute). `alt=""`
    /// counts as present: it marks a decorative image.
    fn count_images(document: &Html) -> (usize, usize) {
        let mut count = 0;
        let mut missing_alt = 0;

        for img in document.select(selector!("img")) {
            count += 1;
            if img.value().attr("alt").is_none() {
                missing_alt += 1;
            }
        }

        (count, missing_alt)
    }

    /// Returns (all `a[href]`, internal links).
    fn count_links(document: &Html, base: &Url) -> (usize, usize) {
        let mut total = 0;
        let mut internal = 0;

        for anchor in document.select(selector!("a[href]")) {
            total += 1;
            if let Some(href) = anchor.value().attr("href") {
                if Self::is_internal_href(href, base) {
                    internal += 1;
                }
            }
        }

        (total, internal)
    }

    pub fn is_internal_href(href: &str, base: &Url) -> bool {
        let href = href.trim();
        let lower = href.to_ascii_lowercase();

        if href.is_empty()
            || lower.starts_with("javascript:")
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
            || lower.starts_with("data:")
        {
            return false;
        }

        if href.starts_with('#') {
            return true;
        }

        match base.join(href) {
            Ok(resolved) => {
                matches!(resolved.scheme(), "http" | "https")
                    && resolved.host_str() == base.host_str()
                    && resolved.port_or_known_default() == base.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    /// Returns (number of JSON-LD blocks, every `@type` declared in them).
    fn extract_json_ld(document: &Html) -> (usize, BTreeSet<String>) {
        let mut blocks = 0;
        let mut types = BTreeSet::new();

        for script in document.select(selector!("script[type]")) {
            let is_json_ld = script
                .value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
            if !is_json_ld {
                continue;
            }

            blocks += 1;
            let body = script.text().collect::<String>();
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(value) => collect_schema_types(&value, &mut types),
                Err(e) => {
                    tracing::debug!("Unparseable JSON-LD block, scanning for @type: {}", e);
                    scan_schema_types(&body, &mut types);
                }
            }
        }

        (blocks, types)
    }

    fn extract_paragraphs(document: &Html) -> Vec<String> {
        document
            .select(selector!("p"))
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn extract_iframe_sources(document: &Html) -> Vec<String> {
        document
            .select(selector!("iframe[src]"))
            .filter_map(|el| el.value().attr("src"))
            .map(|s| s.trim().to_string())
            .collect()
    }

    pub fn extract_hreflang_links(document: &Html) -> Vec<HreflangLink> {
        document
            .select(selector!("link[hreflang]"))
            .filter(|el| Self::rel_contains(el, "alternate"))
            .map(|el| HreflangLink {
                value: el.value().attr("hreflang").unwrap_or("").trim().to_string(),
                href: el.value().attr("href").unwrap_or("").trim().to_string(),
            })
            .collect()
    }

    fn extract_lang_attributes(document: &Html) -> Vec<String> {
        document
            .select(selector!("[lang]"))
            .filter_map(|el| el.value().attr("lang"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Text nodes outside hidden elements, collapsed on ASCII whitespace. A decoded
    /// `&nbsp;` stays inside its token, as it does in the markup.
    pub fn extract_visible_text(document: &Html) -> String {
        let mut words: Vec<&str> = Vec::new();

        for node in document.tree.root().descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_TEXT_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                words.extend(text.split_ascii_whitespace());
            }
        }

        words.join(" ")
    }
}

fn collect_schema_types(value: &serde_json::Value, types: &mut BTreeSet<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                if key == "@type" {
                    match child {
                        serde_json::Value::String(t) => {
                            types.insert(t.clone());
                        }
                        serde_json::Value::Array(items) => {
                            types.extend(items.iter().filter_map(|i| i.as_str()).map(String::from));
                        }
                        _ => {}
                    }
                } else {
                    collect_schema_types(child, types);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_schema_types(item, types);
            }
        }
        _ => {}
    }
}

fn scan_schema_types(body: &str, types: &mut BTreeSet<String>) {
    static TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = TYPE_PATTERN
        .get_or_init(|| Regex::new(r#""@type"\s*:\s*"([^"]+)""#).expect("static regex"));

    for caps in pattern.captures_iter(body) {
        types.insert(caps[1].to_string());
    }
}
