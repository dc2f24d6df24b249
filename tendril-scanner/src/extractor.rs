//! Content-aware link extraction.
//!
//! The extractor narrows a page down to its primary content region, strips
//! navigation-style noise from it and returns the distinct outbound links
//! that remain, in document order.

use crate::config::ExplorerConfig;
use crate::error::{Result, ScanError};
use crate::normalize::{host_of, normalize_url};
use crate::result::{Extraction, LinkRecord};
use regex::{RegexSet, RegexSetBuilder};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Anchor labels longer than this are cut.
pub const MAX_TEXT_CHARS: usize = 200;

pub struct LinkExtractor {
    content_selectors: Vec<Selector>,
    exclude_selectors: Vec<Selector>,
    exclude_patterns: RegexSet,
    max_links: usize,
    anchor_selector: Selector,
    title_selector: Selector,
    body_selector: Selector,
}

impl LinkExtractor {
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        let exclude_patterns = RegexSetBuilder::new(&config.exclude_patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| ScanError::Config(format!("invalid exclude pattern: {}", e)))?;

        Ok(Self {
            content_selectors: compile_selectors(&config.content_selectors),
            exclude_selectors: compile_selectors(&config.exclude_selectors),
            exclude_patterns,
            max_links: config.max_links_per_page,
            anchor_selector: fixed_selector("a[href]")?,
            title_selector: fixed_selector("title")?,
            body_selector: fixed_selector("body")?,
        })
    }

    /// Whether a raw href is rejected before normalization.
    pub fn is_excluded_href(&self, href: &str) -> bool {
        self.exclude_patterns.is_match(href.trim())
    }

    pub fn extract(&self, html: &str, source: &Url) -> Extraction {
        let mut document = Html::parse_document(html);
        let title = self
            .page_title(&document)
            .unwrap_or_else(|| host_of(source));

        let region_id = self.content_region(&document).id();

        // Collect first, then detach: the tree can't be mutated while
        // selections borrow it.
        let noise: Vec<_> = match document.tree.get(region_id).and_then(ElementRef::wrap) {
            Some(region) => self
                .exclude_selectors
                .iter()
                .flat_map(|selector| region.select(selector))
                .map(|element| element.id())
                .filter(|id| *id != region_id)
                .collect(),
            None => Vec::new(),
        };
        debug!("Removing {} noise element(s) from content region", noise.len());
        for id in noise {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let Some(region) = document.tree.get(region_id).and_then(ElementRef::wrap) else {
            return Extraction::empty(title);
        };

        let source_key = normalize_url(source.as_str(), None)
            .map(String::from)
            .unwrap_or_else(|| source.to_string());
        let source_host = host_of(source);

        let mut seen: HashSet<String> = HashSet::new();
        let mut links = Vec::new();
        let mut total_found = 0;

        for anchor in region.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if href.trim().is_empty() || self.is_excluded_href(href) {
                debug!("Skipping excluded href {:?}", href);
                continue;
            }
            let Some(url) = normalize_url(href, Some(source)) else {
                debug!("Skipping unusable href {:?}", href);
                continue;
            };
            let key = url.to_string();
            if key == source_key || !seen.insert(key.clone()) {
                continue;
            }

            total_found += 1;
            if links.len() < self.max_links {
                let domain = host_of(&url);
                links.push(LinkRecord {
                    text: link_text(&anchor, &url),
                    is_external: domain != source_host,
                    domain,
                    url: key,
                });
            }
        }

        let was_truncated = total_found > self.max_links;
        if was_truncated {
            debug!(
                "Truncated {} links on {} to {}",
                total_found, source, self.max_links
            );
        }

        Extraction {
            title,
            links,
            total_found,
            was_truncated,
        }
    }

    /// First element matching the content selectors, in priority order.
    /// Falls back to `<body>`, then to the root element.
    fn content_region<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        self.content_selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
            .or_else(|| document.select(&self.body_selector).next())
            .unwrap_or_else(|| document.root_element())
    }

    fn page_title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.title_selector)
            .next()
            .map(|t| collapse_whitespace(t.text()))
            .filter(|t| !t.is_empty())
    }
}

fn compile_selectors(sources: &[String]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Ignoring invalid selector {:?}: {}", s, e);
                None
            }
        })
        .collect()
}

fn fixed_selector(source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|e| ScanError::Config(format!("{}: {}", source, e)))
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in parts.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Display label for a link: its anchor text, else the last path segment,
/// else the hostname.
fn link_text(anchor: &ElementRef<'_>, url: &Url) -> String {
    let text = collapse_whitespace(anchor.text());
    if !text.is_empty() {
        return text.chars().take(MAX_TEXT_CHARS).collect();
    }

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.to_string())
        .unwrap_or_else(|| host_of(url))
}
