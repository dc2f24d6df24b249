//! Explorer configuration.
//!
//! All tunables are plain data tables so a config file can replace any of
//! them without touching code.

use crate::error::{Result, ScanError};
use regex::RegexSetBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Template that fetches the target directly, bypassing any proxy.
pub const DIRECT_TEMPLATE: &str = "{raw}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Maximum number of links kept per page
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,
    /// Proxy endpoint templates, tried in order
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,
    /// Selectors for the primary content region, highest priority first
    #[serde(default = "default_content_selectors")]
    pub content_selectors: Vec<String>,
    /// Selectors for noise regions removed before link enumeration
    #[serde(default = "default_exclude_selectors")]
    pub exclude_selectors: Vec<String>,
    /// Case-insensitive regular expressions matched against raw hrefs
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_links_per_page() -> usize {
    50
}

fn default_proxies() -> Vec<String> {
    [
        "https://api.allorigins.win/raw?url={url}",
        "https://corsproxy.io/?url={url}",
        "https://api.codetabs.com/v1/proxy?quest={url}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_content_selectors() -> Vec<String> {
    [
        "main",
        "article",
        "[role='main']",
        "#content",
        "#main-content",
        ".main-content",
        ".content",
        ".post-content",
        ".article-content",
        ".entry-content",
        ".markdown-body",
        ".documentation",
        ".docs-content",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_selectors() -> Vec<String> {
    [
        "nav",
        "header",
        "footer",
        "[role='navigation']",
        "[role='banner']",
        "[role='contentinfo']",
        ".toc",
        "#toc",
        ".table-of-contents",
        ".breadcrumb",
        ".breadcrumbs",
        "[aria-label='breadcrumb']",
        ".related",
        ".related-posts",
        ".related-articles",
        ".comments",
        "#comments",
        ".comment",
        ".ad",
        ".ads",
        ".advertisement",
        "[class*='sponsor']",
        ".pagination",
        ".pager",
        ".nav-links",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    [
        r"^#",
        r"^javascript:",
        r"^mailto:",
        r"^tel:",
        r"^data:",
        r"^[^?#]*\.(pdf|zip|rar|7z|tar|gz|tgz|bz2|exe|msi|dmg|pkg|deb|rpm|iso|apk|jpe?g|png|gif|webp|svg|ico|bmp|tiff?|mp3|mp4|m4a|avi|mov|wmv|flv|mkv|webm|wav|ogg|flac|woff2?|ttf|otf|eot|css|js)([?#].*)?$",
        r"^//(cdn|static|assets|fonts|media|img|images)[.-]",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("Tendril/{} (link explorer)", env!("CARGO_PKG_VERSION"))
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_links_per_page: default_max_links_per_page(),
            proxies: default_proxies(),
            content_selectors: default_content_selectors(),
            exclude_selectors: default_exclude_selectors(),
            exclude_patterns: default_exclude_patterns(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ExplorerConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ExplorerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_links_per_page == 0 {
            return Err(ScanError::Config(
                "max_links_per_page must be at least 1".to_string(),
            ));
        }
        if self.proxies.is_empty() {
            return Err(ScanError::Config(
                "at least one proxy template is required".to_string(),
            ));
        }
        if let Some(empty) = self.proxies.iter().position(|p| p.trim().is_empty()) {
            return Err(ScanError::Config(format!("proxy template {} is empty", empty)));
        }
        RegexSetBuilder::new(&self.exclude_patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| ScanError::Config(format!("invalid exclude pattern: {}", e)))?;
        Ok(())
    }

    /// Put a direct (non-proxied) fetch in front of the proxy chain.
    pub fn with_direct_fetch(mut self) -> Self {
        if self.proxies.first().map(String::as_str) != Some(DIRECT_TEMPLATE) {
            self.proxies.insert(0, DIRECT_TEMPLATE.to_string());
        }
        self
    }

    pub fn with_max_links_per_page(mut self, cap: usize) -> Self {
        self.max_links_per_page = cap;
        self
    }

    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        self.proxies = proxies;
        self
    }
}
