use serde::{Deserialize, Serialize};

/// One qualifying outbound link found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    pub is_external: bool,
    pub domain: String,
}

/// Result of running the extractor over one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub title: String,
    pub links: Vec<LinkRecord>,
    /// Distinct qualifying links seen before the per-page cap was applied.
    pub total_found: usize,
    pub was_truncated: bool,
}

impl Extraction {
    pub fn empty(title: String) -> Self {
        Self {
            title,
            links: Vec::new(),
            total_found: 0,
            was_truncated: false,
        }
    }

    pub fn internal_count(&self) -> usize {
        self.links.iter().filter(|l| !l.is_external).count()
    }

    pub fn external_count(&self) -> usize {
        self.links.len() - self.internal_count()
    }
}
