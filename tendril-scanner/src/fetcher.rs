use crate::config::ExplorerConfig;
use crate::error::{Result, ScanError};
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Bodies shorter than this are treated as proxy error pages.
pub const MIN_HTML_BYTES: usize = 100;

/// A page body returned by one of the proxies.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
    pub proxy_index: usize,
    pub response_time: Duration,
}

/// Fetches pages through an ordered chain of pass-through proxies.
///
/// Each template is tried once, in order, from a caller-chosen start index.
/// The first proxy that answers with something HTML-shaped wins; its index
/// comes back in [`FetchedPage::proxy_index`] so the caller can start there
/// next time.
pub struct ProxyFetcher {
    client: Client,
    templates: Vec<String>,
}

impl ProxyFetcher {
    pub fn new(templates: Vec<String>, timeout_secs: u64, user_agent: &str) -> Result<Self> {
        if templates.is_empty() {
            return Err(ScanError::Config(
                "at least one proxy template is required".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            templates,
        })
    }

    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        Self::new(config.proxies.clone(), config.timeout_secs, &config.user_agent)
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Build the request URL for `target` from a proxy template.
    ///
    /// `{url}` is replaced by the form-encoded target and `{raw}` by the target
    /// as-is. Templates with neither get the encoded target appended.
    pub fn proxy_url(template: &str, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        if template.contains("{url}") {
            template.replace("{url}", &encoded)
        } else if template.contains("{raw}") {
            template.replace("{raw}", target)
        } else {
            format!("{}{}", template, encoded)
        }
    }

    /// Walk the whole chain, starting from the first proxy.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.fetch_from(url, 0).await
    }

    /// Try each proxy from `start_index` onward until one returns HTML.
    pub async fn fetch_from(&self, url: &str, start_index: usize) -> Result<FetchedPage> {
        let mut last_error: Option<ScanError> = None;

        for (index, template) in self.templates.iter().enumerate().skip(start_index) {
            let started = Instant::now();
            match self.try_proxy(template, url).await {
                Ok(html) => {
                    let response_time = started.elapsed();
                    info!(
                        "Fetched {} via proxy {} ({} bytes, {:?})",
                        url,
                        index,
                        html.len(),
                        response_time
                    );
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        html,
                        proxy_index: index,
                        response_time,
                    });
                }
                Err(e) => {
                    warn!("Proxy {} failed for {}: {}", index, url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ScanError::AllProxiesExhausted {
            url: url.to_string(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("no proxy at or after index {}", start_index)),
        })
    }

    async fn try_proxy(&self, template: &str, url: &str) -> Result<String> {
        let request_url = Self::proxy_url(template, url);
        debug!("GET {}", request_url);

        let response = self
            .client
            .get(&request_url)
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::BadStatus(status.as_u16()));
        }

        let body = response.text().await?;
        if !looks_like_html(&body) {
            return Err(ScanError::MalformedResponse(format!(
                "{} byte body does not look like HTML",
                body.len()
            )));
        }

        Ok(body)
    }
}

pub fn looks_like_html(body: &str) -> bool {
    body.len() >= MIN_HTML_BYTES && body.contains('<')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_url_encodes_target() {
        let url = ProxyFetcher::proxy_url(
            "https://proxy.test/raw?url={url}",
            "https://example.com/a b?x=1&y=2",
        );
        assert_eq!(
            url,
            "https://proxy.test/raw?url=https%3A%2F%2Fexample.com%2Fa+b%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn test_proxy_url_raw_and_appended() {
        assert_eq!(
            ProxyFetcher::proxy_url("{raw}", "https://example.com/"),
            "https://example.com/"
        );
        assert_eq!(
            ProxyFetcher::proxy_url("https://corsproxy.test/?", "https://example.com/"),
            "https://corsproxy.test/?https%3A%2F%2Fexample.com%2F"
        );
    }

    #[test]
    fn test_looks_like_html() {
        assert!(!looks_like_html("<html></html>"));
        assert!(!looks_like_html(&"x".repeat(200)));
        let page = format!("<html><body>{}</body></html>", "y".repeat(100));
        assert!(looks_like_html(&page));
    }

    #[test]
    fn test_new_rejects_empty_chain() {
        let result = ProxyFetcher::new(vec![], 5, "test");
        assert!(matches!(result, Err(ScanError::Config(_))));
    }
}
