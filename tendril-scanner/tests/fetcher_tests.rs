// Tests for the proxy fallback chain

use tendril_scanner::{ProxyFetcher, ScanError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const TARGET: &str = "https://example.com/docs/";

fn page_html() -> String {
    format!(
        "<html><head><title>Docs</title></head><body>{}<a href=\"/docs/a\">A</a></body></html>",
        "<p>filler</p>".repeat(10)
    )
}

fn templates(server: &MockServer, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|name| format!("{}/{}?url={{url}}", server.uri(), name))
        .collect()
}

async fn mount_ok(server: &MockServer, name: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", name)))
        .and(query_param("url", TARGET))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(page_html()),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, name: &str, status: u16, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", name)))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_falls_through_to_third_proxy() {
    let server = MockServer::start().await;

    // P1 errors, P2 answers with a body too small to be a page
    mount_status(&server, "p1", 500, 1).await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<b>rate limited</b>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_ok(&server, "p3", 2).await;

    let fetcher = ProxyFetcher::new(templates(&server, &["p1", "p2", "p3"]), 5, "tendril-test").unwrap();

    let page = fetcher.fetch(TARGET).await.unwrap();
    assert_eq!(page.proxy_index, 2);
    assert_eq!(page.url, TARGET);
    assert!(page.html.contains("/docs/a"));

    // Starting from the proxy that worked skips P1 and P2
    let page = fetcher.fetch_from(TARGET, page.proxy_index).await.unwrap();
    assert_eq!(page.proxy_index, 2);
}

#[tokio::test]
async fn test_all_proxies_exhausted() {
    let server = MockServer::start().await;
    mount_status(&server, "p1", 404, 1).await;
    mount_status(&server, "p2", 503, 1).await;

    let fetcher = ProxyFetcher::new(templates(&server, &["p1", "p2"]), 5, "tendril-test").unwrap();

    match fetcher.fetch(TARGET).await {
        Err(ScanError::AllProxiesExhausted { url, last_error }) => {
            assert_eq!(url, TARGET);
            assert!(last_error.contains("503"), "last error was {}", last_error);
        }
        other => panic!("expected AllProxiesExhausted, got {:?}", other.map(|p| p.proxy_index)),
    }
}

#[tokio::test]
async fn test_start_index_skips_earlier_proxies() {
    let server = MockServer::start().await;
    mount_ok(&server, "p1", 1).await;
    mount_ok(&server, "p2", 1).await;

    let fetcher = ProxyFetcher::new(templates(&server, &["p1", "p2"]), 5, "tendril-test").unwrap();

    let page = fetcher.fetch_from(TARGET, 1).await.unwrap();
    assert_eq!(page.proxy_index, 1);

    // The fetcher keeps no memory between calls
    let page = fetcher.fetch(TARGET).await.unwrap();
    assert_eq!(page.proxy_index, 0);
}

#[tokio::test]
async fn test_start_index_past_end_fails_without_requests() {
    let server = MockServer::start().await;
    mount_ok(&server, "p1", 0).await;

    let fetcher = ProxyFetcher::new(templates(&server, &["p1"]), 5, "tendril-test").unwrap();
    let result = fetcher.fetch_from(TARGET, 3).await;
    assert!(matches!(result, Err(ScanError::AllProxiesExhausted { .. })));
}

#[tokio::test]
async fn test_direct_template_fetches_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_html()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::new(vec!["{raw}".to_string()], 5, "tendril-test").unwrap();
    let target = format!("{}/direct/page", server.uri());
    let page = fetcher.fetch(&target).await.unwrap();
    assert_eq!(page.proxy_index, 0);
    assert!(page.html.contains("<title>Docs</title>"));
}
