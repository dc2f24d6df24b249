//! URL normalization.
//!
//! Every link the explorer stores goes through [`normalize_url`], so two
//! anchors that point at the same resource compare equal as strings.

use url::Url;

/// Resolve `href` against an optional `base` and canonicalize the result.
///
/// Returns `None` for anything that is not an absolute `http`/`https` URL
/// once resolved. The fragment is always dropped and an empty path becomes
/// `/`. Host case, default ports and dot segments are canonicalized by the
/// `url` parser.
pub fn normalize_url(href: &str, base: Option<&Url>) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = match base {
        // join() covers `//host/path`, `/path` and directory-relative paths,
        // and leaves hrefs that already carry a scheme untouched.
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    if url.host_str().is_none_or(str::is_empty) {
        return None;
    }

    url.set_fragment(None);
    if url.path().is_empty() {
        url.set_path("/");
    }

    Some(url)
}

/// String form of [`normalize_url`], for callers holding raw strings.
pub fn normalize_str(href: &str, base: Option<&str>) -> Option<String> {
    let base = match base {
        Some(b) => Some(Url::parse(b).ok()?),
        None => None,
    };
    normalize_url(href, base.as_ref()).map(String::from)
}

/// Hostname of `url`, or an empty string when it has none.
pub fn host_of(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_string()
}
