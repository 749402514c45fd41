//! Simple index page fetching and parsing.

use super::config::RepoConfig;
use super::error::RepoError;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Constraint recorded for artifacts without `data-requires-python`.
pub const ANY_PYTHON: &str = "*";

/// One artifact listed on a simple index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Absolute artifact URL, fragment included.
    pub url: Url,
    /// Artifact filename, e.g. `foo-1.2.3-py3-none-any.whl`.
    pub name: String,
    /// Interpreter constraint, `*` when unconstrained.
    pub python: String,
    /// sha256 hex digest from the URL fragment.
    pub digest: Option<String>,
}

/// Fetch the index page for `package` and parse its links.
///
/// # Errors
/// Returns `PKG_NOT_FOUND` on a 404, `PKG_REGISTRY_ERROR` on any other
/// unsuccessful status or transport failure.
pub async fn fetch_links(
    http: &Client,
    repo: &RepoConfig,
    package: &str,
) -> Result<Vec<LinkRecord>, RepoError> {
    let page_url = repo.package_url(package)?;
    debug!(package = %package, url = %page_url, "Fetching index page");

    let response = http.get(page_url.as_str()).send().await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(RepoError::not_found(package, page_url.as_str()));
    }

    if !response.status().is_success() {
        return Err(RepoError::registry(format!(
            "Index returned status {} for '{page_url}'",
            response.status()
        )));
    }

    let body = response.text().await?;
    let links = parse_links(&body, &page_url);
    debug!(package = %package, count = links.len(), "Parsed index page");
    Ok(links)
}

/// Parse every anchor of an index page into link records, in document order.
///
/// Anchors without an `href`, and hrefs that do not resolve to a filename,
/// are skipped.
#[must_use]
pub fn parse_links(html: &str, page_url: &Url) -> Vec<LinkRecord> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };

        let url = match page_url.join(href) {
            Ok(url) => url,
            Err(e) => {
                debug!(href = %href, error = %e, "Skipping unresolvable link");
                continue;
            }
        };

        let name = url
            .path()
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            debug!(href = %href, "Skipping link without filename");
            continue;
        }

        let python = anchor
            .value()
            .attr("data-requires-python")
            .filter(|p| !p.is_empty())
            .map_or_else(|| ANY_PYTHON.to_string(), unescape_html);

        let digest = url.fragment().and_then(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .find(|(key, _)| key == "sha256")
                .map(|(_, value)| value.into_owned())
        });

        links.push(LinkRecord {
            url,
            name,
            python,
            digest,
        });
    }

    links
}

/// Decode character references left in an attribute value.
///
/// The HTML parser already decodes one level; indexes that double-escape
/// constraints (`&amp;gt;=3.8`) still carry `&gt;` afterwards.
fn unescape_html(value: &str) -> String {
    html_escape::decode_html_entities(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://pypi.org/simple/foo/").unwrap()
    }

    #[test]
    fn test_parse_links_basic() {
        let html = r#"<!DOCTYPE html>
<html><body>
<a href="https://files.example/packages/foo-1.0-py3-none-any.whl#sha256=abc" data-requires-python="&gt;=3.8">foo-1.0-py3-none-any.whl</a>
<a href="../../packages/foo-2.0a1.tar.gz">foo-2.0a1.tar.gz</a>
</body></html>"#;

        let links = parse_links(html, &page_url());
        assert_eq!(links.len(), 2);

        assert_eq!(links[0].name, "foo-1.0-py3-none-any.whl");
        assert_eq!(links[0].python, ">=3.8");
        assert_eq!(links[0].digest.as_deref(), Some("abc"));

        assert_eq!(links[1].name, "foo-2.0a1.tar.gz");
        assert_eq!(
            links[1].url.as_str(),
            "https://pypi.org/packages/foo-2.0a1.tar.gz"
        );
        assert_eq!(links[1].python, ANY_PYTHON);
        assert_eq!(links[1].digest, None);
    }

    #[test]
    fn test_anchor_without_href_skipped() {
        let html = r#"<a>no link</a><a href="">empty</a><a href="foo-1.0.zip">ok</a>"#;
        let links = parse_links(html, &page_url());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "foo-1.0.zip");
        assert_eq!(links[0].url.as_str(), "https://pypi.org/simple/foo/foo-1.0.zip");
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"<a href="foo-3.0.zip">3</a><a href="foo-1.0.zip">1</a><a href="foo-2.0.zip">2</a>"#;
        let names: Vec<_> = parse_links(html, &page_url())
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["foo-3.0.zip", "foo-1.0.zip", "foo-2.0.zip"]);
    }

    #[test]
    fn test_fragment_with_other_hashes() {
        let html = r#"<a href="foo-1.0.zip#md5=123&amp;sha256=deadbeef">x</a>"#;
        let links = parse_links(html, &page_url());
        assert_eq!(links[0].digest.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_fragment_without_sha256() {
        let html = r#"<a href="foo-1.0.zip#md5=123">x</a>"#;
        let links = parse_links(html, &page_url());
        assert_eq!(links[0].digest, None);
    }

    #[test]
    fn test_double_escaped_requires_python() {
        let html = r#"<a href="foo-1.0.zip" data-requires-python="&amp;gt;=3.6, &amp;lt;4">x</a>"#;
        let links = parse_links(html, &page_url());
        assert_eq!(links[0].python, ">=3.6, <4");
    }

    #[test]
    fn test_unescape_html() {
        assert_eq!(unescape_html("&gt;=3.6"), ">=3.6");
        assert_eq!(unescape_html("a &amp;&amp; b"), "a && b");
        assert_eq!(unescape_html("&#62;&#x3C;"), "><");
        assert_eq!(unescape_html("& plain"), "& plain");
        assert_eq!(unescape_html("&unknown;"), "&unknown;");
        assert_eq!(unescape_html("&le;3.0"), "\u{2264}3.0");
        assert_eq!(unescape_html("!=3.0.&ast;"), "!=3.0.*");
    }

    #[test]
    fn test_link_record_json_shape() {
        let link = LinkRecord {
            url: Url::parse("https://files.example/foo-1.0.zip").unwrap(),
            name: "foo-1.0.zip".into(),
            python: ANY_PYTHON.into(),
            digest: None,
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["url"], "https://files.example/foo-1.0.zip");
        assert_eq!(json["python"], "*");
        assert!(json["digest"].is_null());
    }
}
