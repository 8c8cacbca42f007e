// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::domain::models::crawl::ScopePolicy;
use crate::utils::url_utils;

/// 链接提取器
///
/// 从HTML文档中提取出站链接。解析是同步的，
/// 调用方不应跨await点持有解析结果。
pub struct LinkExtractor;

impl LinkExtractor {
    /// 从HTML内容中提取链接
    ///
    /// 相对链接以页面URL为基准解析为绝对URL，片段、mailto和
    /// javascript伪链接被跳过，结果去重且保持文档内出现顺序。
    pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("a") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("javascript:")
            {
                continue;
            }

            let Ok(resolved) = url_utils::resolve_url(base_url, href) else {
                continue;
            };
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                continue;
            }

            let normalized = url_utils::normalize_url(resolved);
            if seen.insert(normalized.to_string()) {
                links.push(normalized);
            }
        }
        links
    }

    /// 按作用域策略过滤链接
    pub fn filter_in_scope(links: Vec<Url>, root: &Url, scope: ScopePolicy) -> Vec<Url> {
        links
            .into_iter()
            .filter(|link| scope.allows(root, link))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/dir/page.html").unwrap()
    }

    #[test]
    fn test_extract_absolute_and_relative_links() {
        let html = r#"
            <html><body>
                <a href="http://example.com/abs">abs</a>
                <a href="/rooted">rooted</a>
                <a href="sibling.html">sibling</a>
            </body></html>
        "#;
        let links = LinkExtractor::extract_links(html, &base());
        let paths: Vec<&str> = links.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/abs", "/rooted", "/dir/sibling.html"]);
    }

    #[test]
    fn test_extract_skips_pseudo_links() {
        let html = r##"
            <a href="#section">frag</a>
            <a href="mailto:someone@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="ftp://example.com/file">ftp</a>
            <a href="/real">real</a>
        "##;
        let links = LinkExtractor::extract_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].path(), "/real");
    }

    #[test]
    fn test_extract_deduplicates_preserving_order() {
        let html = r#"
            <a href="/b">b</a>
            <a href="/a">a</a>
            <a href="/b">b again</a>
            <a href="/b#frag">b with fragment</a>
        "#;
        let links = LinkExtractor::extract_links(html, &base());
        let paths: Vec<&str> = links.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }

    #[test]
    fn test_extract_strips_fragments() {
        let html = r#"<a href="/page#middle">link</a>"#;
        let links = LinkExtractor::extract_links(html, &base());
        assert_eq!(links[0].as_str(), "http://example.com/page");
    }

    #[test]
    fn test_filter_same_domain_scope() {
        let root = Url::parse("http://example.com/").unwrap();
        let links = vec![
            Url::parse("http://example.com/in").unwrap(),
            Url::parse("http://other.com/out").unwrap(),
        ];
        let kept = LinkExtractor::filter_in_scope(links.clone(), &root, ScopePolicy::SameDomain);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].host_str(), Some("example.com"));

        let all = LinkExtractor::filter_in_scope(links, &root, ScopePolicy::AllowExternal);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_extract_handles_malformed_html() {
        let html = "<html><body><a href='/ok'>unclosed<div></body>";
        let links = LinkExtractor::extract_links(html, &base());
        assert_eq!(links.len(), 1);
    }
}
