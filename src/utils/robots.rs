// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

use async_trait::async_trait;

use crate::utils::retry_policy::RetryPolicy;

/// Robots.txt检查器接口
#[async_trait]
pub trait RobotsCheckerTrait: Send + Sync {
    /// 检查URL是否被允许访问
    async fn is_allowed(&self, url: &Url, user_agent: &str) -> Result<bool>;
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    /// 内容
    content: String,

    /// 过期时间
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 按主机抓取并缓存robots.txt，缓存有效期一小时。
#[derive(Clone)]
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 内存缓存
    memory_cache: Arc<Mutex<HashMap<String, CachedRobots>>>,

    /// 重试策略
    retry_policy: RetryPolicy,

    /// 抓取robots.txt时使用的User-Agent
    user_agent: String,
}

#[async_trait]
impl RobotsCheckerTrait for RobotsChecker {
    async fn is_allowed(&self, url: &Url, user_agent: &str) -> Result<bool> {
        let content = self.get_robots_content(url).await?;
        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&content, user_agent, url.as_str()))
    }
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    pub fn new(user_agent: String) -> Self {
        Self {
            client: Client::new(),
            memory_cache: Arc::new(Mutex::new(HashMap::new())),
            retry_policy: RetryPolicy::fast(),
            user_agent,
        }
    }

    /// 获取Robots.txt内容（带缓存）
    async fn get_robots_content(&self, url: &Url) -> Result<String> {
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid URL: no host"))?;
        let scheme = url.scheme();
        let port = url.port_or_known_default().unwrap_or(80);

        let robots_url = format!("{}://{}:{}/robots.txt", scheme, host, port);

        // 1. Check memory cache
        {
            let mut cache = self
                .memory_cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(cached) = cache.get(&robots_url) {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.content.clone());
                } else {
                    cache.remove(&robots_url);
                }
            }
        }

        // 2. Fetch robots.txt with retry
        let mut attempt = 0;
        let mut content = String::new();
        let mut last_error = None;

        while attempt < self.retry_policy.max_retries {
            attempt += 1;
            let response = self
                .client
                .get(&robots_url)
                .header("User-Agent", &self.user_agent)
                .timeout(Duration::from_secs(5))
                .send()
                .await;

            match response {
                Ok(resp) => {
                    if resp.status().is_success() {
                        content = resp.text().await.unwrap_or_default();
                        last_error = None;
                        break;
                    } else if resp.status() == reqwest::StatusCode::NOT_FOUND {
                        // 404 is a valid response, meaning no robots.txt
                        content = String::new();
                        last_error = None;
                        break;
                    } else if resp.status().is_server_error() {
                        last_error = Some(anyhow::anyhow!("Server error: {}", resp.status()));
                    } else {
                        // Other statuses (403 etc.) are treated as "no rules"
                        content = String::new();
                        last_error = None;
                        break;
                    }
                }
                Err(e) => {
                    last_error = Some(anyhow::anyhow!("Request failed: {}", e));
                }
            }

            if attempt < self.retry_policy.max_retries {
                let backoff = self.retry_policy.calculate_backoff(attempt);
                tokio::time::sleep(backoff).await;
            }
        }

        if let Some(err) = last_error {
            tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, err);
            // Default to empty content on persistent error
            content = String::new();
        }

        // 3. Update memory cache
        {
            let mut cache = self
                .memory_cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cache.insert(
                robots_url,
                CachedRobots {
                    content: content.clone(),
                    expires_at: Instant::now() + Duration::from_secs(3600), // Cache for 1 hour
                },
            );
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_disallowed_path_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: *\nDisallow: /private/\n"),
            )
            .mount(&server)
            .await;

        let checker = RobotsChecker::new("deepcrawl-test".to_string());
        let blocked = Url::parse(&format!("{}/private/page", server.uri())).unwrap();
        let open = Url::parse(&format!("{}/public", server.uri())).unwrap();

        assert!(!checker.is_allowed(&blocked, "deepcrawl-test").await.unwrap());
        assert!(checker.is_allowed(&open, "deepcrawl-test").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = MockServer::start().await;
        // No mounts: every request 404s

        let checker = RobotsChecker::new("deepcrawl-test".to_string());
        let url = Url::parse(&format!("{}/anything", server.uri())).unwrap();
        assert!(checker.is_allowed(&url, "deepcrawl-test").await.unwrap());
    }
}
