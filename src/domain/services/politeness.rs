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

use dashmap::DashMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;
use url::Url;

use crate::config::settings::CrawlerSettings;
use crate::utils::robots::{RobotsChecker, RobotsCheckerTrait};

/// 主机许可
///
/// 持有期间占用目标主机的一个并发槽位，释放即归还。
pub struct HostPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

/// 礼貌性门禁
///
/// 在全局并发之外按主机限制压力：每主机并发信号量、
/// 每主机速率限制与可选的robots.txt检查。
pub struct PolitenessGate {
    /// 每主机并发信号量
    host_semaphores: DashMap<String, Arc<Semaphore>>,
    /// 每主机速率限制器
    rate_limiter: DefaultKeyedRateLimiter<String>,
    /// Robots.txt检查器，配置关闭时为None
    robots: Option<Arc<dyn RobotsCheckerTrait>>,
    per_host_limit: usize,
    user_agent: String,
}

impl PolitenessGate {
    /// 根据爬虫配置创建门禁
    pub fn new(settings: &CrawlerSettings) -> Self {
        let rps = NonZeroU32::new(settings.per_host_rps.max(1)).unwrap_or(NonZeroU32::MIN);
        let robots = settings
            .respect_robots_txt
            .then(|| {
                Arc::new(RobotsChecker::new(settings.user_agent.clone()))
                    as Arc<dyn RobotsCheckerTrait>
            });
        Self {
            host_semaphores: DashMap::new(),
            rate_limiter: RateLimiter::keyed(Quota::per_second(rps)),
            robots,
            per_host_limit: settings.per_host_limit.max(1),
            user_agent: settings.user_agent.clone(),
        }
    }

    /// 检查URL是否被robots.txt允许
    ///
    /// 检查器关闭或robots.txt本身获取失败时放行。
    pub async fn allowed(&self, url: &Url) -> bool {
        let Some(checker) = &self.robots else {
            return true;
        };
        match checker.is_allowed(url, &self.user_agent).await {
            Ok(allowed) => allowed,
            Err(e) => {
                debug!(url = %url, error = %e, "robots check failed, allowing");
                true
            }
        }
    }

    /// 获取目标主机的抓取许可
    ///
    /// 先等待该主机的速率限制窗口，再占用一个并发槽位。
    /// 返回的许可在整个抓取期间持有。
    pub async fn acquire(&self, url: &Url) -> HostPermit {
        let host = url.host_str().unwrap_or_default().to_string();

        // Clone the Arc and drop the map guard before any await
        let semaphore = self
            .host_semaphores
            .entry(host.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host_limit)))
            .value()
            .clone();

        self.rate_limiter.until_key_ready(&host).await;
        // The semaphore is never closed, so acquisition only fails on close
        let permit = semaphore.acquire_owned().await.ok();
        HostPermit { _permit: permit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn settings(per_host_limit: usize, per_host_rps: u32) -> CrawlerSettings {
        CrawlerSettings {
            max_concurrency: 8,
            per_host_limit,
            per_host_rps,
            fetch_timeout_secs: 30,
            job_timeout_secs: 300,
            cancel_grace_secs: 5,
            max_retries: 3,
            max_pages: 1000,
            max_body_bytes: 2 * 1024 * 1024,
            default_max_depth: 2,
            summary_sample_size: 3,
            include_external: false,
            respect_robots_txt: false,
            user_agent: "deepcrawl-test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_allowed_without_robots_checker() {
        let gate = PolitenessGate::new(&settings(2, 100));
        let url = Url::parse("http://example.com/anything").unwrap();
        assert!(gate.allowed(&url).await);
    }

    #[tokio::test]
    async fn test_per_host_concurrency_is_limited() {
        let gate = Arc::new(PolitenessGate::new(&settings(1, 1000)));
        let url = Url::parse("http://example.com/").unwrap();

        let first = gate.acquire(&url).await;

        // A second acquire on the same host must wait for the first permit
        let second = {
            let gate = gate.clone();
            let url = url.clone();
            tokio::spawn(async move {
                gate.acquire(&url).await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(!second.is_finished());

        drop(first);
        second.await.unwrap();
    }

    #[tokio::test]
    async fn test_distinct_hosts_do_not_block_each_other() {
        let gate = PolitenessGate::new(&settings(1, 1000));
        let a = Url::parse("http://a.example.com/").unwrap();
        let b = Url::parse("http://b.example.com/").unwrap();

        let start = Instant::now();
        let _pa = gate.acquire(&a).await;
        let _pb = gate.acquire(&b).await;
        assert!(start.elapsed() < std::time::Duration::from_millis(500));
    }
}
