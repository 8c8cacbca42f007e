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

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::domain::models::crawl::CrawlJob;
use crate::domain::models::page::{FrontierEntry, PageOutcome, PageRecord};
use crate::domain::services::link_extractor::LinkExtractor;
use crate::domain::services::politeness::PolitenessGate;
use crate::domain::services::result_store::ResultStore;
use crate::engines::traits::{FetchError, FetchRequest, FetchResponse, HttpFetcher};
use crate::queue::frontier::{Frontier, TakeOutcome};
use crate::utils::retry_policy::RetryPolicy;

/// 抓取工作器
///
/// 从前沿循环取条目抓取，直到前沿排空。工作器数量即作业的并发上限。
pub struct FetchWorker {
    worker_id: usize,
    engine: Arc<dyn HttpFetcher>,
    politeness: Arc<PolitenessGate>,
    frontier: Arc<Frontier>,
    store: Arc<ResultStore>,
    /// 根URL传输失败时写入原因，使整个作业失败
    root_failure: Arc<Mutex<Option<String>>>,
    retry_policy: RetryPolicy,
    cancel: watch::Receiver<bool>,
    job: Arc<CrawlJob>,
}

impl FetchWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        worker_id: usize,
        engine: Arc<dyn HttpFetcher>,
        politeness: Arc<PolitenessGate>,
        frontier: Arc<Frontier>,
        store: Arc<ResultStore>,
        root_failure: Arc<Mutex<Option<String>>>,
        retry_policy: RetryPolicy,
        cancel: watch::Receiver<bool>,
        job: Arc<CrawlJob>,
    ) -> Self {
        Self {
            worker_id,
            engine,
            politeness,
            frontier,
            store,
            root_failure,
            retry_policy,
            cancel,
            job,
        }
    }

    /// 工作器主循环
    pub async fn run(self) {
        debug!(worker_id = self.worker_id, "fetch worker started");
        loop {
            match self.frontier.take().await {
                TakeOutcome::Drained => break,
                TakeOutcome::Entry(entry) => {
                    if !*self.cancel.borrow() {
                        self.process(entry).await;
                    }
                    self.frontier.complete();
                }
            }
        }
        debug!(worker_id = self.worker_id, "fetch worker stopped");
    }

    /// 处理单个前沿条目
    #[instrument(skip(self, entry), fields(worker_id = self.worker_id, url = %entry.url, depth = entry.depth))]
    async fn process(&self, entry: FrontierEntry) {
        // A robots-denied URL is never fetched and never recorded
        if !self.politeness.allowed(&entry.url).await {
            debug!("skipped by robots.txt");
            metrics::counter!("deepcrawl_robots_denied_total").increment(1);
            return;
        }

        let permit = self.politeness.acquire(&entry.url).await;
        let result = self.fetch_with_retry(&entry).await;
        drop(permit);

        match result {
            Ok(response) => self.record_response(&entry, response),
            Err(err) => {
                metrics::counter!("deepcrawl_fetch_errors_total").increment(1);
                if entry.depth == 0 {
                    // Root transport failure after retries is fatal for the job
                    warn!(error = %err, "root fetch failed");
                    *self.root_failure.lock() = Some(err.to_string());
                    self.frontier.close();
                    return;
                }
                warn!(error = %err, "page fetch failed");
                self.store.append(PageRecord {
                    url: entry.url.to_string(),
                    depth: entry.depth,
                    status: None,
                    outcome: PageOutcome::FetchFailed {
                        reason: err.to_string(),
                    },
                    bytes: 0,
                    duration_ms: 0,
                    links_found: 0,
                    discovered_at: entry.discovered_at,
                });
            }
        }
    }

    /// 记录响应并提议子链接
    fn record_response(&self, entry: &FrontierEntry, response: FetchResponse) {
        let links = if response.is_success() && response.is_html() {
            LinkExtractor::extract_links(&response.body, &entry.url)
        } else {
            Vec::new()
        };

        let outcome = if response.status < 400 {
            PageOutcome::Fetched
        } else {
            PageOutcome::HttpError
        };
        self.store.append(PageRecord {
            url: entry.url.to_string(),
            depth: entry.depth,
            status: Some(response.status),
            outcome,
            bytes: response.body_bytes,
            duration_ms: response.elapsed_ms,
            links_found: links.len(),
            discovered_at: entry.discovered_at,
        });
        metrics::counter!("deepcrawl_pages_fetched_total").increment(1);

        if entry.depth >= self.job.max_depth {
            return;
        }
        let in_scope = LinkExtractor::filter_in_scope(links, &self.job.root_url, self.job.scope);
        for link in in_scope {
            self.frontier
                .offer(FrontierEntry::child(link, entry.depth + 1, &entry.url));
        }
    }

    /// 带重试的抓取
    ///
    /// 传输层失败与5xx响应重试，4xx与成功响应立即返回。
    async fn fetch_with_retry(&self, entry: &FrontierEntry) -> Result<FetchResponse, FetchError> {
        let request = FetchRequest {
            url: entry.url.clone(),
            timeout: self.job.fetch_timeout,
        };
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let result = self.engine.fetch(&request).await;
            let retryable = match &result {
                Ok(response) => response.status >= 500,
                Err(err) => err.is_retryable(),
            };
            if !retryable || !self.retry_policy.should_retry(attempt) {
                return result;
            }

            let backoff = self.retry_policy.calculate_backoff(attempt);
            debug!(
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "retrying fetch"
            );
            metrics::counter!("deepcrawl_fetch_retries_total").increment(1);
            tokio::time::sleep(backoff).await;
            if *self.cancel.borrow() {
                return result;
            }
        }
    }
}
