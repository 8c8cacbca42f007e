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
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::config::settings::CrawlerSettings;
use crate::domain::models::crawl::{CrawlJob, CrawlState};
use crate::domain::models::page::FrontierEntry;
use crate::domain::models::summary::CrawlSummary;
use crate::domain::services::politeness::PolitenessGate;
use crate::domain::services::result_store::ResultStore;
use crate::engines::traits::HttpFetcher;
use crate::queue::frontier::Frontier;
use crate::utils::errors::CrawlError;
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::url_utils;
use crate::workers::fetch_worker::FetchWorker;

/// 爬取协调器
///
/// 驱动单个作业的完整生命周期：播种根URL、启动固定数量的
/// 工作器、监督作业超时与取消、在前沿排空后汇总结果。
pub struct CrawlCoordinator {
    engine: Arc<dyn HttpFetcher>,
    politeness: Arc<PolitenessGate>,
    retry_policy: RetryPolicy,
    /// 取消后等待进行中抓取自然结束的宽限时间
    cancel_grace: Duration,
}

impl CrawlCoordinator {
    /// 创建新的协调器
    pub fn new(
        engine: Arc<dyn HttpFetcher>,
        politeness: Arc<PolitenessGate>,
        settings: &CrawlerSettings,
    ) -> Self {
        Self {
            engine,
            politeness,
            retry_policy: RetryPolicy {
                max_retries: settings.max_retries,
                ..RetryPolicy::standard()
            },
            cancel_grace: settings.cancel_grace(),
        }
    }

    /// 执行一个爬取作业直到结束
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlSummary)` - 正常完成或取消后的部分结果
    /// * `Err(CrawlError::RootUnreachable)` - 根URL传输层失败且重试用尽
    #[instrument(skip(self, job, external_cancel), fields(job_id = %job.id, root = %job.root_url))]
    pub async fn run(
        &self,
        job: CrawlJob,
        mut external_cancel: watch::Receiver<bool>,
    ) -> Result<CrawlSummary, CrawlError> {
        let started = Instant::now();
        let mut state = CrawlState::Seeding;
        info!(state = %state, max_depth = job.max_depth, "crawl job starting");

        let frontier = Arc::new(Frontier::new(job.max_depth, job.max_pages));
        let store = Arc::new(ResultStore::new());
        let root_failure = Arc::new(Mutex::new(None::<String>));
        frontier.offer(FrontierEntry::root(url_utils::normalize_url(
            job.root_url.clone(),
        )));

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let job = Arc::new(job);
        let mut workers = JoinSet::new();
        for worker_id in 0..job.max_concurrency {
            let worker = FetchWorker::new(
                worker_id,
                self.engine.clone(),
                self.politeness.clone(),
                frontier.clone(),
                store.clone(),
                root_failure.clone(),
                self.retry_policy.clone(),
                cancel_rx.clone(),
                job.clone(),
            );
            workers.spawn(worker.run());
        }
        state = CrawlState::Running;
        info!(state = %state, workers = job.max_concurrency, "workers started");

        let deadline = tokio::time::sleep(job.job_timeout);
        tokio::pin!(deadline);
        let mut cancelled = false;
        let mut aborted = false;
        let mut external_closed = false;

        loop {
            tokio::select! {
                joined = workers.join_next() => {
                    match joined {
                        None => break,
                        Some(Ok(())) => {}
                        Some(Err(e)) => {
                            if !e.is_cancelled() {
                                error!(error = %e, "worker task failed");
                            }
                        }
                    }
                }
                _ = deadline.as_mut(), if !aborted => {
                    if cancelled {
                        // Grace expired with fetches still in flight
                        warn!("cancel grace elapsed, aborting remaining fetches");
                        workers.abort_all();
                        aborted = true;
                    } else {
                        state = CrawlState::Cancelled;
                        warn!(state = %state, timeout_secs = job.job_timeout.as_secs(), "job timeout reached");
                        cancelled = true;
                        let _ = cancel_tx.send(true);
                        frontier.close();
                        deadline.as_mut().reset(tokio::time::Instant::now() + self.cancel_grace);
                    }
                }
                changed = external_cancel.changed(), if !cancelled && !external_closed => {
                    match changed {
                        Ok(()) if *external_cancel.borrow() => {
                            state = CrawlState::Cancelled;
                            info!(state = %state, "cancellation requested");
                            cancelled = true;
                            let _ = cancel_tx.send(true);
                            frontier.close();
                            deadline.as_mut().reset(tokio::time::Instant::now() + self.cancel_grace);
                        }
                        Ok(()) => {}
                        Err(_) => external_closed = true,
                    }
                }
            }
        }

        if !cancelled {
            state = CrawlState::Draining;
            debug!(state = %state, visited = frontier.visited_count(), "frontier drained");
        }

        if let Some(reason) = root_failure.lock().take() {
            metrics::counter!("deepcrawl_jobs_failed_total").increment(1);
            return Err(CrawlError::RootUnreachable {
                url: job.root_url.to_string(),
                reason,
            });
        }

        state = CrawlState::Completed;
        let summary = store.summarize(&job, started.elapsed(), cancelled);
        info!(
            state = %state,
            total_pages = summary.total_pages,
            elapsed_ms = summary.elapsed_ms,
            partial = summary.partial,
            "crawl job finished"
        );
        metrics::counter!("deepcrawl_jobs_completed_total").increment(1);
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "crawl_coordinator_test.rs"]
mod tests;
