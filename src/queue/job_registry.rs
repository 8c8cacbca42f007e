// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::error;
use uuid::Uuid;

use crate::domain::models::crawl::CrawlJob;
use crate::domain::models::summary::CrawlSummary;
use crate::domain::services::crawl_coordinator::CrawlCoordinator;

/// 作业状态
#[derive(Debug, Clone)]
pub enum JobState {
    /// 已提交，协调器尚未开始
    Queued,
    /// 爬取进行中
    Running,
    /// 正常结束（含取消后的部分结果）
    Completed(CrawlSummary),
    /// 根URL不可达等致命失败
    Failed(String),
}

impl JobState {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed(_) | JobState::Failed(_))
    }

    /// 状态名称
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed(_) => "completed",
            JobState::Failed(_) => "failed",
        }
    }
}

/// 作业状态视图
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub job_id: Uuid,
    pub root_url: String,
    pub created_at: DateTime<Utc>,
    pub state: JobState,
}

struct JobEntry {
    root_url: String,
    created_at: DateTime<Utc>,
    state_rx: watch::Receiver<JobState>,
    cancel_tx: watch::Sender<bool>,
}

/// 作业注册表
///
/// 持有所有已提交作业的状态通道。每次提交为作业生成一个协调器任务，
/// 终止状态通过watch通道发布，供轮询与同步等待两种读取方式使用。
pub struct JobRegistry {
    coordinator: Arc<CrawlCoordinator>,
    jobs: DashMap<Uuid, JobEntry>,
}

impl JobRegistry {
    /// 创建新的作业注册表
    pub fn new(coordinator: Arc<CrawlCoordinator>) -> Self {
        Self {
            coordinator,
            jobs: DashMap::new(),
        }
    }

    /// 提交作业并启动协调器任务
    ///
    /// # 返回值
    ///
    /// 作业ID，可用于查询、等待或取消
    pub fn submit(&self, job: CrawlJob) -> Uuid {
        let job_id = job.id;
        let (state_tx, state_rx) = watch::channel(JobState::Queued);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.jobs.insert(
            job_id,
            JobEntry {
                root_url: job.root_url.to_string(),
                created_at: job.created_at,
                state_rx,
                cancel_tx,
            },
        );

        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            let _ = state_tx.send(JobState::Running);
            let final_state = match coordinator.run(job, cancel_rx).await {
                Ok(summary) => JobState::Completed(summary),
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "crawl job failed");
                    JobState::Failed(e.to_string())
                }
            };
            let _ = state_tx.send(final_state);
        });

        metrics::counter!("deepcrawl_jobs_submitted_total").increment(1);
        job_id
    }

    /// 查询作业当前状态
    pub fn status(&self, job_id: Uuid) -> Option<JobStatus> {
        self.jobs.get(&job_id).map(|entry| JobStatus {
            job_id,
            root_url: entry.root_url.clone(),
            created_at: entry.created_at,
            state: entry.state_rx.borrow().clone(),
        })
    }

    /// 等待作业进入终止状态
    ///
    /// 同步模式的HTTP提交路径使用此方法阻塞到作业结束。
    pub async fn wait(&self, job_id: Uuid) -> Option<JobStatus> {
        // Clone the receiver before awaiting so the map shard lock is released
        let (root_url, created_at, mut state_rx) = {
            let entry = self.jobs.get(&job_id)?;
            (
                entry.root_url.clone(),
                entry.created_at,
                entry.state_rx.clone(),
            )
        };
        let state = state_rx.wait_for(|s| s.is_terminal()).await.ok()?.clone();
        Some(JobStatus {
            job_id,
            root_url,
            created_at,
            state,
        })
    }

    /// 请求取消作业
    ///
    /// 取消是幂等的；对已结束的作业无效果。
    ///
    /// # 返回值
    ///
    /// 作业存在时返回true
    pub fn cancel(&self, job_id: Uuid) -> bool {
        match self.jobs.get(&job_id) {
            Some(entry) => {
                let _ = entry.cancel_tx.send(true);
                true
            }
            None => false,
        }
    }

    /// 已注册作业数量
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
