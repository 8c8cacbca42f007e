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

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::summary::CrawlSummary;
use crate::queue::job_registry::{JobState, JobStatus};

/// 爬取响应DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResponseDto {
    /// 作业标识符
    pub job_id: Uuid,
    /// 作业状态
    pub status: String,
    /// 面向调用方的提示信息
    pub message: String,
    /// 摘要文本行，作业完成后提供
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_summary: Option<Vec<String>>,
    /// 结构化摘要，作业完成后提供
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CrawlSummary>,
    /// 失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl CrawlResponseDto {
    /// 异步提交已受理的响应
    pub fn accepted(job_id: Uuid) -> Self {
        Self {
            job_id,
            status: "queued".to_string(),
            message: "Crawl accepted.".to_string(),
            results_summary: None,
            summary: None,
            failure_reason: None,
        }
    }

    /// 根据作业状态构造响应
    pub fn from_status(status: JobStatus) -> Self {
        match status.state {
            JobState::Queued => Self {
                job_id: status.job_id,
                status: "queued".to_string(),
                message: "Crawl queued.".to_string(),
                results_summary: None,
                summary: None,
                failure_reason: None,
            },
            JobState::Running => Self {
                job_id: status.job_id,
                status: "running".to_string(),
                message: "Crawl in progress.".to_string(),
                results_summary: None,
                summary: None,
                failure_reason: None,
            },
            JobState::Completed(summary) => Self {
                job_id: status.job_id,
                status: "completed".to_string(),
                message: "Crawl finished.".to_string(),
                results_summary: Some(summary.summary_lines()),
                summary: Some(summary),
                failure_reason: None,
            },
            JobState::Failed(reason) => Self {
                job_id: status.job_id,
                status: "failed".to_string(),
                message: "Crawl failed.".to_string(),
                results_summary: None,
                summary: None,
                failure_reason: Some(reason),
            },
        }
    }
}
