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

use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::crawl_request::CrawlRequestDto;
use crate::application::dto::crawl_response::CrawlResponseDto;
use crate::config::settings::Settings;
use crate::domain::models::crawl::CrawlJob;
use crate::queue::job_registry::JobRegistry;
use crate::utils::errors::CrawlError;

/// 用例错误类型
#[derive(Error, Debug)]
pub enum CrawlUseCaseError {
    /// 请求校验失败
    #[error("Validation failed: {0}")]
    Validation(String),
    /// 作业不存在
    #[error("Crawl job not found")]
    NotFound,
    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CrawlError> for CrawlUseCaseError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::InvalidUrl(msg) => CrawlUseCaseError::Validation(msg),
            other => CrawlUseCaseError::Internal(other.to_string()),
        }
    }
}

/// 爬取用例
///
/// HTTP层与作业注册表之间的编排：校验请求、构造作业、
/// 决定同步等待还是立即受理。
pub struct CrawlUseCase {
    registry: Arc<JobRegistry>,
    settings: Arc<Settings>,
}

impl CrawlUseCase {
    /// 创建新的用例实例
    pub fn new(registry: Arc<JobRegistry>, settings: Arc<Settings>) -> Self {
        Self { registry, settings }
    }

    /// 创建爬取作业
    ///
    /// 同步模式下阻塞直到作业结束并返回完整摘要，
    /// 否则立即返回已受理的作业ID。
    pub async fn create_crawl(
        &self,
        dto: CrawlRequestDto,
    ) -> Result<CrawlResponseDto, CrawlUseCaseError> {
        dto.validate()
            .map_err(|e| CrawlUseCaseError::Validation(e.to_string()))?;

        let job = CrawlJob::new(
            &dto.url,
            dto.max_depth,
            dto.include_external,
            &self.settings.crawler,
        )?;
        info!(job_id = %job.id, url = %job.root_url, max_depth = job.max_depth, sync = dto.sync, "crawl requested");
        let job_id = self.registry.submit(job);

        if dto.sync {
            let status = self.registry.wait(job_id).await.ok_or_else(|| {
                CrawlUseCaseError::Internal("job ended without a final state".to_string())
            })?;
            Ok(CrawlResponseDto::from_status(status))
        } else {
            Ok(CrawlResponseDto::accepted(job_id))
        }
    }

    /// 查询作业状态
    pub fn get_crawl(&self, job_id: Uuid) -> Result<CrawlResponseDto, CrawlUseCaseError> {
        self.registry
            .status(job_id)
            .map(CrawlResponseDto::from_status)
            .ok_or(CrawlUseCaseError::NotFound)
    }

    /// 取消作业
    pub fn cancel_crawl(&self, job_id: Uuid) -> Result<(), CrawlUseCaseError> {
        if self.registry.cancel(job_id) {
            info!(job_id = %job_id, "crawl cancellation requested");
            Ok(())
        } else {
            Err(CrawlUseCaseError::NotFound)
        }
    }
}
