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

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::crawl_request::CrawlRequestDto;
use crate::application::use_cases::crawl_use_case::{CrawlUseCase, CrawlUseCaseError};

fn error_response(err: CrawlUseCaseError) -> Response {
    let status = match &err {
        CrawlUseCaseError::Validation(_) => StatusCode::BAD_REQUEST,
        CrawlUseCaseError::NotFound => StatusCode::NOT_FOUND,
        CrawlUseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// 创建爬取作业
///
/// 异步模式返回202与作业ID，同步模式阻塞并返回200与摘要。
pub async fn create_crawl(
    Extension(use_case): Extension<Arc<CrawlUseCase>>,
    Json(payload): Json<CrawlRequestDto>,
) -> Response {
    let sync = payload.sync;
    match use_case.create_crawl(payload).await {
        Ok(dto) => {
            let code = if sync {
                StatusCode::OK
            } else {
                StatusCode::ACCEPTED
            };
            (code, Json(dto)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// 查询作业状态
pub async fn get_crawl(
    Extension(use_case): Extension<Arc<CrawlUseCase>>,
    Path(job_id): Path<Uuid>,
) -> Response {
    match use_case.get_crawl(job_id) {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(err) => error_response(err),
    }
}

/// 取消作业
pub async fn cancel_crawl(
    Extension(use_case): Extension<Arc<CrawlUseCase>>,
    Path(job_id): Path<Uuid>,
) -> Response {
    match use_case.cancel_crawl(job_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
