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

use axum::routing::{get, post};
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::use_cases::crawl_use_case::CrawlUseCase;
use crate::presentation::handlers::crawl_handler;

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 构建应用路由
pub fn routes(use_case: Arc<CrawlUseCase>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/crawl", post(crawl_handler::create_crawl))
        .route(
            "/crawl/{job_id}",
            get(crawl_handler::get_crawl).delete(crawl_handler::cancel_crawl),
        )
        .layer(Extension(use_case))
        .layer(TraceLayer::new_for_http())
}
