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

use crate::engines::traits::{FetchError, FetchRequest, FetchResponse, HttpFetcher};
use async_trait::async_trait;
use std::time::Instant;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎，
/// 所有请求共享一个客户端，响应体按字节上限流式读取。
pub struct ReqwestEngine {
    /// 共享HTTP客户端
    client: reqwest::Client,
    /// 单个响应体的最大字节数
    max_body_bytes: usize,
}

impl ReqwestEngine {
    /// 创建新的抓取引擎实例
    pub fn new(user_agent: &str, max_body_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::RequestFailed)?;
        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 任意HTTP响应，包括4xx/5xx
    /// * `Err(FetchError)` - 传输层失败（超时、连接错误）
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let mut response = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        // Ensure content_type is not empty
        let content_type = if content_type.trim().is_empty() {
            "text/html".to_string()
        } else {
            content_type
        };

        // Stream the body up to the configured cap
        let mut body = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_bytes {
                let room = self.max_body_bytes - body.len();
                body.extend_from_slice(&chunk[..room]);
                truncated = true;
                tracing::warn!(url = %request.url, cap = self.max_body_bytes, "response body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let body_bytes = body.len() as u64;
        let body = String::from_utf8_lossy(&body).into_owned();

        Ok(FetchResponse {
            status,
            content_type,
            body,
            body_bytes,
            truncated,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
