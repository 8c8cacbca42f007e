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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Timeout => true,
            FetchError::Other(_) => false,
        }
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: Url,
    /// 超时时间
    pub timeout: Duration,
}

/// 抓取响应
#[derive(Debug)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status: u16,
    /// 内容类型
    pub content_type: String,
    /// 响应内容
    pub body: String,
    /// 响应体字节数（截断后）
    pub body_bytes: u64,
    /// 响应体是否因超出大小上限被截断
    pub truncated: bool,
    /// 响应时间（毫秒）
    pub elapsed_ms: u64,
}

impl FetchResponse {
    /// 响应是否为HTML内容
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
            || self.content_type.contains("application/xhtml")
    }

    /// 响应是否为成功状态
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 抓取引擎特质
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
