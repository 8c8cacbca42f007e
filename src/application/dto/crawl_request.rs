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
use validator::Validate;

/// 爬取请求DTO
///
/// POST /crawl 的请求体。未提供的可选项回落到服务配置的默认值。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CrawlRequestDto {
    /// 根URL
    #[validate(url(message = "无效的URL格式"))]
    pub url: String,

    /// 最大爬取深度
    #[validate(range(min = 0, max = 10, message = "深度必须在0到10之间"))]
    pub max_depth: Option<u32>,

    /// 是否跟踪跨域链接
    pub include_external: Option<bool>,

    /// 同步模式：阻塞到作业结束并返回摘要
    #[serde(default)]
    pub sync: bool,
}
