// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// 前沿条目
///
/// 由链接提取器或作业播种创建，被一个工作器恰好消费一次，从不修改。
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// 待抓取URL（已规范化）
    pub url: Url,
    /// 发现深度
    pub depth: u32,
    /// 发现来源URL
    pub discovered_from: Option<Url>,
    /// 发现时间（即入队提议时间）
    pub discovered_at: DateTime<Utc>,
}

impl FrontierEntry {
    /// 创建根条目（深度0）
    pub fn root(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            discovered_from: None,
            discovered_at: Utc::now(),
        }
    }

    /// 创建由父页面发现的子条目
    pub fn child(url: Url, depth: u32, parent: &Url) -> Self {
        Self {
            url,
            depth,
            discovered_from: Some(parent.clone()),
            discovered_at: Utc::now(),
        }
    }
}

/// 页面抓取结果分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    /// 成功抓取（2xx/3xx）
    Fetched,
    /// 服务器返回了错误状态码（4xx/5xx），重试已用尽
    HttpError,
    /// 传输层失败（超时、连接错误），重试已用尽
    FetchFailed { reason: String },
}

/// 页面记录
///
/// 工作器在抓取结束时创建，追加到作业的结果存储，之后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// 页面URL
    pub url: String,
    /// 发现深度
    pub depth: u32,
    /// HTTP状态码（传输失败时为空）
    pub status: Option<u16>,
    /// 抓取结果分类
    pub outcome: PageOutcome,
    /// 响应体字节数
    pub bytes: u64,
    /// 抓取耗时（毫秒）
    pub duration_ms: u64,
    /// 页面上提取到的出站链接数
    pub links_found: usize,
    /// 发现时间
    pub discovered_at: DateTime<Utc>,
}
