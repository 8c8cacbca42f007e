// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 爬取作业级错误类型
///
/// 页面级错误在工作器内部恢复并记入PageRecord，
/// 只有这里的错误会使整个作业失败。
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("根URL无法访问: {url}: {reason}")]
    RootUnreachable { url: String, reason: String },
}
