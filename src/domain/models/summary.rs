// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::models::page::PageRecord;

/// 爬取摘要
///
/// 作业完成时从结果存储派生的只读视图。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// 作业标识符
    pub job_id: Uuid,
    /// 根URL
    pub root_url: String,
    /// 抓取的页面总数
    pub total_pages: usize,
    /// 各深度的页面数
    pub pages_by_depth: BTreeMap<u32, usize>,
    /// 最先记录的N条页面记录样本
    pub sample: Vec<PageRecord>,
    /// 作业耗时（毫秒）
    pub elapsed_ms: u64,
    /// 是否为部分结果（作业因超时或取消而结束）
    pub partial: bool,
}

impl CrawlSummary {
    /// 生成面向调用方的摘要文本行
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.sample.len());
        lines.push(format!(
            "Crawled {} pages in total for {}",
            self.total_pages, self.root_url
        ));
        for record in &self.sample {
            lines.push(format!("URL: {}, Depth: {}", record.url, record.depth));
        }
        lines
    }
}
