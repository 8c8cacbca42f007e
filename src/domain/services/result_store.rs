// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::models::crawl::CrawlJob;
use crate::domain::models::page::PageRecord;
use crate::domain::models::summary::CrawlSummary;

/// 结果存储
///
/// 单个作业的页面记录，按抓取完成顺序追加，追加后不可变。
#[derive(Default)]
pub struct ResultStore {
    records: RwLock<Vec<PageRecord>>,
}

impl ResultStore {
    /// 创建空的结果存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条页面记录
    pub fn append(&self, record: PageRecord) {
        self.records.write().push(record);
    }

    /// 已存储的记录数
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// 存储是否为空
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// 生成作业摘要
    ///
    /// # 参数
    ///
    /// * `partial` - 作业因取消或超时提前结束时为true
    pub fn summarize(&self, job: &CrawlJob, elapsed: Duration, partial: bool) -> CrawlSummary {
        let records = self.records.read();
        let mut pages_by_depth = BTreeMap::new();
        for record in records.iter() {
            *pages_by_depth.entry(record.depth).or_insert(0usize) += 1;
        }
        CrawlSummary {
            job_id: job.id,
            root_url: job.root_url.to_string(),
            total_pages: records.len(),
            pages_by_depth,
            sample: records
                .iter()
                .take(job.summary_sample_size)
                .cloned()
                .collect(),
            elapsed_ms: elapsed.as_millis() as u64,
            partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CrawlerSettings;
    use crate::domain::models::page::PageOutcome;
    use chrono::Utc;

    fn test_settings() -> CrawlerSettings {
        CrawlerSettings {
            max_concurrency: 8,
            per_host_limit: 2,
            per_host_rps: 2,
            fetch_timeout_secs: 30,
            job_timeout_secs: 300,
            cancel_grace_secs: 5,
            max_retries: 3,
            max_pages: 1000,
            max_body_bytes: 2 * 1024 * 1024,
            default_max_depth: 2,
            summary_sample_size: 3,
            include_external: false,
            respect_robots_txt: true,
            user_agent: "deepcrawl-test".to_string(),
        }
    }

    fn record(url: &str, depth: u32) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            depth,
            status: Some(200),
            outcome: PageOutcome::Fetched,
            bytes: 128,
            duration_ms: 10,
            links_found: 0,
            discovered_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_counts_by_depth() {
        let store = ResultStore::new();
        store.append(record("http://example.com/", 0));
        store.append(record("http://example.com/a", 1));
        store.append(record("http://example.com/b", 1));
        store.append(record("http://example.com/a/x", 2));

        let job = CrawlJob::new("http://example.com/", Some(2), None, &test_settings()).unwrap();
        let summary = store.summarize(&job, Duration::from_millis(1500), false);

        assert_eq!(summary.total_pages, 4);
        assert_eq!(summary.pages_by_depth.get(&0), Some(&1));
        assert_eq!(summary.pages_by_depth.get(&1), Some(&2));
        assert_eq!(summary.pages_by_depth.get(&2), Some(&1));
        assert_eq!(summary.sample.len(), 3);
        assert!(!summary.partial);
        assert_eq!(summary.elapsed_ms, 1500);
    }

    #[test]
    fn test_summarize_empty_store() {
        let store = ResultStore::new();
        let job = CrawlJob::new("http://example.com/", None, None, &test_settings()).unwrap();
        let summary = store.summarize(&job, Duration::from_millis(5), true);
        assert_eq!(summary.total_pages, 0);
        assert!(summary.sample.is_empty());
        assert!(summary.partial);
    }
}
