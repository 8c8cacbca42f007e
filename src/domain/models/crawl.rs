// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::config::settings::CrawlerSettings;
use crate::utils::errors::CrawlError;

/// 作用域策略
///
/// 决定发现的链接是否有资格被爬取。
/// 封闭的变体集合，在作业构造时解析，不支持开放式插件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePolicy {
    /// 仅同域链接
    SameDomain,
    /// 允许跨域链接
    AllowExternal,
}

impl ScopePolicy {
    /// 判断候选URL是否在作业范围内
    pub fn allows(&self, root: &Url, candidate: &Url) -> bool {
        match self {
            ScopePolicy::AllowExternal => true,
            ScopePolicy::SameDomain => root.host_str() == candidate.host_str(),
        }
    }
}

impl fmt::Display for ScopePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScopePolicy::SameDomain => write!(f, "same_domain"),
            ScopePolicy::AllowExternal => write!(f, "allow_external"),
        }
    }
}

/// 爬取作业
///
/// 每个爬取请求创建一次，构造后不可变，
/// 由协调器独占持有直到作业完成或被取消。
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// 作业唯一标识符
    pub id: Uuid,
    /// 根URL，爬取的起始地址
    pub root_url: Url,
    /// 最大爬取深度
    pub max_depth: u32,
    /// 作用域策略
    pub scope: ScopePolicy,
    /// 最大并发抓取数（工作器数量）
    pub max_concurrency: usize,
    /// 单次抓取超时时间
    pub fetch_timeout: Duration,
    /// 作业整体超时时间
    pub job_timeout: Duration,
    /// 允许入队的最大页面数
    pub max_pages: usize,
    /// 摘要样本大小
    pub summary_sample_size: usize,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl CrawlJob {
    /// 根据请求参数和配置默认值构造作业
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlJob)` - 校验通过的作业
    /// * `Err(CrawlError::InvalidUrl)` - URL无法解析或协议不受支持
    pub fn new(
        url: &str,
        max_depth: Option<u32>,
        include_external: Option<bool>,
        cfg: &CrawlerSettings,
    ) -> Result<Self, CrawlError> {
        let root_url =
            Url::parse(url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url, e)))?;

        if root_url.scheme() != "http" && root_url.scheme() != "https" {
            return Err(CrawlError::InvalidUrl(format!(
                "unsupported scheme: {}",
                root_url.scheme()
            )));
        }
        if root_url.host_str().is_none() {
            return Err(CrawlError::InvalidUrl(format!("no host: {}", url)));
        }

        let scope = match include_external.unwrap_or(cfg.include_external) {
            true => ScopePolicy::AllowExternal,
            false => ScopePolicy::SameDomain,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            root_url,
            max_depth: max_depth.unwrap_or(cfg.default_max_depth),
            scope,
            max_concurrency: cfg.max_concurrency.max(1),
            fetch_timeout: cfg.fetch_timeout(),
            job_timeout: cfg.job_timeout(),
            max_pages: cfg.max_pages,
            summary_sample_size: cfg.summary_sample_size,
            created_at: Utc::now(),
        })
    }
}

/// 协调器状态枚举
///
/// 状态转换遵循以下流程：
/// Seeding → Running → Draining → Completed，
/// Cancelled 可从 Running/Draining 进入，之后仍以 Completed 收尾（部分结果）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// 播种中：根URL入队
    Seeding,
    /// 运行中：工作器活跃
    Running,
    /// 排空中：前沿已空且无进行中抓取
    Draining,
    /// 已完成
    Completed,
    /// 已取消（超时或外部取消）
    Cancelled,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CrawlState::Seeding => write!(f, "seeding"),
            CrawlState::Running => write!(f, "running"),
            CrawlState::Draining => write!(f, "draining"),
            CrawlState::Completed => write!(f, "completed"),
            CrawlState::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;

    fn crawler_settings() -> CrawlerSettings {
        Settings::new().unwrap().crawler
    }

    #[test]
    fn test_job_defaults_from_settings() {
        let cfg = crawler_settings();
        let job = CrawlJob::new("http://example.com/", None, None, &cfg).unwrap();
        assert_eq!(job.max_depth, cfg.default_max_depth);
        assert_eq!(job.scope, ScopePolicy::SameDomain);
        assert_eq!(job.max_concurrency, cfg.max_concurrency);
    }

    #[test]
    fn test_job_rejects_bad_urls() {
        let cfg = crawler_settings();
        assert!(CrawlJob::new("not a url", None, None, &cfg).is_err());
        assert!(CrawlJob::new("ftp://example.com/", None, None, &cfg).is_err());
        assert!(CrawlJob::new("data:text/plain,hi", None, None, &cfg).is_err());
    }

    #[test]
    fn test_scope_policy() {
        let root = Url::parse("http://example.com/").unwrap();
        let internal = Url::parse("http://example.com/about").unwrap();
        let external = Url::parse("http://other.org/").unwrap();

        assert!(ScopePolicy::SameDomain.allows(&root, &internal));
        assert!(!ScopePolicy::SameDomain.allows(&root, &external));
        assert!(ScopePolicy::AllowExternal.allows(&root, &external));
    }
}
