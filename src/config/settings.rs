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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器和爬虫的所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 爬虫配置
    pub crawler: CrawlerSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 每个作业的最大并发抓取数（工作器数量）
    pub max_concurrency: usize,
    /// 单个主机的最大并发请求数
    pub per_host_limit: usize,
    /// 单个主机每秒的最大请求数
    pub per_host_rps: u32,
    /// 单次抓取的超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 整个爬取作业的超时时间（秒）
    pub job_timeout_secs: u64,
    /// 取消后等待进行中抓取完成的宽限时间（秒）
    pub cancel_grace_secs: u64,
    /// 单个页面的最大抓取尝试次数
    pub max_retries: u32,
    /// 单个作业允许入队的最大页面数
    pub max_pages: usize,
    /// 单个响应体的最大字节数，超出部分被截断
    pub max_body_bytes: usize,
    /// 请求未指定时的默认爬取深度
    pub default_max_depth: u32,
    /// 摘要中包含的页面记录样本数
    pub summary_sample_size: usize,
    /// 是否跟踪跨域链接
    pub include_external: bool,
    /// 是否遵守robots.txt
    pub respect_robots_txt: bool,
    /// 请求使用的User-Agent
    pub user_agent: String,
}

impl CrawlerSettings {
    /// 单次抓取超时时间
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// 作业超时时间
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// 取消宽限时间
    pub fn cancel_grace(&self) -> Duration {
        Duration::from_secs(self.cancel_grace_secs)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default crawler settings
            .set_default("crawler.max_concurrency", 8)?
            .set_default("crawler.per_host_limit", 2)?
            .set_default("crawler.per_host_rps", 2)?
            .set_default("crawler.fetch_timeout_secs", 30)?
            .set_default("crawler.job_timeout_secs", 300)?
            .set_default("crawler.cancel_grace_secs", 5)?
            .set_default("crawler.max_retries", 3)?
            .set_default("crawler.max_pages", 1000)?
            .set_default("crawler.max_body_bytes", 2 * 1024 * 1024)?
            .set_default("crawler.default_max_depth", 2)?
            .set_default("crawler.summary_sample_size", 3)?
            .set_default("crawler.include_external", false)?
            .set_default("crawler.respect_robots_txt", true)?
            .set_default(
                "crawler.user_agent",
                "Mozilla/5.0 (compatible; deepcrawl/0.1; +https://deepcrawl.dev)",
            )?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DEEPCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
