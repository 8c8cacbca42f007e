// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取协调器
pub mod crawl_coordinator;
/// 链接提取服务
pub mod link_extractor;
/// 礼貌性控制服务
pub mod politeness;
/// 结果存储服务
pub mod result_store;
