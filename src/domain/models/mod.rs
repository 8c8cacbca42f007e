// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取作业模型
pub mod crawl;
/// 页面记录模型
pub mod page;
/// 爬取摘要模型
pub mod summary;
