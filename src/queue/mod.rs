// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取前沿队列
pub mod frontier;
/// 作业注册表
pub mod job_registry;
