// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求/响应DTO和爬取用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体和领域服务
pub mod domain;

/// 引擎模块
///
/// 实现HTTP抓取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供指标导出等外部集成
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 队列模块
///
/// 实现爬取前沿队列和作业注册表
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现抓取工作器
pub mod workers;
