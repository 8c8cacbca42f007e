// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取请求DTO
pub mod crawl_request;
/// 爬取响应DTO
pub mod crawl_response;
