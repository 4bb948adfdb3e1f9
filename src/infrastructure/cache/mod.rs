// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 提供搜索结果缓存的实现
/// 包括Redis客户端与内存/Redis两种缓存后端
pub mod redis_client;
pub mod serp_cache;
