// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索供应商模块
///
/// 提供异步搜索 API 的具体客户端实现
pub mod yandex;

pub use yandex::YandexProvider;
