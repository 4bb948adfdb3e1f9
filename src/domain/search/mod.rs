// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索领域模块
///
/// 定义异步搜索供应商接口与供应商错误的领域表示
pub mod provider;
