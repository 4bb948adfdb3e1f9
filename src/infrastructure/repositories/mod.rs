// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现
pub mod check_repo_impl;
pub mod ranking_repo_impl;

pub use check_repo_impl::CheckRepositoryImpl;
pub use ranking_repo_impl::RankingRepositoryImpl;
