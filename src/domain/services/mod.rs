// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含无状态的领域服务，封装纯粹的业务规则。
///
/// 包含的服务：
/// - 排名提取器（rank_extractor）：从结果快照中计算目标URL的排名位置
pub mod rank_extractor;
