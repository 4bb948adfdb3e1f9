// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 排名检查（check）：一次排名检查请求及其队列化的执行状态
/// - 排名记录（ranking）：检查成功后追加的不可变历史记录
/// - 结果快照（serp）：从供应商载荷解码出的结构化搜索结果集
///
/// 这些模型构成了系统的数据基础，定义了业务概念的
/// 结构和行为，是领域驱动设计的核心组成部分。
pub mod check;
pub mod ranking;
pub mod serp;
