// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 排名检查响应数据传输对象
///
/// 用于封装服务器对检查调度请求的响应结果
#[derive(Debug, Deserialize, Serialize)]
pub struct CheckResponseDto {
    /// 请求处理是否成功
    pub success: bool,
    /// 检查的唯一标识符
    pub id: Uuid,
    /// 检查当前状态
    pub status: String,
}

/// 检查状态查询响应数据传输对象
#[derive(Debug, Deserialize, Serialize)]
pub struct CheckStatusDto {
    /// 请求处理是否成功
    pub success: bool,
    /// 检查的唯一标识符
    pub id: Uuid,
    /// 关键词标识符
    pub keyword_id: i64,
    /// 检查当前状态
    pub status: String,
    /// 当前执行阶段
    pub phase: String,
    /// 已消耗的提交周期次数
    pub attempt_count: i32,
    /// 最大重试次数
    pub max_retries: i32,
    /// 最近一次失败的原因
    pub last_error: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 终态时间
    pub completed_at: Option<DateTime<FixedOffset>>,
}
