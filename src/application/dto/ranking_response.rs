// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::RankingRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 排名历史响应数据传输对象
#[derive(Debug, Deserialize, Serialize)]
pub struct RankingHistoryDto {
    /// 请求处理是否成功
    pub success: bool,
    /// 关键词标识符
    pub keyword_id: i64,
    /// 排名记录列表，按检查时间倒序
    pub rankings: Vec<RankingDto>,
}

/// 单条排名记录数据传输对象
///
/// position 与 found_url 同时存在或同时缺失：缺失表示
/// 这次检查扫完了整个结果集也没有找到目标。
#[derive(Debug, Deserialize, Serialize)]
pub struct RankingDto {
    /// 记录唯一标识符
    pub id: Uuid,
    /// 1 起始的排名位置
    pub position: Option<i32>,
    /// 命中结果的原文URL
    pub found_url: Option<String>,
    /// 本次快照的结果条目数
    pub total_results: i32,
    /// 检查时间
    pub checked_at: DateTime<Utc>,
}

impl From<RankingRecord> for RankingDto {
    fn from(record: RankingRecord) -> Self {
        Self {
            id: record.id,
            position: record.position,
            found_url: record.found_url,
            total_results: record.total_results,
            checked_at: record.checked_at,
        }
    }
}
